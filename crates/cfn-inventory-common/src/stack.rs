//! Stack identities and the nested-stack resource tree

/// Stack statuses considered live when enumerating root stacks
pub const ROOT_STACK_STATUSES: &[&str] = &[
    "CREATE_COMPLETE",
    "UPDATE_COMPLETE",
    "UPDATE_ROLLBACK_COMPLETE",
];

/// Check whether a stack status is one of [`ROOT_STACK_STATUSES`].
pub fn is_root_status(status: &str) -> bool {
    ROOT_STACK_STATUSES.contains(&status)
}

/// A root or nested stack identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackNode {
    pub stack_id: String,
    /// Owning stack for nested stacks, `None` for roots
    pub parent_id: Option<String>,
}

impl StackNode {
    pub fn root(stack_id: impl Into<String>) -> Self {
        Self {
            stack_id: stack_id.into(),
            parent_id: None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// One resource found while walking a stack tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredResource {
    pub physical_id: String,
    pub logical_id: String,
    /// Stack that declares this resource
    pub stack_id: String,
}

/// A node in an expanded stack's resource tree.
///
/// A nested stack is both a resource of its parent and the root of its own
/// subtree, so it is kept as a resource with children rather than being
/// replaced by them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackTreeNode {
    Leaf(DiscoveredResource),
    NestedStack {
        resource: DiscoveredResource,
        children: Vec<StackTreeNode>,
    },
}

impl StackTreeNode {
    /// The resource at this node
    pub fn resource(&self) -> &DiscoveredResource {
        match self {
            StackTreeNode::Leaf(resource) => resource,
            StackTreeNode::NestedStack { resource, .. } => resource,
        }
    }

    /// Number of resources in this subtree, this node included
    pub fn resource_count(&self) -> usize {
        match self {
            StackTreeNode::Leaf(_) => 1,
            StackTreeNode::NestedStack { children, .. } => {
                1 + children.iter().map(StackTreeNode::resource_count).sum::<usize>()
            }
        }
    }

    fn flatten_into(self, out: &mut Vec<DiscoveredResource>) {
        match self {
            StackTreeNode::Leaf(resource) => out.push(resource),
            StackTreeNode::NestedStack { resource, children } => {
                out.push(resource);
                for child in children {
                    child.flatten_into(out);
                }
            }
        }
    }
}

/// Flatten a resource tree depth-first: each nested stack's own entry comes
/// first, followed by its expanded resources.
pub fn flatten(nodes: Vec<StackTreeNode>) -> Vec<DiscoveredResource> {
    let mut out = Vec::with_capacity(nodes.iter().map(StackTreeNode::resource_count).sum());
    for node in nodes {
        node.flatten_into(&mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(physical: &str, logical: &str, stack: &str) -> DiscoveredResource {
        DiscoveredResource {
            physical_id: physical.to_string(),
            logical_id: logical.to_string(),
            stack_id: stack.to_string(),
        }
    }

    #[test]
    fn root_status_filter() {
        assert!(is_root_status("CREATE_COMPLETE"));
        assert!(is_root_status("UPDATE_ROLLBACK_COMPLETE"));
        assert!(!is_root_status("DELETE_COMPLETE"));
        assert!(!is_root_status("ROLLBACK_COMPLETE"));
    }

    #[test]
    fn stack_node_root() {
        assert!(StackNode::root("s").is_root());
        let nested = StackNode {
            stack_id: "child".to_string(),
            parent_id: Some("s".to_string()),
        };
        assert!(!nested.is_root());
    }

    #[test]
    fn nested_stack_appears_before_its_children() {
        let tree = vec![
            StackTreeNode::Leaf(resource("r1", "R1", "S")),
            StackTreeNode::NestedStack {
                resource: resource("arn:aws:cloudformation:r:1:stack/C/1", "R2", "S"),
                children: vec![
                    StackTreeNode::Leaf(resource("c1", "C1", "C")),
                    StackTreeNode::Leaf(resource("c2", "C2", "C")),
                ],
            },
            StackTreeNode::Leaf(resource("r3", "R3", "S")),
        ];
        assert_eq!(tree[1].resource_count(), 3);

        let logical: Vec<_> = flatten(tree)
            .into_iter()
            .map(|r| r.logical_id)
            .collect();
        assert_eq!(logical, vec!["R1", "R2", "C1", "C2", "R3"]);
    }
}
