//! Root stack enumeration and nested-stack expansion
//!
//! Root stacks are collected by following the listing's continuation tokens.
//! Each root is then expanded depth-first: a resource whose physical ID is a
//! CloudFormation stack ARN is a nested stack and is expanded in place,
//! directly after its own entry.

use crate::sources::StackSource;
use anyhow::Result;
use cfn_inventory_common::defaults::{DEFAULT_MAX_PAGES, DEFAULT_MAX_STACK_DEPTH};
use cfn_inventory_common::stack::is_root_status;
use cfn_inventory_common::{DiscoveredResource, StackNode, StackTreeNode, is_stack_arn};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Bounds on stack graph traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalLimits {
    /// Maximum nesting depth below a root stack
    pub max_depth: usize,
    /// Maximum pages fetched by any single paginated listing
    pub max_pages: usize,
}

impl Default for TraversalLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_STACK_DEPTH,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// Traversal bound violations
#[derive(Debug, Error)]
pub enum TraversalError {
    #[error("Stack {stack_id} is nested deeper than {limit} levels")]
    DepthExceeded { stack_id: String, limit: usize },

    #[error("{operation} returned more than {limit} pages")]
    PageLimitExceeded {
        operation: &'static str,
        limit: usize,
    },

    #[error("{operation} returned continuation token {token} twice")]
    RepeatedToken {
        operation: &'static str,
        token: String,
    },
}

/// Walks the stack graph of one account and region.
pub struct StackWalker<S> {
    source: Arc<S>,
    limits: TraversalLimits,
}

impl<S: StackSource> StackWalker<S> {
    pub fn new(source: Arc<S>, limits: TraversalLimits) -> Self {
        Self { source, limits }
    }

    /// List live root stacks in listing order.
    ///
    /// A stack is a root when it has no parent and its status is one of
    /// the live statuses. Both conditions are re-checked here even though the
    /// AWS adapter already asks for the status filter.
    pub async fn list_root_stacks(&self) -> Result<Vec<StackNode>> {
        let mut roots = Vec::new();
        let mut next_token: Option<String> = None;
        let mut seen_tokens = HashSet::new();
        let mut pages = 0usize;

        loop {
            pages += 1;
            if pages > self.limits.max_pages {
                return Err(TraversalError::PageLimitExceeded {
                    operation: "ListStacks",
                    limit: self.limits.max_pages,
                }
                .into());
            }

            let page = self.source.list_stacks(next_token.take()).await?;
            let before = roots.len();
            roots.extend(
                page.stacks
                    .into_iter()
                    .filter(|s| s.parent_id.is_none() && is_root_status(&s.status))
                    .map(|s| StackNode::root(s.stack_id)),
            );
            debug!(page = pages, roots = roots.len() - before, "Processed stack page");

            match page.next_token {
                Some(token) => {
                    if !seen_tokens.insert(token.clone()) {
                        return Err(TraversalError::RepeatedToken {
                            operation: "ListStacks",
                            token,
                        }
                        .into());
                    }
                    next_token = Some(token);
                }
                None => break,
            }
        }

        info!(stacks = roots.len(), pages, "Enumerated root stacks");
        Ok(roots)
    }

    /// Expand a stack's resources, following nested stacks depth-first.
    pub async fn expand_stack(&self, stack_id: &str) -> Result<Vec<StackTreeNode>> {
        self.expand(stack_id.to_string(), 0).await
    }

    fn expand(&self, stack_id: String, depth: usize) -> BoxFuture<'_, Result<Vec<StackTreeNode>>> {
        async move {
            if depth > self.limits.max_depth {
                return Err(TraversalError::DepthExceeded {
                    stack_id,
                    limit: self.limits.max_depth,
                }
                .into());
            }

            let summaries = self.source.list_stack_resources(&stack_id).await?;
            let mut nodes = Vec::with_capacity(summaries.len());

            for summary in summaries {
                let resource = DiscoveredResource {
                    physical_id: summary.physical_id,
                    logical_id: summary.logical_id,
                    stack_id: stack_id.clone(),
                };

                if is_stack_arn(&resource.physical_id) {
                    debug!(
                        parent = %stack_id,
                        nested = %resource.physical_id,
                        depth = depth + 1,
                        "Expanding nested stack"
                    );
                    let children = self.expand(resource.physical_id.clone(), depth + 1).await?;
                    nodes.push(StackTreeNode::NestedStack { resource, children });
                } else {
                    nodes.push(StackTreeNode::Leaf(resource));
                }
            }

            Ok(nodes)
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryCloud;
    use cfn_inventory_common::stack::flatten;
    use cfn_inventory_test_utils::stack_arn;

    fn walker(cloud: InMemoryCloud) -> StackWalker<InMemoryCloud> {
        StackWalker::new(Arc::new(cloud), TraversalLimits::default())
    }

    #[tokio::test]
    async fn roots_are_filtered_by_parent_and_status() {
        let cloud = InMemoryCloud::new()
            .with_stack(&stack_arn("A", "1"))
            .with_stack_entry(&stack_arn("Child", "2"), "CREATE_COMPLETE", Some(stack_arn("A", "1").as_str()))
            .with_stack_entry(&stack_arn("Broken", "3"), "ROLLBACK_COMPLETE", None)
            .with_stack_entry(&stack_arn("B", "4"), "UPDATE_ROLLBACK_COMPLETE", None);

        let roots = walker(cloud).list_root_stacks().await.unwrap();
        let ids: Vec<_> = roots.iter().map(|r| r.stack_id.clone()).collect();
        assert_eq!(ids, vec![stack_arn("A", "1"), stack_arn("B", "4")]);
        assert!(roots.iter().all(StackNode::is_root));
    }

    #[tokio::test]
    async fn pagination_preserves_order_across_pages() {
        let mut cloud = InMemoryCloud::new().with_page_size(2);
        for i in 0..5 {
            cloud = cloud.with_stack(&stack_arn(&format!("S{i}"), "x"));
        }
        let roots = walker(cloud).list_root_stacks().await.unwrap();
        let names: Vec<_> = roots
            .iter()
            .map(|r| r.stack_id.split('/').nth(1).unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["S0", "S1", "S2", "S3", "S4"]);
    }

    #[tokio::test]
    async fn page_limit_is_enforced() {
        let mut cloud = InMemoryCloud::new().with_page_size(1);
        for i in 0..3 {
            cloud = cloud.with_stack(&stack_arn(&format!("S{i}"), "x"));
        }
        let walker = StackWalker::new(
            Arc::new(cloud),
            TraversalLimits {
                max_depth: 4,
                max_pages: 2,
            },
        );
        let err = walker.list_root_stacks().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TraversalError>(),
            Some(TraversalError::PageLimitExceeded { .. })
        ));
    }

    #[tokio::test]
    async fn repeated_token_is_rejected() {
        let cloud = InMemoryCloud::new()
            .with_stack(&stack_arn("A", "1"))
            .with_stuck_pagination();
        let err = walker(cloud).list_root_stacks().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TraversalError>(),
            Some(TraversalError::RepeatedToken { .. })
        ));
    }

    #[tokio::test]
    async fn nested_stack_appears_before_its_resources() {
        let root = stack_arn("S", "1");
        let nested = stack_arn("S-Nested", "2");
        let cloud = InMemoryCloud::new()
            .with_stack(&root)
            .with_resources(&root, &[("bucket-1", "R1"), (nested.as_str(), "R2"), ("queue-1", "R3")])
            .with_resources(&nested, &[("table-1", "Table")]);

        let tree = walker(cloud).expand_stack(&root).await.unwrap();
        assert_eq!(tree.len(), 3);
        assert!(matches!(tree[1], StackTreeNode::NestedStack { .. }));
        assert_eq!(tree[1].resource_count(), 2);

        let flat = flatten(tree);
        let physical: Vec<_> = flat.iter().map(|r| r.physical_id.as_str()).collect();
        assert_eq!(physical, vec!["bucket-1", nested.as_str(), "table-1", "queue-1"]);
        assert_eq!(flat[2].stack_id, nested);
        assert_eq!(flat[1].stack_id, root);
    }

    #[tokio::test]
    async fn depth_limit_stops_runaway_nesting() {
        let a = stack_arn("A", "1");
        let b = stack_arn("B", "2");
        // A and B nest each other
        let cloud = InMemoryCloud::new()
            .with_stack(&a)
            .with_resources(&a, &[(b.as_str(), "Child")])
            .with_resources(&b, &[(a.as_str(), "Parent")]);

        let walker = StackWalker::new(
            Arc::new(cloud),
            TraversalLimits {
                max_depth: 3,
                max_pages: 10,
            },
        );
        let err = walker.expand_stack(&a).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TraversalError>(),
            Some(TraversalError::DepthExceeded { limit: 3, .. })
        ));
    }

    #[tokio::test]
    async fn resource_listing_failure_propagates() {
        let root = stack_arn("S", "1");
        let cloud = InMemoryCloud::new()
            .with_stack(&root)
            .failing("ListStackResources");
        assert!(walker(cloud).expand_stack(&root).await.is_err());
    }
}
