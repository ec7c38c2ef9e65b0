//! In-memory data sources for tests
//!
//! [`InMemoryCloud`] implements every source trait from a fixed set of
//! stacks, resources, roles and log groups, with optional pagination quirks
//! and failure injection per operation.

use crate::aws::error::AwsError;
use crate::sources::{
    LogGroupSource, LogGroupSummary, RoleSource, RoleSummary, StackPage, StackResourceSummary,
    StackSource, StackSummary,
};
use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

const DEFAULT_PAGE_SIZE: usize = 100;

/// A fake account serving stacks, roles and log groups from memory.
#[derive(Debug)]
pub struct InMemoryCloud {
    stacks: Vec<StackSummary>,
    resources: HashMap<String, Vec<StackResourceSummary>>,
    roles: Vec<RoleSummary>,
    log_groups: Vec<LogGroupSummary>,
    page_size: usize,
    stuck_pagination: bool,
    failing: HashSet<&'static str>,
    stack_pages: AtomicUsize,
    resource_calls: AtomicUsize,
    role_calls: AtomicUsize,
    log_group_calls: AtomicUsize,
}

impl Default for InMemoryCloud {
    fn default() -> Self {
        Self {
            stacks: Vec::new(),
            resources: HashMap::new(),
            roles: Vec::new(),
            log_groups: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
            stuck_pagination: false,
            failing: HashSet::new(),
            stack_pages: AtomicUsize::new(0),
            resource_calls: AtomicUsize::new(0),
            role_calls: AtomicUsize::new(0),
            log_group_calls: AtomicUsize::new(0),
        }
    }
}

impl InMemoryCloud {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stacks returned per ListStacks page
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Add a live root stack.
    pub fn with_stack(self, stack_id: &str) -> Self {
        self.with_stack_entry(stack_id, "CREATE_COMPLETE", None)
    }

    /// Add a stack listing entry with an explicit status and parent.
    pub fn with_stack_entry(mut self, stack_id: &str, status: &str, parent_id: Option<&str>) -> Self {
        self.stacks.push(StackSummary {
            stack_id: stack_id.to_string(),
            parent_id: parent_id.map(str::to_string),
            status: status.to_string(),
        });
        self
    }

    /// Append `(physical_id, logical_id)` resources to `stack_id`.
    pub fn with_resources(mut self, stack_id: &str, resources: &[(&str, &str)]) -> Self {
        self.resources
            .entry(stack_id.to_string())
            .or_default()
            .extend(resources.iter().map(|(physical, logical)| StackResourceSummary {
                physical_id: physical.to_string(),
                logical_id: logical.to_string(),
            }));
        self
    }

    pub fn with_role(mut self, name: &str, id: &str, arn: &str) -> Self {
        self.roles.push(RoleSummary {
            name: name.to_string(),
            id: id.to_string(),
            arn: arn.to_string(),
        });
        self
    }

    pub fn with_log_group(mut self, name: &str, arn: &str) -> Self {
        self.log_groups.push(LogGroupSummary {
            name: name.to_string(),
            arn: arn.to_string(),
        });
        self
    }

    /// Make ListStacks hand back the same continuation token forever.
    pub fn with_stuck_pagination(mut self) -> Self {
        self.stuck_pagination = true;
        self
    }

    /// Make `operation` fail with a non-retryable error.
    pub fn failing(mut self, operation: &'static str) -> Self {
        self.failing.insert(operation);
        self
    }

    /// Number of calls made to `operation` so far
    pub fn calls(&self, operation: &str) -> usize {
        let counter = match operation {
            "ListStacks" => &self.stack_pages,
            "ListStackResources" => &self.resource_calls,
            "ListRoles" => &self.role_calls,
            "DescribeLogGroups" => &self.log_group_calls,
            _ => return 0,
        };
        counter.load(Ordering::SeqCst)
    }

    fn check(&self, operation: &'static str, counter: &AtomicUsize) -> Result<()> {
        counter.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(operation) {
            return Err(AwsError::AccessDenied {
                operation,
                message: "injected failure".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl StackSource for InMemoryCloud {
    async fn list_stacks(&self, next_token: Option<String>) -> Result<StackPage> {
        self.check("ListStacks", &self.stack_pages)?;
        tokio::task::yield_now().await;

        if self.stuck_pagination {
            return Ok(StackPage {
                stacks: self.stacks.iter().take(self.page_size).cloned().collect(),
                next_token: Some("stuck".to_string()),
            });
        }

        let offset = next_token
            .as_deref()
            .map(str::parse::<usize>)
            .transpose()?
            .unwrap_or(0);
        let end = (offset + self.page_size).min(self.stacks.len());
        let stacks = self.stacks.get(offset..end).unwrap_or_default().to_vec();
        let next_token = (end < self.stacks.len()).then(|| end.to_string());

        Ok(StackPage { stacks, next_token })
    }

    async fn list_stack_resources(&self, stack_id: &str) -> Result<Vec<StackResourceSummary>> {
        self.check("ListStackResources", &self.resource_calls)?;
        tokio::task::yield_now().await;
        Ok(self.resources.get(stack_id).cloned().unwrap_or_default())
    }
}

impl RoleSource for InMemoryCloud {
    async fn list_roles(&self) -> Result<Vec<RoleSummary>> {
        self.check("ListRoles", &self.role_calls)?;
        tokio::task::yield_now().await;
        Ok(self.roles.clone())
    }
}

impl LogGroupSource for InMemoryCloud {
    async fn list_log_groups(&self) -> Result<Vec<LogGroupSummary>> {
        self.check("DescribeLogGroups", &self.log_group_calls)?;
        tokio::task::yield_now().await;
        Ok(self.log_groups.clone())
    }
}
