//! Data source traits for stacks, roles and log groups
//!
//! The reconciliation only ever sees these traits. The AWS adapters in
//! [`crate::aws`] implement them against the real APIs. The `testing`
//! feature adds `InMemoryCloud` for tests.

use anyhow::Result;
use cfn_inventory_common::{LogGroupRecord, RoleRecord};
use std::future::Future;

/// One entry of a stack listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSummary {
    pub stack_id: String,
    pub parent_id: Option<String>,
    pub status: String,
}

/// One page of a stack listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackPage {
    pub stacks: Vec<StackSummary>,
    /// Continuation token, `None` on the last page
    pub next_token: Option<String>,
}

/// A resource declared directly by a stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackResourceSummary {
    /// Empty when the resource has no physical ID yet
    pub physical_id: String,
    pub logical_id: String,
}

/// An IAM role as returned by the role listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSummary {
    pub name: String,
    pub id: String,
    pub arn: String,
}

impl From<RoleSummary> for RoleRecord {
    fn from(role: RoleSummary) -> Self {
        RoleRecord {
            name: role.name,
            role_id: role.id,
            arn: role.arn,
        }
    }
}

/// A log group as returned by the log group listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogGroupSummary {
    pub name: String,
    pub arn: String,
}

impl From<LogGroupSummary> for LogGroupRecord {
    fn from(group: LogGroupSummary) -> Self {
        LogGroupRecord {
            name: group.name,
            arn: group.arn,
        }
    }
}

/// Source of stacks and their resources.
pub trait StackSource: Send + Sync {
    /// Fetch one page of stacks, starting at `next_token`.
    fn list_stacks(
        &self,
        next_token: Option<String>,
    ) -> impl Future<Output = Result<StackPage>> + Send;

    /// Fetch every resource declared directly by `stack_id`, in source order.
    fn list_stack_resources(
        &self,
        stack_id: &str,
    ) -> impl Future<Output = Result<Vec<StackResourceSummary>>> + Send;
}

/// Source of the IAM role inventory.
pub trait RoleSource: Send + Sync {
    fn list_roles(&self) -> impl Future<Output = Result<Vec<RoleSummary>>> + Send;
}

/// Source of the CloudWatch Logs log group inventory.
pub trait LogGroupSource: Send + Sync {
    fn list_log_groups(&self) -> impl Future<Output = Result<Vec<LogGroupSummary>>> + Send;
}
