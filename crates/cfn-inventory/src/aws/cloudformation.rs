//! CloudFormation stack and stack resource listing

use super::context::{AwsContext, FromAwsContext};
use super::error::classify_sdk_error;
use super::pagination::{Page, drain_pages};
use crate::retry::{CallPolicy, with_retry};
use crate::sources::{StackPage, StackResourceSummary, StackSource, StackSummary};
use anyhow::{Context, Result};
use aws_sdk_cloudformation::Client;
use aws_sdk_cloudformation::types::{self, StackStatus};
use cfn_inventory_common::defaults::DEFAULT_MAX_PAGES;
use tracing::debug;

/// Statuses requested from ListStacks on every page
fn root_status_filter() -> Vec<StackStatus> {
    vec![
        StackStatus::CreateComplete,
        StackStatus::UpdateComplete,
        StackStatus::UpdateRollbackComplete,
    ]
}

/// Stacks without an ID are skipped; a missing status never passes the root
/// filter downstream.
fn stack_summary(summary: &types::StackSummary) -> Option<StackSummary> {
    Some(StackSummary {
        stack_id: summary.stack_id()?.to_string(),
        parent_id: summary.parent_id().map(str::to_string),
        status: summary
            .stack_status()
            .map(|status| status.as_str().to_string())
            .unwrap_or_default(),
    })
}

fn resource_summary(summary: &types::StackResourceSummary) -> StackResourceSummary {
    StackResourceSummary {
        physical_id: summary.physical_resource_id().unwrap_or_default().to_string(),
        logical_id: summary.logical_resource_id().unwrap_or_default().to_string(),
    }
}

/// CloudFormation client for stack enumeration
pub struct CfnClient {
    client: Client,
    policy: CallPolicy,
    max_pages: usize,
}

impl FromAwsContext for CfnClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.cloudformation_client(),
            policy: ctx.policy().clone(),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

impl CfnClient {
    /// Bound the number of ListStackResources pages fetched per stack.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Fetch one ListStacks page filtered to live statuses.
    pub async fn list_stacks_page(&self, next_token: Option<String>) -> Result<StackPage> {
        let output = with_retry(&self.policy, "ListStacks", || {
            let request = self
                .client
                .list_stacks()
                .set_stack_status_filter(Some(root_status_filter()))
                .set_next_token(next_token.clone());
            async move {
                request
                    .send()
                    .await
                    .map_err(|e| classify_sdk_error("ListStacks", &e).into())
            }
        })
        .await
        .context("Failed to list CloudFormation stacks")?;

        let stacks = output
            .stack_summaries()
            .iter()
            .filter_map(stack_summary)
            .collect::<Vec<_>>();

        debug!(
            stacks = stacks.len(),
            more = output.next_token().is_some(),
            "Fetched ListStacks page"
        );

        Ok(StackPage {
            stacks,
            next_token: output.next_token().map(str::to_string),
        })
    }

    /// Fetch every resource of `stack_id`, draining all pages.
    pub async fn stack_resources(&self, stack_id: &str) -> Result<Vec<StackResourceSummary>> {
        let resources = drain_pages("ListStackResources", self.max_pages, |token| {
            self.stack_resources_page(stack_id, token)
        })
        .await
        .with_context(|| format!("Failed to list resources of stack {stack_id}"))?;

        debug!(stack_id, resources = resources.len(), "Listed stack resources");
        Ok(resources)
    }

    async fn stack_resources_page(
        &self,
        stack_id: &str,
        next_token: Option<String>,
    ) -> Result<Page<StackResourceSummary>> {
        let output = with_retry(&self.policy, "ListStackResources", || {
            let request = self
                .client
                .list_stack_resources()
                .stack_name(stack_id)
                .set_next_token(next_token.clone());
            async move {
                request
                    .send()
                    .await
                    .map_err(|e| classify_sdk_error("ListStackResources", &e).into())
            }
        })
        .await?;

        let resources = output
            .stack_resource_summaries()
            .iter()
            .map(resource_summary)
            .collect();
        Ok(Page::new(resources, output.next_token().map(str::to_string)))
    }
}

impl StackSource for CfnClient {
    async fn list_stacks(&self, next_token: Option<String>) -> Result<StackPage> {
        self.list_stacks_page(next_token).await
    }

    async fn list_stack_resources(&self, stack_id: &str) -> Result<Vec<StackResourceSummary>> {
        self.stack_resources(stack_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfn_inventory_common::stack::ROOT_STACK_STATUSES;

    #[test]
    fn status_filter_matches_root_statuses() {
        let requested: Vec<_> = root_status_filter()
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();
        assert_eq!(requested, ROOT_STACK_STATUSES);
    }

    #[test]
    fn stack_summary_tolerates_missing_status() {
        let listed = types::StackSummary::builder()
            .stack_id("arn:aws:cloudformation:us-east-1:123456789012:stack/App/1")
            .build();
        let summary = stack_summary(&listed).unwrap();
        assert_eq!(summary.status, "");
        assert_eq!(summary.parent_id, None);

        let listed = types::StackSummary::builder()
            .stack_id("arn:aws:cloudformation:us-east-1:123456789012:stack/App/1")
            .stack_status(StackStatus::UpdateComplete)
            .build();
        assert_eq!(stack_summary(&listed).unwrap().status, "UPDATE_COMPLETE");

        assert!(stack_summary(&types::StackSummary::builder().build()).is_none());
    }

    #[test]
    fn resource_summary_defaults_missing_ids() {
        let listed = types::StackResourceSummary::builder()
            .physical_resource_id("vpc-0a1")
            .build();
        let resource = resource_summary(&listed);
        assert_eq!(resource.physical_id, "vpc-0a1");
        assert_eq!(resource.logical_id, "");

        let listed = types::StackResourceSummary::builder()
            .logical_resource_id("Vpc")
            .build();
        assert_eq!(resource_summary(&listed).physical_id, "");
    }
}
