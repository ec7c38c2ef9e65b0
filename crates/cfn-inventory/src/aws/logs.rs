//! CloudWatch Logs log group inventory

use super::context::{AwsContext, FromAwsContext};
use super::error::classify_sdk_error;
use super::pagination::{Page, drain_pages};
use crate::retry::{CallPolicy, with_retry};
use crate::sources::{LogGroupSource, LogGroupSummary};
use anyhow::{Context, Result};
use aws_sdk_cloudwatchlogs::Client;
use cfn_inventory_common::defaults::DEFAULT_MAX_PAGES;
use tracing::debug;

/// CloudWatch Logs client for listing log groups
pub struct LogsClient {
    client: Client,
    policy: CallPolicy,
    max_pages: usize,
}

impl FromAwsContext for LogsClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.logs_client(),
            policy: ctx.policy().clone(),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

impl LogsClient {
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// List every log group in the region.
    pub async fn all_log_groups(&self) -> Result<Vec<LogGroupSummary>> {
        let groups = drain_pages("DescribeLogGroups", self.max_pages, |token| {
            self.log_groups_page(token)
        })
        .await
        .context("Failed to describe CloudWatch log groups")?;

        debug!(log_groups = groups.len(), "Listed log groups");
        Ok(groups)
    }

    async fn log_groups_page(&self, next_token: Option<String>) -> Result<Page<LogGroupSummary>> {
        let output = with_retry(&self.policy, "DescribeLogGroups", || {
            let request = self
                .client
                .describe_log_groups()
                .set_next_token(next_token.clone());
            async move {
                request
                    .send()
                    .await
                    .map_err(|e| classify_sdk_error("DescribeLogGroups", &e).into())
            }
        })
        .await?;

        let groups = output
            .log_groups()
            .iter()
            .filter_map(|group| {
                Some(LogGroupSummary {
                    name: group.log_group_name()?.to_string(),
                    arn: group.arn().unwrap_or_default().to_string(),
                })
            })
            .collect();
        Ok(Page::new(groups, output.next_token().map(str::to_string)))
    }
}

impl LogGroupSource for LogsClient {
    async fn list_log_groups(&self) -> Result<Vec<LogGroupSummary>> {
        self.all_log_groups().await
    }
}
