//! IAM role inventory

use super::context::{AwsContext, FromAwsContext};
use super::error::classify_sdk_error;
use super::pagination::{Page, drain_pages, truncated_marker};
use crate::retry::{CallPolicy, with_retry};
use crate::sources::{RoleSource, RoleSummary};
use anyhow::{Context, Result};
use aws_sdk_iam::Client;
use cfn_inventory_common::defaults::DEFAULT_MAX_PAGES;
use tracing::debug;

/// IAM client for listing roles
pub struct IamClient {
    client: Client,
    policy: CallPolicy,
    max_pages: usize,
}

impl FromAwsContext for IamClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.iam_client(),
            policy: ctx.policy().clone(),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

impl IamClient {
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// List every role in the account, following `Marker` until the listing
    /// is no longer truncated.
    pub async fn all_roles(&self) -> Result<Vec<RoleSummary>> {
        let roles = drain_pages("ListRoles", self.max_pages, |marker| self.roles_page(marker))
            .await
            .context("Failed to list IAM roles")?;

        debug!(roles = roles.len(), "Listed IAM roles");
        Ok(roles)
    }

    async fn roles_page(&self, marker: Option<String>) -> Result<Page<RoleSummary>> {
        let output = with_retry(&self.policy, "ListRoles", || {
            let request = self.client.list_roles().set_marker(marker.clone());
            async move {
                request
                    .send()
                    .await
                    .map_err(|e| classify_sdk_error("ListRoles", &e).into())
            }
        })
        .await?;

        let roles = output
            .roles()
            .iter()
            .map(|role| RoleSummary {
                name: role.role_name().to_string(),
                id: role.role_id().to_string(),
                arn: role.arn().to_string(),
            })
            .collect();
        Ok(Page::new(
            roles,
            truncated_marker(output.marker(), output.is_truncated()),
        ))
    }
}

impl RoleSource for IamClient {
    async fn list_roles(&self) -> Result<Vec<RoleSummary>> {
        self.all_roles().await
    }
}
