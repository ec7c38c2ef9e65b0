//! AWS account validation and identity

use super::context::AwsContext;
use super::error::classify_sdk_error;
use crate::retry::with_retry;
use anyhow::{Context, Result};
use tracing::info;

/// Strongly-typed AWS account ID (12-digit string)
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display, derive_more::Deref)]
pub struct AccountId(String);

/// Fetch the current AWS account ID from credentials via STS GetCallerIdentity
///
/// This operation requires no special permissions - it always succeeds if
/// credentials are valid. It runs before any listing call so that missing or
/// expired credentials fail the run before the report file is created.
pub async fn get_current_account_id(ctx: &AwsContext) -> Result<AccountId> {
    let sts = ctx.sts_client();
    let identity = with_retry(ctx.policy(), "GetCallerIdentity", || async {
        sts.get_caller_identity()
            .send()
            .await
            .map_err(|e| classify_sdk_error("GetCallerIdentity", &e).into())
    })
    .await
    .context("Failed to get AWS caller identity - check credentials")?;

    let account = identity
        .account()
        .context("No account ID returned from STS GetCallerIdentity")?;

    info!(account_id = %account, region = %ctx.region(), "AWS account validated");

    Ok(AccountId(account.to_string()))
}
