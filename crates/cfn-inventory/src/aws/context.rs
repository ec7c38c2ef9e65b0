//! Shared AWS configuration context
//!
//! Provides `AwsContext` for loading AWS SDK configuration once and
//! creating multiple service clients from the same config.

use crate::config::{AwsConfig, ConfigError};
use crate::retry::CallPolicy;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use std::sync::Arc;
use tracing::debug;

/// Shared AWS configuration context for creating service clients.
///
/// This struct holds a loaded AWS SDK config together with the retry and
/// cancellation policy every adapter applies to its remote calls.
///
/// # Example
/// ```ignore
/// let aws = AwsContext::load(&config.aws, CallPolicy::default()).await?;
///
/// // Create multiple clients from the same config
/// let cfn = CfnClient::from_context(&aws);
/// let iam = IamClient::from_context(&aws);
/// let logs = LogsClient::from_context(&aws);
/// ```
#[derive(Clone)]
pub struct AwsContext {
    config: Arc<SdkConfig>,
    region: String,
    policy: CallPolicy,
}

/// Construct a client wrapper from a loaded [`AwsContext`].
pub trait FromAwsContext {
    fn from_context(ctx: &AwsContext) -> Self;
}

impl AwsContext {
    /// Load AWS configuration from the environment, config files and the
    /// optional named profile.
    ///
    /// An explicit region wins over the profile's region. Fails with
    /// [`ConfigError::MissingRegion`] when neither yields one.
    pub async fn load(aws: &AwsConfig, policy: CallPolicy) -> Result<Self, ConfigError> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(profile) = &aws.profile {
            debug!(profile = %profile, "Using AWS profile");
            loader = loader.profile_name(profile);
        }
        if let Some(region) = &aws.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let config = loader.load().await;

        let region = config
            .region()
            .map(|r| r.to_string())
            .ok_or(ConfigError::MissingRegion)?;

        Ok(Self {
            config: Arc::new(config),
            region,
            policy,
        })
    }

    /// Get the underlying SDK config for direct client construction.
    pub fn sdk_config(&self) -> &SdkConfig {
        &self.config
    }

    /// Get the region string.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Retry and cancellation policy for remote calls
    pub fn policy(&self) -> &CallPolicy {
        &self.policy
    }

    /// Create a CloudFormation client from this context.
    pub fn cloudformation_client(&self) -> aws_sdk_cloudformation::Client {
        aws_sdk_cloudformation::Client::new(self.sdk_config())
    }

    /// Create an IAM client from this context.
    pub fn iam_client(&self) -> aws_sdk_iam::Client {
        aws_sdk_iam::Client::new(self.sdk_config())
    }

    /// Create a CloudWatch Logs client from this context.
    pub fn logs_client(&self) -> aws_sdk_cloudwatchlogs::Client {
        aws_sdk_cloudwatchlogs::Client::new(self.sdk_config())
    }

    /// Create an STS client from this context.
    pub fn sts_client(&self) -> aws_sdk_sts::Client {
        aws_sdk_sts::Client::new(self.sdk_config())
    }
}

impl std::fmt::Debug for AwsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsContext")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}
