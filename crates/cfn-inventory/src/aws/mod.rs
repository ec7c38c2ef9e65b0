//! AWS client modules
//!
//! Thin wrappers around the AWS SDK clients that implement the source traits:
//! - CloudFormation: root stacks and stack resources
//! - IAM: role inventory
//! - CloudWatch Logs: log group inventory
//! - STS: credential validation and account ID lookup

pub mod account;
pub mod cloudformation;
pub mod context;
pub mod error;
pub mod iam;
pub mod logs;
pub mod pagination;

pub use account::{AccountId, get_current_account_id};
pub use cloudformation::CfnClient;
pub use context::{AwsContext, FromAwsContext};
pub use iam::IamClient;
pub use logs::LogsClient;

// Error handling
pub use error::{AwsError, classify_aws_error, classify_sdk_error};
