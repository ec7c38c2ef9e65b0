//! cfn-inventory - CloudFormation resource reconciliation
//!
//! This crate provides the binary that walks an account's CloudFormation
//! stacks and reconciles every discovered resource against an exported
//! inventory, IAM roles and CloudWatch log groups.

pub mod aws;
pub mod collectors;
pub mod config;
pub mod orchestrator;
pub mod output;
pub mod reconcile;
pub mod retry;
pub mod sources;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod walker;
