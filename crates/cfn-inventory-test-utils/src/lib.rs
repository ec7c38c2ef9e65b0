//! Shared test utilities for cfn-inventory
//!
//! This crate provides common test helpers that can be used across
//! multiple test modules without circular dependencies.
//!
//! ## Modules
//!
//! - [`aws`]: AWS region detection for live integration tests
//! - [`fixtures`]: ARN builders and catalog/report file helpers

pub mod aws;
pub mod fixtures;

// Re-export commonly used items
pub use aws::get_test_region;
pub use fixtures::{read_report, stack_arn, write_catalog};
