//! cfn-inventory-common - Shared records, matching and report types
//!
//! This crate holds everything the reconciliation needs that does not talk
//! to AWS, so it stays free of SDK dependencies and is cheap to test.
//!
//! ## Modules
//!
//! - [`arn`]: Identifier normalization and catalog key matching
//! - [`catalog`]: Loading the exported inventory CSV
//! - [`defaults`]: Default limits and file names
//! - [`index`]: Arena-backed record tables with one-shot removal
//! - [`record`]: Catalog, IAM role and log group records
//! - [`report`]: Report rows and section layout
//! - [`stack`]: Stack identities and the nested-stack resource tree

pub mod arn;
pub mod catalog;
pub mod defaults;
pub mod index;
pub mod record;
pub mod report;
pub mod stack;

// Re-export commonly used types
pub use arn::{KeyMatcher, is_stack_arn, normalize_key};
pub use catalog::{CatalogError, load_catalog, parse_catalog};
pub use index::{Position, RecordIndex};
pub use record::{CatalogRecord, Descriptive, IndexedRecord, LogGroupRecord, RoleRecord};
pub use report::{ReportRow, ReportSections, Section};
pub use stack::{DiscoveredResource, StackNode, StackTreeNode};
