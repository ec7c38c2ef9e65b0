//! Configuration types for a reconciliation run

use crate::reconcile::Numbering;
use crate::retry::RetryConfig;
use crate::walker::TraversalLimits;
use cfn_inventory_common::defaults::DEFAULT_OUTPUT_FILE;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration problems detected before any remote work starts
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No catalog file given (use --csvfile <path>)")]
    MissingCatalog,

    #[error("No AWS region configured (use --region, AWS_REGION or a profile with a region)")]
    MissingRegion,

    #[error("Invalid value for {name}: {reason}")]
    InvalidLimit {
        name: &'static str,
        reason: &'static str,
    },
}

/// Credential and region selection
#[derive(Debug, Clone, Default)]
pub struct AwsConfig {
    /// Named profile (overrides default credential resolution)
    pub profile: Option<String>,
    /// Region (overrides the profile's region)
    pub region: Option<String>,
}

/// Where the exported inventory comes from
#[derive(Debug, Clone, Default)]
pub struct CatalogConfig {
    pub path: Option<PathBuf>,
    /// Skip the first row of the file
    pub has_header: bool,
}

/// Report output settings
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub output: PathBuf,
    pub numbering: Numbering,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
            numbering: Numbering::default(),
        }
    }
}

/// Configuration for a reconciliation run
///
/// Composed of focused sub-configs, one per concern.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    pub aws: AwsConfig,
    pub catalog: CatalogConfig,
    pub limits: TraversalLimits,
    pub retry: RetryConfig,
    pub report: ReportConfig,
}

impl RunConfig {
    /// Check the configuration before touching AWS or the filesystem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog.path.is_none() {
            return Err(ConfigError::MissingCatalog);
        }
        if self.limits.max_depth == 0 {
            return Err(ConfigError::InvalidLimit {
                name: "max-stack-depth",
                reason: "must be at least 1",
            });
        }
        if self.limits.max_pages == 0 {
            return Err(ConfigError::InvalidLimit {
                name: "max-pages",
                reason: "must be at least 1",
            });
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidLimit {
                name: "max-attempts",
                reason: "must be at least 1",
            });
        }
        if self.retry.call_timeout.is_zero() {
            return Err(ConfigError::InvalidLimit {
                name: "call-timeout-secs",
                reason: "must be greater than zero",
            });
        }
        Ok(())
    }

    pub fn catalog_path(&self) -> Option<&Path> {
        self.catalog.path.as_deref()
    }

    pub fn output(&self) -> &Path {
        &self.report.output
    }
}
