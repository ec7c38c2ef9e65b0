//! Default configuration values shared between the library and the CLI
//!
//! These constants keep the CLI defaults and the library defaults in step.

/// Report file written when no output path is given
pub const DEFAULT_OUTPUT_FILE: &str = "output-resources.csv";

/// Maximum nested-stack depth followed below a root stack
pub const DEFAULT_MAX_STACK_DEPTH: usize = 32;

/// Maximum number of pages drained from any paginated listing
pub const DEFAULT_MAX_PAGES: usize = 1000;

/// Maximum attempts per remote call (first try included)
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Per-call timeout in seconds for remote listing calls
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 60;

/// Service tag stamped on every IAM role record
pub const ROLE_SERVICE: &str = "IAM";

/// Type tag stamped on every IAM role record
pub const ROLE_TYPE: &str = "Role";

/// Service tag stamped on every log group record
pub const LOG_GROUP_SERVICE: &str = "CloudWatchLogs";

/// Type tag stamped on every log group record
pub const LOG_GROUP_TYPE: &str = "LogGroup";
