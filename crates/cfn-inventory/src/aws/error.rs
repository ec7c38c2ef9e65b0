//! AWS error classification and handling
//!
//! Provides typed errors for AWS SDK operations using the error code from
//! `ProvideErrorMetadata` instead of string matching on Debug output.

use aws_sdk_cloudformation::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use thiserror::Error;

/// AWS error categories for retry and reporting logic
#[derive(Debug, Error)]
pub enum AwsError {
    /// Credentials lack permission for the listing call
    #[error("Access denied calling {operation}: {message}")]
    AccessDenied {
        operation: &'static str,
        message: String,
    },

    /// Session credentials have expired
    #[error("Credentials expired calling {operation}")]
    ExpiredCredentials { operation: &'static str },

    /// Resource was not found (e.g. a nested stack deleted mid-walk)
    #[error("Resource not found calling {operation}: {message}")]
    NotFound {
        operation: &'static str,
        message: String,
    },

    /// Rate limit exceeded (retryable with backoff)
    #[error("Rate limit exceeded calling {operation}")]
    Throttled { operation: &'static str },

    /// Timeouts, connection failures and 5xx responses (retryable)
    #[error("Transient failure calling {operation}: {message}")]
    Transient {
        operation: &'static str,
        message: String,
    },

    /// Generic AWS SDK error with code and message
    #[error("AWS error calling {operation}: {message}")]
    Sdk {
        operation: &'static str,
        code: Option<String>,
        message: String,
    },
}

impl AwsError {
    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AwsError::NotFound { .. })
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        matches!(self, AwsError::Throttled { .. } | AwsError::Transient { .. })
    }

    /// Get a user-friendly suggestion for resolving this error, if available.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            AwsError::AccessDenied { operation, .. } => Some(format!(
                "Grant the {} permission to the credentials in use, or pick another --profile.",
                required_permission(operation)
            )),
            AwsError::ExpiredCredentials { .. } => {
                Some("Refresh the session credentials (e.g. `aws sso login`) and retry.".to_string())
            }
            AwsError::Throttled { .. } => Some(
                "AWS API rate limit hit repeatedly. Raise --max-attempts or retry later."
                    .to_string(),
            ),
            AwsError::Sdk { code: Some(c), .. } => suggestion_for_code(c),
            _ => None,
        }
    }
}

/// Known AWS error codes for permission failures
const ACCESS_DENIED_CODES: &[&str] = &[
    "AccessDenied",
    "AccessDeniedException",
    "UnauthorizedOperation",
    "UnrecognizedClientException",
    "InvalidClientTokenId",
];

/// Known AWS error codes for expired credentials
const EXPIRED_CODES: &[&str] = &["ExpiredToken", "ExpiredTokenException", "RequestExpired"];

/// Known AWS error codes for "not found" conditions
const NOT_FOUND_CODES: &[&str] = &["NoSuchEntity", "ResourceNotFoundException", "StackNotFound"];

/// Known AWS error codes for throttling/rate limiting
const THROTTLING_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "RequestLimitExceeded",
    "TooManyRequestsException",
];

/// Known AWS error codes for server-side transient failures
const TRANSIENT_CODES: &[&str] = &[
    "InternalFailure",
    "InternalError",
    "ServiceUnavailable",
    "ServiceUnavailableException",
    "ServiceFailure",
];

/// Classify an AWS error from its code and message.
pub fn classify_aws_error(
    operation: &'static str,
    code: Option<&str>,
    message: Option<&str>,
) -> AwsError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(c) if ACCESS_DENIED_CODES.contains(&c) => AwsError::AccessDenied { operation, message },
        Some(c) if EXPIRED_CODES.contains(&c) => AwsError::ExpiredCredentials { operation },
        Some(c) if NOT_FOUND_CODES.contains(&c) => AwsError::NotFound { operation, message },
        Some(c) if THROTTLING_CODES.contains(&c) => AwsError::Throttled { operation },
        Some(c) if TRANSIENT_CODES.contains(&c) => AwsError::Transient { operation, message },
        // CloudFormation reports a missing stack as a generic validation error
        Some("ValidationError") if message.contains("does not exist") => {
            AwsError::NotFound { operation, message }
        }
        _ => AwsError::Sdk {
            operation,
            code: code.map(|s| s.to_string()),
            message,
        },
    }
}

/// Classify an SDK error from any of the AWS service clients.
///
/// Timeouts and dispatch failures never reach the service and carry no
/// error code; they are treated as transient.
pub fn classify_sdk_error<E, R>(operation: &'static str, err: &SdkError<E, R>) -> AwsError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => AwsError::Transient {
            operation,
            message: DisplayErrorContext(err).to_string(),
        },
        _ => {
            let meta = ProvideErrorMetadata::meta(err);
            let fallback = DisplayErrorContext(err).to_string();
            classify_aws_error(operation, meta.code(), meta.message().or(Some(fallback.as_str())))
        }
    }
}

/// IAM permission behind each listing operation
fn required_permission(operation: &str) -> &'static str {
    match operation {
        "ListStacks" => "cloudformation:ListStacks",
        "ListStackResources" => "cloudformation:ListStackResources",
        "ListRoles" => "iam:ListRoles",
        "DescribeLogGroups" => "logs:DescribeLogGroups",
        "GetCallerIdentity" => "sts:GetCallerIdentity",
        _ => "required",
    }
}

/// Error code to user-friendly suggestion mapping
const SUGGESTIONS: &[(&str, &str)] = &[
    (
        "OptInRequired",
        "The account is not subscribed to this service in the selected region.",
    ),
    (
        "InvalidAction",
        "The operation is not available in this region. Check --region.",
    ),
    (
        "SignatureDoesNotMatch",
        "The secret access key is wrong. Check the credentials for this profile.",
    ),
];

/// Get a user-friendly suggestion for a known error code.
fn suggestion_for_code(code: &str) -> Option<String> {
    SUGGESTIONS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, s)| (*s).to_string())
}
