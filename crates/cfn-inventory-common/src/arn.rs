//! Identifier normalization and catalog key matching
//!
//! Stack and resource identifiers arrive in two shapes: ARN-based sources
//! emit fully-qualified ARNs, exact-ID sources emit bare names. Keys are
//! normalized to the resource-path suffix before they are compared against
//! catalog identifiers.

use regex::Regex;
use std::borrow::Cow;
use tracing::debug;

/// Reduce an ARN-shaped key to its resource-path suffix.
///
/// - `arn:<partition>:<service>:<region>:<account>:<resource>` keeps only the
///   text after the last `:`.
/// - A `stack/<name>/<suffix>` resource collapses to `<name>/<suffix>`.
/// - Anything that is not ARN-shaped is returned unchanged.
///
/// ```
/// use cfn_inventory_common::normalize_key;
///
/// assert_eq!(
///     normalize_key("arn:aws:cloudformation:us-east-1:123456789012:stack/my-stack/abcdef"),
///     "my-stack/abcdef"
/// );
/// assert_eq!(normalize_key("my-stack/abcdef"), "my-stack/abcdef");
/// ```
pub fn normalize_key(key: &str) -> Cow<'_, str> {
    if !is_arn(key) {
        return Cow::Borrowed(key);
    }

    let resource = key.rsplit(':').next().unwrap_or(key);
    if !resource.starts_with("stack/") {
        return Cow::Borrowed(resource);
    }

    let mut segments = resource.rsplit('/');
    match (segments.next(), segments.next()) {
        (Some(suffix), Some(name)) => Cow::Owned(format!("{name}/{suffix}")),
        _ => Cow::Borrowed(resource),
    }
}

/// `^arn:.+$`
fn is_arn(key: &str) -> bool {
    key.strip_prefix("arn:").is_some_and(|rest| !rest.is_empty())
}

/// Check whether a physical resource ID is a CloudFormation stack ARN.
///
/// Nested stacks show up in a parent's resource list as resources whose
/// physical ID is the child stack's ARN; there is no explicit flag for it.
pub fn is_stack_arn(physical_id: &str) -> bool {
    let Some(rest) = physical_id.strip_prefix("arn:") else {
        return false;
    };
    let mut parts = rest.splitn(3, ':');
    matches!(
        (parts.next(), parts.next()),
        (Some(partition), Some("cloudformation")) if partition.starts_with("aws")
    )
}

/// Compiled form of a lookup key.
///
/// A record identifier matches when it equals the normalized key, or when the
/// normalized key, read as a regular expression, is found in the identifier.
/// Catalog operators rely on the permissive form to supply partial keys.
#[derive(Debug, Clone)]
pub struct KeyMatcher {
    key: String,
    pattern: Option<Regex>,
}

impl KeyMatcher {
    /// Normalize and compile a raw lookup key.
    ///
    /// A key that is not a valid regular expression still matches by exact
    /// equality; the pattern failure is logged and otherwise ignored.
    pub fn new(raw_key: &str) -> Self {
        let key = normalize_key(raw_key).into_owned();
        let pattern = if key.is_empty() {
            None
        } else {
            match Regex::new(&key) {
                Ok(re) => Some(re),
                Err(e) => {
                    debug!(key = %key, error = %e, "Key is not a valid pattern, using exact match only");
                    None
                }
            }
        };
        Self { key, pattern }
    }

    /// The normalized key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Check a record identifier against this key. Empty keys never match.
    pub fn matches(&self, identifier: &str) -> bool {
        if self.key.is_empty() {
            return false;
        }
        identifier == self.key
            || self
                .pattern
                .as_ref()
                .is_some_and(|re| re.is_match(identifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STACK_ARN: &str = "arn:aws:cloudformation:us-east-1:123456789012:stack/my-stack/abcdef";

    #[test]
    fn normalizes_stack_arn() {
        assert_eq!(normalize_key(STACK_ARN), "my-stack/abcdef");
    }

    #[test]
    fn bare_identifier_is_unchanged() {
        assert_eq!(normalize_key("my-stack/abcdef"), "my-stack/abcdef");
        assert_eq!(normalize_key("i-0123456789abcdef0"), "i-0123456789abcdef0");
        assert!(matches!(normalize_key("sg-123"), Cow::Borrowed(_)));
    }

    #[test]
    fn normalizes_non_stack_arn_to_resource_suffix() {
        assert_eq!(
            normalize_key("arn:aws:iam::123456789012:role/service-role/MyRole"),
            "role/service-role/MyRole"
        );
        assert_eq!(
            normalize_key("arn:aws:sns:us-east-1:123456789012:alerts"),
            "alerts"
        );
    }

    #[test]
    fn stack_suffix_keeps_last_two_segments() {
        assert_eq!(
            normalize_key("arn:aws:cloudformation:us-east-1:1:stack/a/b/c"),
            "b/c"
        );
        assert_eq!(
            normalize_key("arn:aws:cloudformation:us-east-1:1:stack/only"),
            "stack/only"
        );
    }

    #[test]
    fn bare_arn_prefix_is_not_an_arn() {
        assert_eq!(normalize_key("arn:"), "arn:");
    }

    #[test]
    fn detects_stack_arns() {
        assert!(is_stack_arn(STACK_ARN));
        assert!(is_stack_arn(
            "arn:aws-us-gov:cloudformation:us-gov-west-1:1:stack/x/y"
        ));
        assert!(!is_stack_arn("arn:aws:iam::123456789012:role/MyRole"));
        assert!(!is_stack_arn("my-stack"));
        assert!(!is_stack_arn("cloudformation:stack"));
    }

    #[test]
    fn matcher_exact_and_pattern() {
        let matcher = KeyMatcher::new(STACK_ARN);
        assert_eq!(matcher.key(), "my-stack/abcdef");
        assert!(matcher.matches("my-stack/abcdef"));
        assert!(matcher.matches(STACK_ARN));
        assert!(!matcher.matches("other-stack/abcdef"));
    }

    #[test]
    fn matcher_invalid_pattern_falls_back_to_exact() {
        let matcher = KeyMatcher::new("arn:aws:logs:us-east-1:1:log-group:/aws/lambda/fn:*");
        assert_eq!(matcher.key(), "*");
        assert!(matcher.matches("*"));
        assert!(!matcher.matches("anything"));
    }

    #[test]
    fn matcher_empty_key_never_matches() {
        let matcher = KeyMatcher::new("");
        assert!(!matcher.matches(""));
        assert!(!matcher.matches("anything"));
    }
}
