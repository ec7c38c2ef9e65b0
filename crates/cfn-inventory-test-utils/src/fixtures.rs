//! Fixture builders for stacks, roles, log groups and CSV files
//!
//! ARNs are built for a fixed fake account so assertions can spell them out.

use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Account ID used in every fixture ARN
pub const TEST_ACCOUNT: &str = "123456789012";

/// Region used in every fixture ARN
pub const TEST_REGION: &str = "us-east-1";

/// CloudFormation stack ARN for `name`/`suffix`.
///
/// ```
/// use cfn_inventory_test_utils::stack_arn;
///
/// assert_eq!(
///     stack_arn("Net", "abc"),
///     "arn:aws:cloudformation:us-east-1:123456789012:stack/Net/abc"
/// );
/// ```
pub fn stack_arn(name: &str, suffix: &str) -> String {
    format!("arn:aws:cloudformation:{TEST_REGION}:{TEST_ACCOUNT}:stack/{name}/{suffix}")
}

/// IAM role ARN for `name`
pub fn role_arn(name: &str) -> String {
    format!("arn:aws:iam::{TEST_ACCOUNT}:role/{name}")
}

/// CloudWatch Logs log group ARN for `name`
pub fn log_group_arn(name: &str) -> String {
    format!("arn:aws:logs:{TEST_REGION}:{TEST_ACCOUNT}:log-group:{name}:*")
}

/// Write catalog rows to a temporary CSV file.
///
/// Rows may have different widths. The file is deleted when the returned
/// handle is dropped.
pub fn write_catalog(rows: &[&[&str]]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp catalog");
    {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(file.as_file_mut());
        for row in rows {
            writer.write_record(*row).expect("Failed to write catalog row");
        }
        writer.flush().expect("Failed to flush catalog");
    }
    file.as_file_mut().flush().expect("Failed to flush catalog");
    file
}

/// Read a written report back as raw rows.
pub fn read_report(path: impl AsRef<Path>) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .expect("Failed to open report");
    reader
        .records()
        .map(|r| {
            r.expect("Malformed report row")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect()
}
