//! End-to-end reconciliation against in-memory sources
//!
//! Loads a real catalog file, reconciles a small account with nested stacks
//! and writes the CSV report to a temporary directory.

use cfn_inventory::orchestrator::{ReconcileOptions, reconcile_account};
use cfn_inventory::output::{CsvReportWriter, ReportSink};
use cfn_inventory::reconcile::Numbering;
use cfn_inventory::testing::InMemoryCloud;
use cfn_inventory::walker::TraversalLimits;
use cfn_inventory_common::load_catalog;
use cfn_inventory_test_utils::fixtures::{log_group_arn, role_arn};
use cfn_inventory_test_utils::{read_report, stack_arn, write_catalog};
use std::sync::Arc;

fn account() -> InMemoryCloud {
    let net = stack_arn("Net", "abc");
    let app = stack_arn("App", "def");
    let app_db = stack_arn("App-Db", "ghi");

    InMemoryCloud::new()
        .with_page_size(1)
        .with_stack(&net)
        .with_stack_entry(&app_db, "CREATE_COMPLETE", Some(app.as_str()))
        .with_stack(&app)
        .with_stack_entry(&stack_arn("Gone", "zzz"), "DELETE_COMPLETE", None)
        .with_resources(&net, &[("vpc-0a1", "Vpc")])
        .with_resources(
            &app,
            &[
                ("app-bucket", "Bucket"),
                (app_db.as_str(), "Database"),
                ("app-exec", "ExecRole"),
                ("/aws/lambda/app-fn", "FnLogs"),
                ("sg-unknown", "SecurityGroup"),
            ],
        )
        .with_resources(&app_db, &[("orders-table", "Table")])
        .with_role("app-exec", "AROAEXEC", &role_arn("app-exec"))
        .with_role("legacy-admin", "AROALEGACY", &role_arn("legacy-admin"))
        .with_log_group("/aws/lambda/app-fn", &log_group_arn("/aws/lambda/app-fn"))
        .with_log_group("/aws/lambda/retired", &log_group_arn("/aws/lambda/retired"))
}

fn catalog_file() -> tempfile::NamedTempFile {
    let net = stack_arn("Net", "abc");
    write_catalog(&[
        &["ARN/Resource ID", "Name", "Service", "Type", "Region"],
        &[net.as_str(), "NetStack", "CFN", "Stack", "us-east-1"],
        &["vpc-0a1", "main-vpc", "EC2", "VPC", "us-east-1"],
        &["app-bucket", "assets", "S3", "Bucket", "us-east-1", "owner=web"],
        &["orders-table", "orders", "DynamoDB", "Table", "us-east-1"],
        &["i-0orphan", "old-box", "EC2", "Instance", "us-east-1", "owner=ops"],
    ])
}

#[tokio::test]
async fn full_report_is_written() {
    let catalog_file = catalog_file();
    let catalog = load_catalog(catalog_file.path(), true).unwrap();
    assert_eq!(catalog.len(), 5);

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("output-resources.csv");
    let mut sink = CsvReportWriter::create(&output).unwrap();

    let cloud = Arc::new(account());
    let summary = reconcile_account(
        cloud.clone(),
        cloud.clone(),
        cloud.clone(),
        catalog,
        ReconcileOptions::default(),
        &mut sink,
    )
    .await
    .unwrap();
    sink.flush().unwrap();

    let net = stack_arn("Net", "abc");
    let app = stack_arn("App", "def");
    let app_db = stack_arn("App-Db", "ghi");

    let expected: Vec<Vec<String>> = [
        vec!["Sl.No.", "ARN/Resource ID", "LogicalID", "Name", "Service", "Type", "Region"],
        vec!["a", "Resource list from Cloudformation template"],
        vec!["1", net.as_str(), "", "NetStack", "CFN", "Stack", "us-east-1"],
        vec!["1.1", "vpc-0a1", "Vpc", "main-vpc", "EC2", "VPC", "us-east-1"],
        vec!["2", app.as_str(), "", "", "", "", ""],
        vec!["2.1", "app-bucket", "Bucket", "assets", "S3", "Bucket", "us-east-1"],
        vec!["2.2", app_db.as_str(), "Database", "", "", "", ""],
        vec!["2.2", "orders-table", "Table", "orders", "DynamoDB", "Table", "us-east-1"],
        vec!["2.3", "app-exec", "ExecRole", "app-exec", "IAM", "Role", ""],
        vec!["2.4", "/aws/lambda/app-fn", "FnLogs", "/aws/lambda/app-fn", "CloudWatchLogs", "LogGroup", ""],
        vec!["2.6", "sg-unknown", "SecurityGroup", "", "", "", ""],
        vec!["b", "Non cloudformation linked resource list from CSV file"],
        vec!["1", "i-0orphan", "", "old-box", "EC2", "Instance", "us-east-1", "owner=ops"],
        vec!["c", "Non cloudformation linked IAM roles"],
        vec!["1", role_arn("legacy-admin").as_str(), "AROALEGACY", "legacy-admin", "IAM", "Role", ""],
        vec!["d", "Non cloudformation linked Cloudwatch logs"],
        vec!["1", log_group_arn("/aws/lambda/retired").as_str(), "", "/aws/lambda/retired", "CloudWatchLogs", "LogGroup", ""],
    ]
    .into_iter()
    .map(|row| row.into_iter().map(str::to_string).collect())
    .collect();

    assert_eq!(read_report(&output), expected);

    assert_eq!(summary.root_stacks, 2);
    assert_eq!(summary.stacks_matched, 1);
    assert_eq!(summary.resources, 7);
    assert_eq!(summary.matched_catalog, 3);
    assert_eq!(summary.matched_roles, 1);
    assert_eq!(summary.matched_log_groups, 1);
    assert_eq!(summary.unmatched_resources, 2);
    assert_eq!(summary.residual_catalog, 1);

    // Each stack's resources are listed exactly once
    assert_eq!(cloud.calls("ListStackResources"), 3);
    assert_eq!(cloud.calls("ListRoles"), 1);
}

#[tokio::test]
async fn sequential_numbering_counts_every_row() {
    let catalog_file = catalog_file();
    let catalog = load_catalog(catalog_file.path(), true).unwrap();
    let mut sink = CsvReportWriter::from_writer(Vec::new());

    let cloud = Arc::new(account());
    reconcile_account(
        cloud.clone(),
        cloud.clone(),
        cloud,
        catalog,
        ReconcileOptions {
            limits: TraversalLimits::default(),
            numbering: Numbering::Sequential,
        },
        &mut sink,
    )
    .await
    .unwrap();

    let text = String::from_utf8(sink.into_inner().unwrap()).unwrap();
    let labels: Vec<_> = text
        .lines()
        .filter_map(|line| line.split(',').next())
        .filter(|label| label.starts_with("2."))
        .collect();
    assert_eq!(labels, vec!["2.1", "2.2", "2.3", "2.4", "2.5", "2.6"]);
}
