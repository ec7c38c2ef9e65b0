//! AWS integration tests - actually call AWS APIs
//!
//! These tests are read-only and marked `#[ignore]`; they only run with:
//! ```text
//! AWS_PROFILE=your_profile cargo test --test aws_integration -- --ignored
//! ```

use cfn_inventory::aws::{
    AwsContext, CfnClient, FromAwsContext, IamClient, LogsClient, get_current_account_id,
};
use cfn_inventory::config::AwsConfig;
use cfn_inventory::retry::CallPolicy;
use cfn_inventory::sources::{LogGroupSource, RoleSource};
use cfn_inventory::walker::{StackWalker, TraversalLimits};
use cfn_inventory_common::is_stack_arn;
use cfn_inventory_test_utils::get_test_region;
use std::sync::Arc;

async fn context() -> AwsContext {
    let aws = AwsConfig {
        profile: None,
        region: Some(get_test_region()),
    };
    AwsContext::load(&aws, CallPolicy::default())
        .await
        .expect("Failed to load AWS config")
}

#[tokio::test]
#[ignore = "requires AWS credentials"]
async fn caller_identity_has_account_id() {
    let ctx = context().await;
    let account = get_current_account_id(&ctx)
        .await
        .expect("AWS credentials required - set AWS_PROFILE or AWS_ACCESS_KEY_ID");
    assert_eq!(account.len(), 12, "Account ID should be 12 digits: {account}");
    assert!(account.chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test]
#[ignore = "requires AWS credentials"]
async fn root_stacks_are_stack_arns() {
    let ctx = context().await;
    let walker = StackWalker::new(
        Arc::new(CfnClient::from_context(&ctx)),
        TraversalLimits::default(),
    );

    let roots = walker.list_root_stacks().await.expect("ListStacks failed");
    for root in &roots {
        assert!(is_stack_arn(&root.stack_id), "Not a stack ARN: {}", root.stack_id);
        assert!(root.is_root());
    }

    if let Some(first) = roots.first() {
        walker
            .expand_stack(&first.stack_id)
            .await
            .expect("ListStackResources failed");
    }
}

#[tokio::test]
#[ignore = "requires AWS credentials"]
async fn auxiliary_inventories_drain_all_pages() {
    let ctx = context().await;

    let roles = IamClient::from_context(&ctx)
        .list_roles()
        .await
        .expect("ListRoles failed");
    assert!(roles.iter().all(|r| r.arn.starts_with("arn:")));

    let groups = LogsClient::from_context(&ctx)
        .list_log_groups()
        .await
        .expect("DescribeLogGroups failed");
    assert!(groups.iter().all(|g| !g.name.is_empty()));
}
