//! Run orchestration
//!
//! [`run`] wires configuration, the catalog file, AWS clients and the report
//! file together. [`reconcile_account`] is the source-agnostic part: it runs
//! the collectors alongside root stack enumeration, waits for both, then
//! reconciles stack by stack and writes each section as it completes.

use crate::aws::{
    AwsContext, CfnClient, FromAwsContext, IamClient, LogsClient, get_current_account_id,
};
use crate::collectors::spawn_collectors;
use crate::config::{ConfigError, RunConfig};
use crate::output::{CsvReportWriter, ReportSink};
use crate::reconcile::{MatchStats, Numbering, Reconciler, Residuals};
use crate::retry::CallPolicy;
use crate::sources::{LogGroupSource, RoleSource, StackSource};
use crate::walker::{StackWalker, TraversalLimits};
use anyhow::{Context, Result};
use cfn_inventory_common::stack::flatten;
use cfn_inventory_common::{CatalogRecord, RecordIndex, ReportRow, Section, load_catalog};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Settings for [`reconcile_account`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileOptions {
    pub limits: TraversalLimits,
    pub numbering: Numbering,
}

impl From<&RunConfig> for ReconcileOptions {
    fn from(config: &RunConfig) -> Self {
        Self {
            limits: config.limits,
            numbering: config.report.numbering,
        }
    }
}

/// What a finished run found
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub root_stacks: usize,
    /// Root stacks whose own identifier was in the catalog
    pub stacks_matched: usize,
    pub resources: usize,
    pub matched_catalog: usize,
    pub matched_roles: usize,
    pub matched_log_groups: usize,
    pub unmatched_resources: usize,
    pub residual_catalog: usize,
    pub residual_roles: usize,
    pub residual_log_groups: usize,
}

impl RunSummary {
    fn new(stats: &MatchStats, residuals: &Residuals) -> Self {
        Self {
            root_stacks: stats.stacks,
            stacks_matched: stats.stacks_matched,
            resources: stats.resources,
            matched_catalog: stats.matched_catalog,
            matched_roles: stats.matched_roles,
            matched_log_groups: stats.matched_log_groups,
            unmatched_resources: stats.unmatched,
            residual_catalog: residuals.catalog.len(),
            residual_roles: residuals.roles.len(),
            residual_log_groups: residuals.log_groups.len(),
        }
    }

    fn log(&self) {
        info!(
            root_stacks = self.root_stacks,
            resources = self.resources,
            matched_catalog = self.matched_catalog + self.stacks_matched,
            matched_roles = self.matched_roles,
            matched_log_groups = self.matched_log_groups,
            unmatched = self.unmatched_resources,
            "Reconciliation complete"
        );
        info!(
            catalog = self.residual_catalog,
            roles = self.residual_roles,
            log_groups = self.residual_log_groups,
            "Unlinked records"
        );
    }
}

/// Reconcile one account's stacks against the catalog and write the report.
///
/// The role and log group collectors run while root stacks are enumerated;
/// nothing is matched until both tables are complete. Rows reach `sink` one
/// stack at a time.
pub async fn reconcile_account<S, R, L, K>(
    stacks: Arc<S>,
    roles: Arc<R>,
    log_groups: Arc<L>,
    catalog: RecordIndex<CatalogRecord>,
    options: ReconcileOptions,
    sink: &mut K,
) -> Result<RunSummary>
where
    S: StackSource,
    R: RoleSource + 'static,
    L: LogGroupSource + 'static,
    K: ReportSink,
{
    let collectors = spawn_collectors(roles, log_groups);
    let walker = StackWalker::new(stacks, options.limits);

    let roots = match walker.list_root_stacks().await {
        Ok(roots) => roots,
        Err(e) => {
            collectors.abort();
            return Err(e.context("Failed to enumerate root stacks"));
        }
    };
    let auxiliary = collectors.join().await?;

    let mut reconciler = Reconciler::new(catalog, auxiliary, options.numbering);

    sink.write_row(&ReportRow::header())?;
    sink.write_row(&ReportRow::marker(Section::Stacks))?;

    for (i, root) in roots.iter().enumerate() {
        let number = i + 1;
        sink.write_row(&reconciler.match_stack(number, &root.stack_id))?;

        let tree = walker
            .expand_stack(&root.stack_id)
            .await
            .with_context(|| format!("Failed to expand stack {}", root.stack_id))?;
        let resources = flatten(tree);
        sink.write_rows(&reconciler.match_resources(number, &resources))?;
        sink.flush()?;
    }

    let (residuals, stats) = reconciler.finish();
    for section in [Section::Catalog, Section::Roles, Section::LogGroups] {
        sink.write_row(&ReportRow::marker(section))?;
        sink.write_rows(&residuals.rows(section))?;
        sink.flush()?;
    }

    let summary = RunSummary::new(&stats, &residuals);
    summary.log();
    Ok(summary)
}

/// Execute a full run against AWS.
///
/// Configuration and credentials are checked before the report file is
/// created, so a misconfigured run leaves no output behind.
pub async fn run(config: RunConfig) -> Result<RunSummary> {
    config.validate()?;

    let catalog_path = config.catalog_path().ok_or(ConfigError::MissingCatalog)?;
    let catalog = load_catalog(catalog_path, config.catalog.has_header)
        .context("Failed to load catalog")?;
    info!(
        path = %catalog_path.display(),
        records = catalog.len(),
        "Loaded catalog"
    );

    let cancel = CancellationToken::new();
    let ctrl_c = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling remote calls");
                cancel.cancel();
            }
        }
    });

    let policy = CallPolicy::new(config.retry.clone(), cancel);
    let aws = AwsContext::load(&config.aws, policy).await?;
    get_current_account_id(&aws).await?;

    let max_pages = config.limits.max_pages;
    let stacks = Arc::new(CfnClient::from_context(&aws).with_max_pages(max_pages));
    let roles = Arc::new(IamClient::from_context(&aws).with_max_pages(max_pages));
    let log_groups = Arc::new(LogsClient::from_context(&aws).with_max_pages(max_pages));

    let mut sink = CsvReportWriter::create(config.output())?;
    let result = reconcile_account(
        stacks,
        roles,
        log_groups,
        catalog,
        ReconcileOptions::from(&config),
        &mut sink,
    )
    .await;
    ctrl_c.abort();

    let summary = result?;
    sink.flush()?;
    info!(output = %config.output().display(), "Report written");
    Ok(summary)
}
