//! Concurrent collection of the IAM role and log group inventories
//!
//! Each collector runs as its own task and hands its finished table back
//! through a oneshot channel. [`CollectorHandles::join`] is the barrier:
//! it waits for both tasks, then receives both tables, so reconciliation
//! never starts with a partial table.

use crate::sources::{LogGroupSource, RoleSource};
use anyhow::{Context, Result};
use cfn_inventory_common::{LogGroupRecord, RecordIndex, RoleRecord};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Build the role table from `source`.
pub async fn collect_roles<R: RoleSource>(source: &R) -> Result<RecordIndex<RoleRecord>> {
    let roles = source.list_roles().await.context("Role collector failed")?;
    let index: RecordIndex<RoleRecord> = roles.into_iter().map(RoleRecord::from).collect();
    info!(roles = index.len(), "Collected IAM roles");
    Ok(index)
}

/// Build the log group table from `source`.
pub async fn collect_log_groups<L: LogGroupSource>(
    source: &L,
) -> Result<RecordIndex<LogGroupRecord>> {
    let groups = source
        .list_log_groups()
        .await
        .context("Log group collector failed")?;
    let index: RecordIndex<LogGroupRecord> = groups.into_iter().map(LogGroupRecord::from).collect();
    info!(log_groups = index.len(), "Collected log groups");
    Ok(index)
}

/// Both auxiliary tables, fully materialized
#[derive(Debug, Default)]
pub struct AuxiliaryTables {
    pub roles: RecordIndex<RoleRecord>,
    pub log_groups: RecordIndex<LogGroupRecord>,
}

/// Handles to the two running collector tasks
pub struct CollectorHandles {
    role_task: JoinHandle<()>,
    log_group_task: JoinHandle<()>,
    roles: oneshot::Receiver<Result<RecordIndex<RoleRecord>>>,
    log_groups: oneshot::Receiver<Result<RecordIndex<LogGroupRecord>>>,
}

/// Start both collectors on the runtime and return immediately.
pub fn spawn_collectors<R, L>(roles: Arc<R>, log_groups: Arc<L>) -> CollectorHandles
where
    R: RoleSource + 'static,
    L: LogGroupSource + 'static,
{
    let (role_tx, role_rx) = oneshot::channel();
    let (log_group_tx, log_group_rx) = oneshot::channel();

    let role_task = tokio::spawn(async move {
        // The receiver is only gone when the run was abandoned
        let _ = role_tx.send(collect_roles(roles.as_ref()).await);
    });
    let log_group_task = tokio::spawn(async move {
        let _ = log_group_tx.send(collect_log_groups(log_groups.as_ref()).await);
    });
    debug!("Spawned auxiliary collectors");

    CollectorHandles {
        role_task,
        log_group_task,
        roles: role_rx,
        log_groups: log_group_rx,
    }
}

impl CollectorHandles {
    /// Wait for both collectors, then take their tables.
    ///
    /// Fails if either collector failed; a failure in one does not leave
    /// the other running.
    pub async fn join(self) -> Result<AuxiliaryTables> {
        let (role_done, log_group_done) = tokio::join!(self.role_task, self.log_group_task);
        role_done.context("Role collector task panicked")?;
        log_group_done.context("Log group collector task panicked")?;

        let roles = self
            .roles
            .await
            .context("Role collector exited without a result")??;
        let log_groups = self
            .log_groups
            .await
            .context("Log group collector exited without a result")??;

        Ok(AuxiliaryTables { roles, log_groups })
    }

    /// Stop both collectors; used when the run fails before the join.
    pub fn abort(&self) {
        self.role_task.abort();
        self.log_group_task.abort();
    }
}
