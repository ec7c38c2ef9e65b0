//! Match-and-consume reconciliation of discovered resources
//!
//! Every discovered resource is looked up in the catalog first, then in the
//! role table, then in the log group table. The first table that has a match
//! gives up that record: it is removed, so no other resource can bind to it.
//! Whatever is left in the three tables afterwards is the residual output.
//!
//! The reconciler owns all three tables and runs on a single task; there is
//! no locking because nothing else can see the tables once collection ends.

use crate::collectors::AuxiliaryTables;
use cfn_inventory_common::report::residual_rows;
use cfn_inventory_common::stack::flatten;
use cfn_inventory_common::{
    CatalogRecord, Descriptive, DiscoveredResource, IndexedRecord, KeyMatcher, LogGroupRecord,
    RecordIndex, ReportRow, ReportSections, RoleRecord, Section, StackNode, StackTreeNode,
};
use tracing::{debug, trace};

/// How resource rows inside a stack are sub-numbered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Numbering {
    /// Matched rows take the next match number; unmatched rows take their
    /// position in the flattened tree and do not advance the match number.
    #[default]
    Observed,
    /// Every row takes its position in the flattened tree.
    Sequential,
}

/// Table a lookup was satisfied from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource {
    Catalog,
    Role,
    LogGroup,
}

/// Counters gathered while reconciling
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchStats {
    pub stacks: usize,
    pub stacks_matched: usize,
    pub resources: usize,
    pub matched_catalog: usize,
    pub matched_roles: usize,
    pub matched_log_groups: usize,
    pub unmatched: usize,
}

impl MatchStats {
    fn record(&mut self, source: Option<MatchSource>) {
        self.resources += 1;
        match source {
            Some(MatchSource::Catalog) => self.matched_catalog += 1,
            Some(MatchSource::Role) => self.matched_roles += 1,
            Some(MatchSource::LogGroup) => self.matched_log_groups += 1,
            None => self.unmatched += 1,
        }
    }
}

/// Records never matched to a discovered resource, in table order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Residuals {
    pub catalog: Vec<CatalogRecord>,
    pub roles: Vec<RoleRecord>,
    pub log_groups: Vec<LogGroupRecord>,
}

impl Residuals {
    /// Numbered rows for a residual section; the stack section has none.
    pub fn rows(&self, section: Section) -> Vec<ReportRow> {
        match section {
            Section::Stacks => Vec::new(),
            Section::Catalog => residual_rows(&self.catalog),
            Section::Roles => residual_rows(&self.roles),
            Section::LogGroups => residual_rows(&self.log_groups),
        }
    }
}

/// A root stack together with its expanded resource tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedStack {
    pub stack: StackNode,
    pub resources: Vec<StackTreeNode>,
}

/// Owner of the catalog and auxiliary tables during reconciliation
#[derive(Debug)]
pub struct Reconciler {
    catalog: RecordIndex<CatalogRecord>,
    roles: RecordIndex<RoleRecord>,
    log_groups: RecordIndex<LogGroupRecord>,
    numbering: Numbering,
    stats: MatchStats,
}

impl Reconciler {
    pub fn new(
        catalog: RecordIndex<CatalogRecord>,
        auxiliary: AuxiliaryTables,
        numbering: Numbering,
    ) -> Self {
        Self {
            catalog,
            roles: auxiliary.roles,
            log_groups: auxiliary.log_groups,
            numbering,
            stats: MatchStats::default(),
        }
    }

    /// Row for root stack number `number`.
    ///
    /// Only the catalog is consulted for stacks. A matching catalog record is
    /// consumed and its descriptive columns fill the row.
    pub fn match_stack(&mut self, number: usize, stack_id: &str) -> ReportRow {
        self.stats.stacks += 1;
        let descriptive = self.catalog.take(stack_id).map(|record| {
            self.stats.stacks_matched += 1;
            record.descriptive()
        });
        debug!(number, stack_id, matched = descriptive.is_some(), "Reconciled stack");
        ReportRow::stack(number, stack_id, descriptive)
    }

    /// Rows for the flattened resources of stack number `number`.
    pub fn match_resources(
        &mut self,
        number: usize,
        resources: &[DiscoveredResource],
    ) -> Vec<ReportRow> {
        let mut matched = 0usize;
        let mut rows = Vec::with_capacity(resources.len());

        for (position, resource) in resources.iter().enumerate() {
            let found = self.lookup(&resource.physical_id);
            let source = found.as_ref().map(|(source, _)| *source);
            self.stats.record(source);

            let sub = match self.numbering {
                Numbering::Sequential => position + 1,
                Numbering::Observed if found.is_some() => {
                    matched += 1;
                    matched
                }
                Numbering::Observed => position + 1,
            };

            rows.push(ReportRow::resource(
                format!("{number}.{sub}"),
                &resource.physical_id,
                &resource.logical_id,
                found.map(|(_, descriptive)| descriptive),
            ));
        }

        debug!(
            number,
            resources = resources.len(),
            matched,
            "Reconciled stack resources"
        );
        rows
    }

    /// Find and consume the record for `key`: catalog, then roles, then log groups.
    pub fn lookup(&mut self, key: &str) -> Option<(MatchSource, Descriptive)> {
        let matcher = KeyMatcher::new(key);

        let found = if let Some(record) = self.catalog.take_with(&matcher) {
            Some((MatchSource::Catalog, record.descriptive()))
        } else if let Some(record) = self.roles.take_with(&matcher) {
            Some((MatchSource::Role, record.descriptive()))
        } else {
            self.log_groups
                .take_with(&matcher)
                .map(|record| (MatchSource::LogGroup, record.descriptive()))
        };

        trace!(key, source = ?found.as_ref().map(|(s, _)| s), "Lookup");
        found
    }

    pub fn stats(&self) -> &MatchStats {
        &self.stats
    }

    /// Give up the tables, returning every record that was never consumed.
    pub fn finish(self) -> (Residuals, MatchStats) {
        let residuals = Residuals {
            catalog: self.catalog.into_remaining(),
            roles: self.roles.into_remaining(),
            log_groups: self.log_groups.into_remaining(),
        };
        (residuals, self.stats)
    }
}

/// Reconcile already expanded stacks against the catalog and auxiliary tables.
pub fn reconcile(
    stacks: Vec<ExpandedStack>,
    catalog: RecordIndex<CatalogRecord>,
    auxiliary: AuxiliaryTables,
    numbering: Numbering,
) -> ReportSections {
    let mut reconciler = Reconciler::new(catalog, auxiliary, numbering);
    let mut sections = ReportSections::default();

    for (i, expanded) in stacks.into_iter().enumerate() {
        let number = i + 1;
        sections
            .stacks
            .push(reconciler.match_stack(number, &expanded.stack.stack_id));
        let resources = flatten(expanded.resources);
        sections
            .stacks
            .extend(reconciler.match_resources(number, &resources));
    }

    let (residuals, _) = reconciler.finish();
    sections.catalog = residuals.rows(Section::Catalog);
    sections.roles = residuals.rows(Section::Roles);
    sections.log_groups = residuals.rows(Section::LogGroups);
    sections
}
