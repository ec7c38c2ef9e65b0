//! Report rows and section layout
//!
//! The report is a flat sequence of string rows: a header, then four
//! sections each introduced by a marker row (`a`..`d` plus a title).

use crate::record::{Descriptive, IndexedRecord};

/// Column header row
pub const HEADER: [&str; 7] = [
    "Sl.No.",
    "ARN/Resource ID",
    "LogicalID",
    "Name",
    "Service",
    "Type",
    "Region",
];

/// Report sections in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// Stacks and their resources
    Stacks,
    /// Catalog records never matched to a stack resource
    Catalog,
    /// IAM roles never matched to a stack resource
    Roles,
    /// Log groups never matched to a stack resource
    LogGroups,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Stacks,
        Section::Catalog,
        Section::Roles,
        Section::LogGroups,
    ];

    pub fn marker(self) -> &'static str {
        match self {
            Section::Stacks => "a",
            Section::Catalog => "b",
            Section::Roles => "c",
            Section::LogGroups => "d",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Section::Stacks => "Resource list from Cloudformation template",
            Section::Catalog => "Non cloudformation linked resource list from CSV file",
            Section::Roles => "Non cloudformation linked IAM roles",
            Section::LogGroups => "Non cloudformation linked Cloudwatch logs",
        }
    }
}

/// One output row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow(pub Vec<String>);

impl ReportRow {
    pub fn header() -> Self {
        Self(HEADER.iter().map(|s| s.to_string()).collect())
    }

    /// Marker row opening `section`
    pub fn marker(section: Section) -> Self {
        Self(vec![
            section.marker().to_string(),
            section.title().to_string(),
        ])
    }

    /// Row for a root stack, enriched when the catalog knew it
    pub fn stack(number: usize, stack_id: &str, descriptive: Option<Descriptive>) -> Self {
        Self::entry(number.to_string(), stack_id, "", descriptive)
    }

    /// Row for a stack resource; `label` is the `stack.resource` sub-number
    pub fn resource(
        label: String,
        physical_id: &str,
        logical_id: &str,
        descriptive: Option<Descriptive>,
    ) -> Self {
        Self::entry(label, physical_id, logical_id, descriptive)
    }

    /// Row for a record left over after reconciliation
    pub fn residual<R: IndexedRecord>(number: usize, record: &R) -> Self {
        let mut fields = vec![number.to_string()];
        fields.extend(record.residual_columns());
        Self(fields)
    }

    fn entry(
        label: String,
        identifier: &str,
        logical_id: &str,
        descriptive: Option<Descriptive>,
    ) -> Self {
        let mut fields = vec![label, identifier.to_string(), logical_id.to_string()];
        fields.extend(descriptive.unwrap_or_default().into_columns());
        Self(fields)
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }
}

/// A complete report, section by section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSections {
    pub stacks: Vec<ReportRow>,
    pub catalog: Vec<ReportRow>,
    pub roles: Vec<ReportRow>,
    pub log_groups: Vec<ReportRow>,
}

impl ReportSections {
    /// Data rows belonging to `section`
    pub fn section(&self, section: Section) -> &[ReportRow] {
        match section {
            Section::Stacks => &self.stacks,
            Section::Catalog => &self.catalog,
            Section::Roles => &self.roles,
            Section::LogGroups => &self.log_groups,
        }
    }

    /// All rows in output order: header, then each marker followed by its data rows.
    pub fn rows(&self) -> Vec<ReportRow> {
        let mut rows = vec![ReportRow::header()];
        for section in Section::ALL {
            rows.push(ReportRow::marker(section));
            rows.extend(self.section(section).iter().cloned());
        }
        rows
    }
}

/// Number residual records from 1 in their table order.
pub fn residual_rows<R: IndexedRecord>(records: &[R]) -> Vec<ReportRow> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| ReportRow::residual(i + 1, record))
        .collect()
}
