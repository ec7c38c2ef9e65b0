//! Catalog, IAM role and log group records
//!
//! All three tables share one lookup shape ([`IndexedRecord`]) so the same
//! [`RecordIndex`](crate::RecordIndex) serves the catalog and both auxiliary
//! inventories.

use crate::defaults::{LOG_GROUP_SERVICE, LOG_GROUP_TYPE, ROLE_SERVICE, ROLE_TYPE};

/// Descriptive columns copied into an enriched report row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descriptive {
    pub name: String,
    pub service: String,
    pub resource_type: String,
    pub region: String,
}

impl Descriptive {
    /// Columns in report order: Name, Service, Type, Region
    pub fn into_columns(self) -> [String; 4] {
        [self.name, self.service, self.resource_type, self.region]
    }
}

/// A record that can live in a [`RecordIndex`](crate::RecordIndex).
pub trait IndexedRecord {
    /// Value lookup keys are matched against
    fn identifier(&self) -> &str;

    /// Columns emitted when a discovered resource binds to this record
    fn descriptive(&self) -> Descriptive;

    /// Columns emitted (after the row number) when this record is never matched
    fn residual_columns(&self) -> Vec<String>;
}

/// One row of the exported inventory catalog.
///
/// Column 0 is the identifier (ARN or resource ID), columns 1..=4 are
/// name/service/type/region. Anything past column 4 is kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogRecord {
    pub identifier: String,
    pub name: String,
    pub service: String,
    pub resource_type: String,
    pub region: String,
    pub extra: Vec<String>,
}

impl CatalogRecord {
    /// Build a record from raw CSV fields, padding missing columns with empty strings.
    pub fn from_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fields = fields.into_iter().map(Into::into);
        let mut next = || fields.next().unwrap_or_default();
        let identifier = next();
        let name = next();
        let service = next();
        let resource_type = next();
        let region = next();
        Self {
            identifier,
            name,
            service,
            resource_type,
            region,
            extra: fields.collect(),
        }
    }
}

impl IndexedRecord for CatalogRecord {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn descriptive(&self) -> Descriptive {
        Descriptive {
            name: self.name.clone(),
            service: self.service.clone(),
            resource_type: self.resource_type.clone(),
            region: self.region.clone(),
        }
    }

    fn residual_columns(&self) -> Vec<String> {
        let mut columns = vec![
            self.identifier.clone(),
            String::new(),
            self.name.clone(),
            self.service.clone(),
            self.resource_type.clone(),
            self.region.clone(),
        ];
        columns.extend(self.extra.iter().cloned());
        columns
    }
}

/// An IAM role from the role inventory.
///
/// Keyed by role name, which is what CloudFormation reports as the physical
/// ID of an `AWS::IAM::Role`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRecord {
    pub name: String,
    pub role_id: String,
    pub arn: String,
}

impl IndexedRecord for RoleRecord {
    fn identifier(&self) -> &str {
        &self.name
    }

    fn descriptive(&self) -> Descriptive {
        Descriptive {
            name: self.name.clone(),
            service: ROLE_SERVICE.to_string(),
            resource_type: ROLE_TYPE.to_string(),
            region: String::new(),
        }
    }

    fn residual_columns(&self) -> Vec<String> {
        vec![
            self.arn.clone(),
            self.role_id.clone(),
            self.name.clone(),
            ROLE_SERVICE.to_string(),
            ROLE_TYPE.to_string(),
            String::new(),
        ]
    }
}

/// A CloudWatch Logs log group from the log group inventory.
///
/// Keyed by log group name (the physical ID of an `AWS::Logs::LogGroup`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogGroupRecord {
    pub name: String,
    pub arn: String,
}

impl IndexedRecord for LogGroupRecord {
    fn identifier(&self) -> &str {
        &self.name
    }

    fn descriptive(&self) -> Descriptive {
        Descriptive {
            name: self.name.clone(),
            service: LOG_GROUP_SERVICE.to_string(),
            resource_type: LOG_GROUP_TYPE.to_string(),
            region: String::new(),
        }
    }

    fn residual_columns(&self) -> Vec<String> {
        vec![
            self.arn.clone(),
            String::new(),
            self.name.clone(),
            LOG_GROUP_SERVICE.to_string(),
            LOG_GROUP_TYPE.to_string(),
            String::new(),
        ]
    }
}
