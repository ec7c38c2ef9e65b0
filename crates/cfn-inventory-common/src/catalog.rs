//! Loading the exported inventory CSV
//!
//! The catalog is a comma-delimited table where column 0 is the identifier
//! and columns 1..=4 are name/service/type/region. Row widths may vary.

use crate::index::RecordIndex;
use crate::record::CatalogRecord;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Catalog loading errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Catalog file could not be opened
    #[error("Failed to open catalog file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A record could not be parsed
    #[error("Malformed catalog record at line {line}: {source}")]
    Parse {
        line: u64,
        #[source]
        source: csv::Error,
    },
}

/// Parse catalog records from any reader.
///
/// Blank rows are skipped. With `has_header` the first row is treated as a
/// header and not loaded.
pub fn parse_catalog<R: Read>(
    reader: R,
    has_header: bool,
) -> Result<RecordIndex<CatalogRecord>, CatalogError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(has_header)
        .flexible(true)
        .trim(csv::Trim::Fields)
        .from_reader(reader);

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result.map_err(|source| CatalogError::Parse {
            line: source.position().map(|p| p.line()).unwrap_or(0),
            source,
        })?;

        if row.iter().all(str::is_empty) {
            continue;
        }
        records.push(CatalogRecord::from_fields(row.iter()));
    }

    debug!(records = records.len(), "Parsed catalog");
    Ok(RecordIndex::from_records(records))
}

/// Load the catalog file at `path`.
pub fn load_catalog(
    path: impl AsRef<Path>,
    has_header: bool,
) -> Result<RecordIndex<CatalogRecord>, CatalogError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_catalog(std::io::BufReader::new(file), has_header)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_in_order() {
        let data = b"arn:aws:cloudformation:us-east-1:1:stack/Net/abc,NetStack,CFN,Stack,us-east-1\n\
                     vpc-123, main-vpc , EC2, VPC, us-east-1\n";
        let index = parse_catalog(&data[..], false).unwrap();
        let records: Vec<_> = index.iter().collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "NetStack");
        assert_eq!(records[1].identifier, "vpc-123");
        assert_eq!(records[1].name, "main-vpc");
        assert_eq!(records[1].service, "EC2");
    }

    #[test]
    fn tolerates_variable_widths() {
        let data = b"a,b\nc,d,e,f,g,h,i\n";
        let index = parse_catalog(&data[..], false).unwrap();
        let records: Vec<_> = index.iter().collect();
        assert_eq!(records[0].region, "");
        assert_eq!(records[1].region, "g");
        assert_eq!(records[1].extra, vec!["h".to_string(), "i".to_string()]);
    }

    #[test]
    fn skips_header_when_requested() {
        let data = b"Identifier,Name,Service,Type,Region\nvpc-1,main,EC2,VPC,us-east-1\n";
        assert_eq!(parse_catalog(&data[..], true).unwrap().len(), 1);
        assert_eq!(parse_catalog(&data[..], false).unwrap().len(), 2);
    }

    #[test]
    fn skips_blank_rows() {
        let data = b"vpc-1,main\n,,,\nvpc-2,other\n";
        assert_eq!(parse_catalog(&data[..], false).unwrap().len(), 2);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_catalog("/nonexistent/catalog.csv", false).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/catalog.csv"));
    }
}
