//! Report sinks
//!
//! The orchestrator writes rows as soon as each stack is reconciled and
//! flushes after every stack and every residual section, so a failed run
//! still leaves everything written up to the failure on disk.

use anyhow::{Context, Result};
use cfn_inventory_common::ReportRow;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Destination for report rows.
pub trait ReportSink {
    fn write_row(&mut self, row: &ReportRow) -> Result<()>;

    fn write_rows(&mut self, rows: &[ReportRow]) -> Result<()> {
        for row in rows {
            self.write_row(row)?;
        }
        Ok(())
    }

    /// Push everything written so far to the underlying destination.
    fn flush(&mut self) -> Result<()>;
}

/// CSV report writer; rows may have different widths.
pub struct CsvReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvReportWriter<File> {
    /// Create (or truncate) the report file at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create report file {}", path.display()))?;
        Ok(Self::from_writer(file))
    }
}

impl<W: Write> CsvReportWriter<W> {
    pub fn from_writer(writer: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .flexible(true)
                .from_writer(writer),
        }
    }

    /// Flush and hand back the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush report: {}", e.error()))
    }
}

impl<W: Write> ReportSink for CsvReportWriter<W> {
    fn write_row(&mut self, row: &ReportRow) -> Result<()> {
        self.writer
            .write_record(row.fields())
            .context("Failed to write report row")
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush report")
    }
}

/// Collects rows in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub rows: Vec<ReportRow>,
    pub flushes: usize,
}

impl ReportSink for MemorySink {
    fn write_row(&mut self, row: &ReportRow) -> Result<()> {
        self.rows.push(row.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }
}
