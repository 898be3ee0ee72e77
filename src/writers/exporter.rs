use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::Result;
use crate::models::StoredObservation;
use crate::writers::{
    CsvWriter, ExportFormat, JsonWriter, RecordWriter, SqlWriter, TextWriter, XmlWriter,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Written { records: usize, path: PathBuf },
    /// No rows matched; no file was created.
    NothingToExport,
}

/// Format dispatch for observation exports.
pub struct Exporter {
    format: ExportFormat,
    pretty: bool,
}

impl Exporter {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            pretty: true,
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    fn writer(&self) -> Box<dyn RecordWriter> {
        match self.format {
            ExportFormat::Csv => Box::new(CsvWriter::new()),
            ExportFormat::Tsv => Box::new(CsvWriter::tsv()),
            ExportFormat::Json => Box::new(JsonWriter::new().with_pretty(self.pretty)),
            ExportFormat::Xml => Box::new(XmlWriter::new()),
            ExportFormat::Txt => Box::new(TextWriter::new()),
            ExportFormat::Sql => Box::new(SqlWriter::new()),
        }
    }

    /// Serialize in memory. `None` when there is nothing to export.
    pub fn render(&self, records: &[StoredObservation]) -> Result<Option<Vec<u8>>> {
        if records.is_empty() {
            return Ok(None);
        }
        self.writer().render(records).map(Some)
    }

    /// Render and write to `path`. The file is only created once rendering succeeded.
    pub fn export_to_file(
        &self,
        records: &[StoredObservation],
        path: &Path,
    ) -> Result<ExportOutcome> {
        let Some(bytes) = self.render(records)? else {
            warn!("No data to export");
            return Ok(ExportOutcome::NothingToExport);
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, bytes)?;

        info!(
            "Successfully exported {} records to {}",
            records.len(),
            path.display()
        );
        Ok(ExportOutcome::Written {
            records: records.len(),
            path: path.to_path_buf(),
        })
    }
}
