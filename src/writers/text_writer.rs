use crate::error::Result;
use crate::models::{StoredObservation, FIELD_NAMES};
use crate::utils::constants::TEXT_SEPARATOR;
use crate::writers::RecordWriter;

/// Human-readable table: header, a rule of `=` as wide as the header, then one line per row.
pub struct TextWriter {
    separator: String,
}

impl TextWriter {
    pub fn new() -> Self {
        Self {
            separator: TEXT_SEPARATOR.to_string(),
        }
    }
}

impl Default for TextWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordWriter for TextWriter {
    fn render(&self, records: &[StoredObservation]) -> Result<Vec<u8>> {
        let header = FIELD_NAMES.join(&self.separator);
        let mut out = String::with_capacity(header.len() * (records.len() + 2));

        out.push_str(&header);
        out.push('\n');
        out.push_str(&"=".repeat(header.chars().count()));
        out.push('\n');

        for record in records {
            let line = record
                .field_values()
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(&self.separator);
            out.push_str(&line);
            out.push('\n');
        }

        Ok(out.into_bytes())
    }
}
