use crate::error::{MonitorError, Result};
use crate::models::{StoredObservation, FIELD_NAMES};
use crate::writers::RecordWriter;

/// Delimited text with a header row. Absent values are empty cells.
pub struct CsvWriter {
    delimiter: u8,
}

impl CsvWriter {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn tsv() -> Self {
        Self::new().with_delimiter(b'\t')
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordWriter for CsvWriter {
    fn render(&self, records: &[StoredObservation]) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(Vec::new());

        writer.write_record(FIELD_NAMES)?;
        for record in records {
            writer.write_record(record.field_values().iter().map(|v| v.to_string()))?;
        }

        writer
            .into_inner()
            .map_err(|e| MonitorError::Io(e.into_error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writers::test_support::sample_records;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_csv_round_trip() {
        let records = sample_records();
        let bytes = CsvWriter::new().render(&records).unwrap();

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, FIELD_NAMES.to_vec());

        // Every column, absent values included, comes back as written
        let parsed: Vec<StoredObservation> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(parsed, records);
    }

    #[test]
    fn test_csv_cells() {
        let bytes = CsvWriter::new().render(&sample_records()).unwrap();
        let mut reader = csv::Reader::from_reader(bytes.as_slice());

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.len() == FIELD_NAMES.len()));
        assert_eq!(&rows[0][5], "2024-01-15T13:00:00Z");
        assert_eq!(&rows[1][2], "King's Lynn");
        assert_eq!(&rows[1][7], "");
    }

    #[test]
    fn test_tsv_uses_tabs() {
        let bytes = CsvWriter::tsv().render(&sample_records()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let header = text.lines().next().unwrap();
        assert!(header.starts_with("id\tregion_code\tregion_name"));
        assert!(!header.contains(','));
    }
}
