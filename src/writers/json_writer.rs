use crate::error::Result;
use crate::models::StoredObservation;
use crate::writers::RecordWriter;

/// JSON array of objects keyed by field name; absent values are `null`.
pub struct JsonWriter {
    pretty: bool,
}

impl JsonWriter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordWriter for JsonWriter {
    fn render(&self, records: &[StoredObservation]) -> Result<Vec<u8>> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(records)?
        } else {
            serde_json::to_vec(records)?
        };
        Ok(bytes)
    }
}
