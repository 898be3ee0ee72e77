use chrono::Utc;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

use crate::error::Result;
use crate::models::{FieldValue, StoredObservation, FIELD_NAMES};
use crate::utils::timestamp::format_canonical;
use crate::writers::RecordWriter;

/// `<weather_data exported_at=".." total_records="..">` with one `<record>` per row.
pub struct XmlWriter {
    indent: usize,
}

impl XmlWriter {
    pub fn new() -> Self {
        Self { indent: 2 }
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordWriter for XmlWriter {
    fn render(&self, records: &[StoredObservation]) -> Result<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', self.indent);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let exported_at = format_canonical(&Utc::now());
        let total = records.len().to_string();
        let root = BytesStart::new("weather_data").with_attributes([
            ("exported_at", exported_at.as_str()),
            ("total_records", total.as_str()),
        ]);
        writer.write_event(Event::Start(root))?;

        for record in records {
            writer.write_event(Event::Start(BytesStart::new("record")))?;

            for (name, value) in FIELD_NAMES.iter().zip(record.field_values()) {
                match value {
                    FieldValue::Null => {
                        writer.write_event(Event::Empty(BytesStart::new(*name)))?;
                    }
                    other => {
                        let text = other.to_string();
                        writer.write_event(Event::Start(BytesStart::new(*name)))?;
                        writer.write_event(Event::Text(BytesText::new(&text)))?;
                        writer.write_event(Event::End(BytesEnd::new(*name)))?;
                    }
                }
            }

            writer.write_event(Event::End(BytesEnd::new("record")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("weather_data")))?;

        let mut bytes = writer.into_inner().into_inner();
        bytes.push(b'\n');
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writers::test_support::sample_records;

    #[test]
    fn test_xml_structure() {
        let bytes = XmlWriter::new().render(&sample_records()).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(text.contains("total_records=\"2\""));
        assert!(text.contains("exported_at=\""));
        assert_eq!(text.matches("<record>").count(), 2);
        assert!(text.contains("<region_code>london</region_code>"));
        assert!(text.contains("<timestamp>2024-01-15T13:00:00Z</timestamp>"));
        assert!(text.contains("<cloud_cover/>"));
        assert!(text.contains("<region_name>King"));
    }

    #[test]
    fn test_xml_is_indented() {
        let bytes = XmlWriter::new().render(&sample_records()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\n  <record>"));
        assert!(text.contains("\n    <id>2</id>"));
    }
}
