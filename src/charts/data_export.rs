use chrono::Utc;
use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::charts::ChartData;
use crate::error::{MonitorError, Result};
use crate::storage::SeriesPoint;
use crate::utils::timestamp::format_canonical;

/// Formats the plotted series (not the full rows) can be exported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartDataFormat {
    Csv,
    Json,
    Xlsx,
}

impl ChartDataFormat {
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "csv" => Ok(ChartDataFormat::Csv),
            "json" => Ok(ChartDataFormat::Json),
            "xlsx" | "excel" => Ok(ChartDataFormat::Xlsx),
            other => Err(MonitorError::InvalidInput(format!(
                "Unsupported format: {}. Supported: csv, json, excel",
                other
            ))),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ChartDataFormat::Csv => "csv",
            ChartDataFormat::Json => "json",
            ChartDataFormat::Xlsx => "xlsx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ChartDataFormat::Csv => "text/csv",
            ChartDataFormat::Json => "application/json",
            ChartDataFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

#[derive(Serialize)]
struct SeriesDocument<'a> {
    metric: &'static str,
    exported_at: String,
    regions: BTreeMap<&'a str, &'a [SeriesPoint]>,
}

pub struct ChartDataExporter {
    format: ChartDataFormat,
}

impl ChartDataExporter {
    pub fn new(format: ChartDataFormat) -> Self {
        Self { format }
    }

    /// `None` when the chart holds no points.
    pub fn render(&self, chart: &ChartData) -> Result<Option<Vec<u8>>> {
        if chart.is_empty() {
            return Ok(None);
        }

        let bytes = match self.format {
            ChartDataFormat::Csv => Self::render_csv(chart)?,
            ChartDataFormat::Json => Self::render_json(chart)?,
            ChartDataFormat::Xlsx => Self::render_xlsx(chart)?,
        };
        Ok(Some(bytes))
    }

    fn render_csv(chart: &ChartData) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["Region", "Timestamp", chart.metric.display_name()])?;

        for (code, points) in &chart.series.series {
            for point in points {
                writer.write_record([
                    code.clone(),
                    format_canonical(&point.timestamp),
                    point.value.to_string(),
                ])?;
            }
        }

        writer
            .into_inner()
            .map_err(|e| MonitorError::Io(e.into_error()))
    }

    fn render_json(chart: &ChartData) -> Result<Vec<u8>> {
        let document = SeriesDocument {
            metric: chart.metric.column(),
            exported_at: format_canonical(&Utc::now()),
            regions: chart
                .series
                .series
                .iter()
                .map(|(code, points)| (code.as_str(), points.as_slice()))
                .collect(),
        };
        Ok(serde_json::to_vec_pretty(&document)?)
    }

    /// One sheet with a bold header row and one row per point.
    fn render_xlsx(chart: &ChartData) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(format!("{} Data", chart.metric.display_name()))?;

        let bold = Format::new().set_bold();
        sheet.write_string_with_format(0, 0, "Region", &bold)?;
        sheet.write_string_with_format(0, 1, "Timestamp", &bold)?;
        sheet.write_string_with_format(0, 2, chart.metric.display_name(), &bold)?;

        let mut row: u32 = 1;
        for (code, points) in &chart.series.series {
            for point in points {
                sheet.write_string(row, 0, code)?;
                sheet.write_string(row, 1, format_canonical(&point.timestamp))?;
                sheet.write_number(row, 2, point.value)?;
                row += 1;
            }
        }
        sheet.autofit();

        Ok(workbook.save_to_buffer()?)
    }
}
