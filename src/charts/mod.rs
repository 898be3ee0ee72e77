//! Chart rendering for metric series.
//!
//! Renderers are picked by output format at startup. PNG is rasterized from
//! the SVG document. PDF has no backend in this build and resolves to
//! [`UnavailableRenderer`], which reports the problem per call instead of
//! failing at load time.

pub mod ascii;
pub mod data_export;
pub mod png;
pub mod svg;

pub use ascii::AsciiRenderer;
pub use data_export::{ChartDataFormat, ChartDataExporter};
pub use png::PngRenderer;
pub use svg::SvgRenderer;

use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::info;

use crate::config::PlottingConfig;
use crate::error::{MonitorError, Result};
use crate::models::Metric;
use crate::storage::MetricSeries;

/// A metric series prepared for plotting.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub metric: Metric,
    pub hours: u32,
    pub series: MetricSeries,
}

/// Extent of all plotted points: `(first, last, min, max)`.
pub type ChartBounds = (DateTime<Utc>, DateTime<Utc>, f64, f64);

impl ChartData {
    pub fn new(metric: Metric, hours: u32, series: MetricSeries) -> Self {
        Self {
            metric,
            hours,
            series,
        }
    }

    pub fn title(&self) -> String {
        format!("{} - Last {} hours", self.metric.display_name(), self.hours)
    }

    pub fn y_label(&self) -> String {
        format!("{} ({})", self.metric.display_name(), self.metric.units())
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn empty_message(&self) -> String {
        format!(
            "No data found for {} in the last {} hours",
            self.metric.column(),
            self.hours
        )
    }

    pub fn bounds(&self) -> Option<ChartBounds> {
        let mut points = self.series.series.iter().flat_map(|(_, p)| p.iter());
        let first = points.next()?;
        let init = (first.timestamp, first.timestamp, first.value, first.value);

        Some(points.fold(init, |(t0, t1, lo, hi), p| {
            (
                t0.min(p.timestamp),
                t1.max(p.timestamp),
                lo.min(p.value),
                hi.max(p.value),
            )
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartFormat {
    Ascii,
    Svg,
    Png,
    Pdf,
}

impl ChartFormat {
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "ascii" | "txt" | "terminal" => Ok(ChartFormat::Ascii),
            "svg" => Ok(ChartFormat::Svg),
            "png" => Ok(ChartFormat::Png),
            "pdf" => Ok(ChartFormat::Pdf),
            other => Err(MonitorError::InvalidInput(format!(
                "Unsupported chart format: {}. Supported: svg, png, pdf",
                other
            ))),
        }
    }

    /// Format implied by a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                MonitorError::InvalidInput(format!(
                    "Cannot infer chart format from {}",
                    path.display()
                ))
            })?;
        Self::parse(ext)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ChartFormat::Ascii => "txt",
            ChartFormat::Svg => "svg",
            ChartFormat::Png => "png",
            ChartFormat::Pdf => "pdf",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ChartFormat::Ascii => "text/plain",
            ChartFormat::Svg => "image/svg+xml",
            ChartFormat::Png => "image/png",
            ChartFormat::Pdf => "application/pdf",
        }
    }
}

/// A chart backend.
pub trait ChartRenderer: Send + Sync {
    fn name(&self) -> &str;

    fn is_available(&self) -> bool {
        true
    }

    /// Render the chart as a complete document or image.
    fn render(&self, chart: &ChartData) -> Result<Vec<u8>>;
}

/// Stands in for a backend this build does not ship.
#[derive(Debug, Clone)]
pub struct UnavailableRenderer {
    format: ChartFormat,
}

impl UnavailableRenderer {
    pub fn new(format: ChartFormat) -> Self {
        Self { format }
    }
}

impl ChartRenderer for UnavailableRenderer {
    fn name(&self) -> &str {
        self.format.extension()
    }

    fn is_available(&self) -> bool {
        false
    }

    fn render(&self, _chart: &ChartData) -> Result<Vec<u8>> {
        Err(MonitorError::BackendUnavailable(format!(
            "{} charts are not supported; use png or svg",
            self.format.extension()
        )))
    }
}

pub fn renderer_for_format(format: ChartFormat, plotting: &PlottingConfig) -> Box<dyn ChartRenderer> {
    match format {
        ChartFormat::Ascii => Box::new(AsciiRenderer::from_config(plotting)),
        ChartFormat::Svg => Box::new(SvgRenderer::from_config(plotting)),
        ChartFormat::Png => Box::new(PngRenderer::from_config(plotting)),
        ChartFormat::Pdf => Box::new(UnavailableRenderer::new(format)),
    }
}

/// Render into `path`; nothing is written when the chart is empty or the backend fails.
pub fn render_to_file(renderer: &dyn ChartRenderer, chart: &ChartData, path: &Path) -> Result<()> {
    if chart.is_empty() {
        return Err(MonitorError::InvalidInput(chart.empty_message()));
    }

    let document = renderer.render(chart)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, document)?;

    info!("Plot saved to {}", path.display());
    Ok(())
}

/// Stable palette entry for a region code (FNV-1a).
pub fn region_color<'a>(region_code: &str, palette: &'a [String]) -> &'a str {
    if palette.is_empty() {
        return "#1f77b4";
    }

    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in region_code.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    &palette[(hash % palette.len() as u64) as usize]
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::storage::SeriesPoint;
    use chrono::TimeZone;

    pub fn point(hour: u32, value: f64) -> SeriesPoint {
        SeriesPoint {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 15, hour, 0, 0).unwrap(),
            value,
        }
    }

    pub fn sample_chart() -> ChartData {
        ChartData::new(
            Metric::Temperature,
            24,
            MetricSeries {
                series: vec![
                    (
                        "london".to_string(),
                        vec![point(0, 2.0), point(6, 5.5), point(12, 9.0)],
                    ),
                    (
                        "paris".to_string(),
                        vec![point(0, 4.0), point(6, 7.0), point(12, 11.0)],
                    ),
                ],
            },
        )
    }
}
