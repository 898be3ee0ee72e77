use std::fmt::Write as _;

use crate::charts::{region_color, ChartData, ChartRenderer};
use crate::config::PlottingConfig;
use crate::error::Result;

const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 150.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 60.0;
const Y_TICKS: usize = 5;
const X_TICKS: usize = 6;

/// Line chart written as a standalone SVG document.
pub struct SvgRenderer {
    width: f64,
    height: f64,
    palette: Vec<String>,
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl SvgRenderer {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            palette: PlottingConfig::default().default_colors,
        }
    }

    /// Pixel size is `figure_size` (inches) times `dpi`.
    pub fn from_config(config: &PlottingConfig) -> Self {
        let [w, h] = config.figure_size;
        let dpi = f64::from(config.dpi);
        Self::new(w * dpi, h * dpi).with_palette(config.default_colors.clone())
    }

    pub fn with_palette(mut self, palette: Vec<String>) -> Self {
        if !palette.is_empty() {
            self.palette = palette;
        }
        self
    }

    fn plot_area(&self) -> (f64, f64, f64, f64) {
        let x0 = MARGIN_LEFT;
        let y0 = MARGIN_TOP;
        let w = (self.width - MARGIN_LEFT - MARGIN_RIGHT).max(10.0);
        let h = (self.height - MARGIN_TOP - MARGIN_BOTTOM).max(10.0);
        (x0, y0, w, h)
    }

    /// The chart as a standalone SVG document.
    pub fn document(&self, chart: &ChartData) -> Result<String> {
        let (x0, y0, pw, ph) = self.plot_area();
        let mut svg = String::new();

        // Writing into a String cannot fail.
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
            w = self.width,
            h = self.height
        );
        let _ = writeln!(
            svg,
            r#"  <rect x="0" y="0" width="{}" height="{}" fill="white"/>"#,
            self.width, self.height
        );
        let _ = writeln!(
            svg,
            r#"  <text x="{:.1}" y="{:.1}" font-size="18" font-weight="bold" text-anchor="middle">{}</text>"#,
            x0 + pw / 2.0,
            y0 / 2.0 + 6.0,
            escape(&chart.title())
        );

        let Some((first, last, lo, hi)) = chart.bounds() else {
            let _ = writeln!(
                svg,
                r#"  <text x="{:.1}" y="{:.1}" font-size="14" text-anchor="middle">{}</text>"#,
                x0 + pw / 2.0,
                y0 + ph / 2.0,
                escape(&chart.empty_message())
            );
            svg.push_str("</svg>\n");
            return Ok(svg);
        };

        let span = (last - first).num_seconds().max(1) as f64;
        let (lo, hi) = if (hi - lo).abs() < f64::EPSILON {
            (lo - 1.0, hi + 1.0)
        } else {
            (lo, hi)
        };
        let sx = |t: chrono::DateTime<chrono::Utc>| x0 + (t - first).num_seconds() as f64 / span * pw;
        let sy = |v: f64| y0 + ph - (v - lo) / (hi - lo) * ph;

        // Grid and y ticks
        for i in 0..=Y_TICKS {
            let value = lo + (hi - lo) * i as f64 / Y_TICKS as f64;
            let y = sy(value);
            let _ = writeln!(
                svg,
                r##"  <line x1="{:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="#dddddd" stroke-width="1"/>"##,
                x0,
                x0 + pw
            );
            let _ = writeln!(
                svg,
                r#"  <text x="{:.1}" y="{:.1}" font-size="11" text-anchor="end">{:.1}</text>"#,
                x0 - 6.0,
                y + 4.0,
                value
            );
        }

        for i in 0..=X_TICKS {
            let secs = (span * i as f64 / X_TICKS as f64) as i64;
            let t = first + chrono::Duration::seconds(secs);
            let x = sx(t);
            let _ = writeln!(
                svg,
                r#"  <text x="{x:.1}" y="{:.1}" font-size="11" text-anchor="middle">{}</text>"#,
                y0 + ph + 18.0,
                t.format("%H:%M")
            );
        }

        // Axes
        let _ = writeln!(
            svg,
            r#"  <line x1="{x0:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="black" stroke-width="1"/>"#,
            y0 + ph,
            x0 + pw,
            y0 + ph
        );
        let _ = writeln!(
            svg,
            r#"  <line x1="{x0:.1}" y1="{y0:.1}" x2="{x0:.1}" y2="{:.1}" stroke="black" stroke-width="1"/>"#,
            y0 + ph
        );
        let _ = writeln!(
            svg,
            r#"  <text x="{:.1}" y="{:.1}" font-size="12" text-anchor="middle">Time (UTC)</text>"#,
            x0 + pw / 2.0,
            self.height - 15.0
        );
        let _ = writeln!(
            svg,
            r#"  <text x="15" y="{:.1}" font-size="12" text-anchor="middle" transform="rotate(-90 15 {:.1})">{}</text>"#,
            y0 + ph / 2.0,
            y0 + ph / 2.0,
            escape(&chart.y_label())
        );

        // Series and legend
        for (index, (code, points)) in chart.series.series.iter().enumerate() {
            let color = region_color(code, &self.palette);

            if !points.is_empty() {
                let coords = points
                    .iter()
                    .map(|p| format!("{:.1},{:.1}", sx(p.timestamp), sy(p.value)))
                    .collect::<Vec<_>>()
                    .join(" ");
                let _ = writeln!(
                    svg,
                    r#"  <polyline data-region="{}" points="{}" fill="none" stroke="{}" stroke-width="2"/>"#,
                    escape(code),
                    coords,
                    color
                );
            }

            let ly = y0 + 10.0 + index as f64 * 20.0;
            let lx = x0 + pw + 15.0;
            let _ = writeln!(
                svg,
                r#"  <line x1="{lx:.1}" y1="{ly:.1}" x2="{:.1}" y2="{ly:.1}" stroke="{}" stroke-width="2"/>"#,
                lx + 20.0,
                color
            );
            let _ = writeln!(
                svg,
                r#"  <text x="{:.1}" y="{:.1}" font-size="12">{}</text>"#,
                lx + 26.0,
                ly + 4.0,
                escape(code)
            );
        }

        svg.push_str("</svg>\n");
        Ok(svg)
    }
}

impl ChartRenderer for SvgRenderer {
    fn name(&self) -> &str {
        "svg"
    }

    fn render(&self, chart: &ChartData) -> Result<Vec<u8>> {
        self.document(chart).map(String::into_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::test_support::sample_chart;

    #[test]
    fn test_svg_document() {
        let renderer = SvgRenderer::from_config(&PlottingConfig::default());
        let svg = renderer.document(&sample_chart()).unwrap();

        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"1000\" height=\"600\""));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert!(svg.contains("data-region=\"london\""));
        assert!(svg.contains("Temperature - Last 24 hours"));
        assert!(svg.contains("Temperature (°C)"));
    }

    #[test]
    fn test_region_keeps_its_color() {
        let palette = PlottingConfig::default().default_colors;
        let renderer = SvgRenderer::new(800.0, 400.0).with_palette(palette.clone());
        let svg = renderer.document(&sample_chart()).unwrap();

        let line = svg
            .lines()
            .find(|l| l.contains(r#"data-region="paris""#))
            .unwrap();
        assert!(line.contains(region_color("paris", &palette)));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }
}
