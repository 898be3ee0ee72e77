use crate::charts::{ChartData, ChartRenderer};
use crate::config::PlottingConfig;
use crate::error::Result;
use crate::utils::constants::{DEFAULT_CHART_HEIGHT, DEFAULT_CHART_WIDTH};

const LABEL_WIDTH: usize = 9;
const TIME_LABEL_FORMAT: &str = "%m-%d %H:%M";

/// Scatter plot drawn with one symbol per region, for terminals.
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    symbols: Vec<char>,
}

impl AsciiRenderer {
    pub fn new() -> Self {
        Self {
            width: DEFAULT_CHART_WIDTH,
            height: DEFAULT_CHART_HEIGHT,
            symbols: vec!['•', '×', '+', 'o', '*'],
        }
    }

    pub fn from_config(config: &PlottingConfig) -> Self {
        Self::new()
            .with_size(config.chart_width, config.chart_height)
            .with_symbols(&config.ascii_symbols)
    }

    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width.max(LABEL_WIDTH + 10);
        self.height = height.max(3);
        self
    }

    pub fn with_symbols(mut self, symbols: &[String]) -> Self {
        let parsed: Vec<char> = symbols.iter().filter_map(|s| s.chars().next()).collect();
        if !parsed.is_empty() {
            self.symbols = parsed;
        }
        self
    }

    fn symbol(&self, index: usize) -> char {
        self.symbols[index % self.symbols.len()]
    }

    fn plot_width(&self) -> usize {
        self.width - LABEL_WIDTH - 1
    }
}

impl Default for AsciiRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl AsciiRenderer {
    /// The chart as terminal text.
    pub fn render_text(&self, chart: &ChartData) -> Result<String> {
        let Some((first, last, lo, hi)) = chart.bounds() else {
            return Ok(chart.empty_message());
        };

        let plot_width = self.plot_width();
        let span_secs = (last - first).num_seconds().max(1) as f64;
        let (lo, hi) = if (hi - lo).abs() < f64::EPSILON {
            (lo - 1.0, hi + 1.0)
        } else {
            (lo, hi)
        };

        let mut grid = vec![vec![' '; plot_width]; self.height];

        for (index, (_, points)) in chart.series.series.iter().enumerate() {
            let symbol = self.symbol(index);
            for point in points {
                let x_frac = (point.timestamp - first).num_seconds() as f64 / span_secs;
                let y_frac = (point.value - lo) / (hi - lo);
                let col = (x_frac * (plot_width - 1) as f64).round() as usize;
                let row = (y_frac * (self.height - 1) as f64).round() as usize;
                grid[self.height - 1 - row][col.min(plot_width - 1)] = symbol;
            }
        }

        let mut lines = Vec::with_capacity(self.height + 6);
        lines.push(format!("{:^width$}", chart.title(), width = self.width));
        lines.push(chart.y_label());

        for (r, row) in grid.iter().enumerate() {
            let label = if r == 0 {
                format!("{:>w$.1}", hi, w = LABEL_WIDTH - 1)
            } else if r == self.height - 1 {
                format!("{:>w$.1}", lo, w = LABEL_WIDTH - 1)
            } else if r == self.height / 2 {
                format!("{:>w$.1}", (hi + lo) / 2.0, w = LABEL_WIDTH - 1)
            } else {
                " ".repeat(LABEL_WIDTH - 1)
            };
            let line: String = row.iter().collect();
            lines.push(format!("{} ┤{}", label, line.trim_end()));
        }

        lines.push(format!("{} └{}", " ".repeat(LABEL_WIDTH - 1), "─".repeat(plot_width)));

        let start = first.format(TIME_LABEL_FORMAT).to_string();
        let end = last.format(TIME_LABEL_FORMAT).to_string();
        let gap = plot_width.saturating_sub(start.len() + end.len());
        lines.push(format!(
            "{}  {}{}{}",
            " ".repeat(LABEL_WIDTH - 1),
            start,
            " ".repeat(gap),
            end
        ));

        let legend = chart
            .series
            .series
            .iter()
            .enumerate()
            .map(|(i, (code, points))| format!("{} {} ({} pts)", self.symbol(i), code, points.len()))
            .collect::<Vec<_>>()
            .join("   ");
        lines.push(String::new());
        lines.push(format!("Legend: {}", legend));

        Ok(lines.join("\n"))
    }
}

impl ChartRenderer for AsciiRenderer {
    fn name(&self) -> &str {
        "ascii"
    }

    fn render(&self, chart: &ChartData) -> Result<Vec<u8>> {
        self.render_text(chart).map(String::into_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::test_support::{point, sample_chart};
    use crate::models::Metric;
    use crate::storage::MetricSeries;

    #[test]
    fn test_ascii_chart_layout() {
        let renderer = AsciiRenderer::new().with_size(60, 10);
        let output = renderer.render_text(&sample_chart()).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert!(lines[0].contains("Temperature - Last 24 hours"));
        assert_eq!(lines[1], "Temperature (°C)");
        assert!(lines[2].trim_start().starts_with("11.0 ┤"));
        assert!(lines[11].trim_start().starts_with("2.0 ┤"));
        assert!(output.contains("01-15 00:00"));
        assert!(output.contains("01-15 12:00"));
        assert!(output.contains("• london (3 pts)"));
        assert!(output.contains("× paris (3 pts)"));
    }

    #[test]
    fn test_extremes_land_in_corners() {
        let renderer = AsciiRenderer::new().with_size(40, 5);
        let output = renderer.render_text(&sample_chart()).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        // Top row holds paris' maximum at the right edge, bottom row london's minimum at the left.
        assert!(lines[2].ends_with('×'));
        assert!(lines[6].contains("┤•"));
    }

    #[test]
    fn test_flat_series_and_single_point() {
        let chart = ChartData::new(
            Metric::Pressure,
            6,
            MetricSeries {
                series: vec![("london".to_string(), vec![point(3, 1013.0)])],
            },
        );
        let output = AsciiRenderer::new().render_text(&chart).unwrap();
        assert!(output.contains("1014.0"));
        assert!(output.contains("1012.0"));
    }

    #[test]
    fn test_empty_chart_message() {
        let chart = ChartData::new(Metric::Humidity, 6, MetricSeries::default());
        let output = AsciiRenderer::new().render_text(&chart).unwrap();
        assert_eq!(output, "No data found for humidity in the last 6 hours");
    }

    #[test]
    fn test_custom_symbols() {
        let renderer = AsciiRenderer::new().with_symbols(&["#".to_string(), "@".to_string()]);
        let output = renderer.render_text(&sample_chart()).unwrap();
        assert!(output.contains("# london"));
        assert!(output.contains("@ paris"));
    }
}
