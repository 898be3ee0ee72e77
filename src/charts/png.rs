use std::sync::Arc;

use tracing::debug;

use crate::charts::{ChartData, ChartRenderer, SvgRenderer};
use crate::config::PlottingConfig;
use crate::error::{MonitorError, Result};

/// Rasterizes the SVG chart into a PNG image.
pub struct PngRenderer {
    svg: SvgRenderer,
    fonts: Arc<usvg::fontdb::Database>,
}

impl PngRenderer {
    pub fn new(svg: SvgRenderer) -> Self {
        let mut fonts = usvg::fontdb::Database::new();
        fonts.load_system_fonts();
        debug!("Loaded {} font faces for PNG charts", fonts.len());

        Self {
            svg,
            fonts: Arc::new(fonts),
        }
    }

    pub fn from_config(config: &PlottingConfig) -> Self {
        Self::new(SvgRenderer::from_config(config))
    }

    fn rasterize(&self, document: &str) -> Result<Vec<u8>> {
        let options = usvg::Options {
            fontdb: Arc::clone(&self.fonts),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_str(document, &options)
            .map_err(|e| MonitorError::Render(format!("invalid chart SVG: {}", e)))?;

        let size = tree.size().to_int_size();
        let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height()).ok_or_else(|| {
            MonitorError::Render(format!(
                "cannot allocate a {}x{} image",
                size.width(),
                size.height()
            ))
        })?;
        pixmap.fill(tiny_skia::Color::WHITE);

        resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

        pixmap
            .encode_png()
            .map_err(|e| MonitorError::Render(format!("PNG encoding failed: {}", e)))
    }
}

impl ChartRenderer for PngRenderer {
    fn name(&self) -> &str {
        "png"
    }

    fn render(&self, chart: &ChartData) -> Result<Vec<u8>> {
        let document = self.svg.document(chart)?;
        self.rasterize(&document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::test_support::sample_chart;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    #[test]
    fn test_png_image() {
        let renderer = PngRenderer::new(SvgRenderer::new(400.0, 300.0));
        let bytes = renderer.render(&sample_chart()).unwrap();

        assert_eq!(&bytes[..8], &PNG_SIGNATURE);
        // IHDR carries width and height as big-endian u32
        assert_eq!(u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]), 400);
        assert_eq!(u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]), 300);
    }

    #[test]
    fn test_png_uses_configured_size() {
        let renderer = PngRenderer::from_config(&PlottingConfig::default());
        let bytes = renderer.render(&sample_chart()).unwrap();

        assert_eq!(&bytes[..8], &PNG_SIGNATURE);
        assert_eq!(u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]), 1000);
    }

    #[test]
    fn test_rejects_broken_document() {
        let renderer = PngRenderer::new(SvgRenderer::new(10.0, 10.0));
        let err = renderer.rasterize("<svg").unwrap_err();
        assert!(matches!(err, MonitorError::Render(_)));
    }
}
