//! PNG export of the visible viewport.

use crate::download::DownloadTarget;
use crate::raster::PixmapRenderer;
use crate::renderer::{RenderContext, Renderer, RendererError};
use crate::text::GlyphRenderer;
use boardink_core::elements::Color;
use boardink_core::engine::ExportSurface;
use thiserror::Error;
use tiny_skia::Pixmap;

/// Name of the delivered file.
pub const EXPORT_FILENAME: &str = "canvas-image.png";
/// Output pixels per device pixel.
pub const EXPORT_PIXEL_RATIO: f64 = 2.0;

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Nothing to export: surface is {width}x{height}")]
    ZeroSize { width: u32, height: u32 },
    #[error("PNG encoding failed: {0}")]
    Encode(String),
    #[error("Delivery failed: {0}")]
    Delivery(String),
    #[error("Render failed: {0}")]
    Render(RendererError),
}

impl From<RendererError> for ExportError {
    fn from(e: RendererError) -> Self {
        match e {
            RendererError::ZeroSize { width, height } => ExportError::ZeroSize { width, height },
            other => ExportError::Render(other),
        }
    }
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub pixel_ratio: f64,
    /// Fill placed beneath all content.
    pub background: Color,
    pub filename: String,
    /// TrueType/OpenType bytes for text labels. Without it text is skipped.
    pub font: Option<Vec<u8>>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            pixel_ratio: EXPORT_PIXEL_RATIO,
            background: Color::WHITE,
            filename: EXPORT_FILENAME.to_string(),
            font: None,
        }
    }
}

/// An encoded export ready for delivery.
#[derive(Debug, Clone)]
pub struct ExportedImage {
    pub filename: String,
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

/// Renders the visible part of a board to PNG.
#[derive(Debug)]
pub struct Exporter {
    options: ExportOptions,
    renderer: PixmapRenderer,
}

impl Default for Exporter {
    fn default() -> Self {
        Self {
            options: ExportOptions::default(),
            renderer: PixmapRenderer::new(),
        }
    }
}

impl Exporter {
    pub fn new(options: ExportOptions) -> ExportResult<Self> {
        let renderer = match &options.font {
            Some(bytes) => PixmapRenderer::with_glyphs(GlyphRenderer::from_bytes(bytes.clone())?),
            None => PixmapRenderer::new(),
        };
        Ok(Self { options, renderer })
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Rasterize and encode the visible viewport.
    ///
    /// A background covering the visible canvas rectangle is inserted for the
    /// duration of the render; the scene graph is restored on every path out.
    pub fn export(&mut self, surface: ExportSurface<'_>) -> ExportResult<ExportedImage> {
        let ExportSurface {
            graph,
            viewport,
            device_size,
        } = surface;
        let visible = viewport.visible_canvas_rect(device_size);

        let pixmap = {
            let guarded = graph.insert_background(visible, self.options.background);
            let ctx = RenderContext::new(&guarded, viewport, device_size)
                .with_pixel_ratio(self.options.pixel_ratio);
            self.renderer.build_scene(&ctx)?;
            self.renderer
                .take_pixmap()
                .ok_or_else(|| ExportError::Render(RendererError::RenderFailed("no frame".into())))?
        };

        let png = encode_png(&pixmap)?;
        log::info!(
            "exported {}x{} image ({} bytes)",
            pixmap.width(),
            pixmap.height(),
            png.len()
        );
        Ok(ExportedImage {
            filename: self.options.filename.clone(),
            width: pixmap.width(),
            height: pixmap.height(),
            png,
        })
    }

    /// Export and hand the file to `target`.
    pub fn export_to(
        &mut self,
        surface: ExportSurface<'_>,
        target: &mut dyn DownloadTarget,
    ) -> ExportResult<ExportedImage> {
        let image = self.export(surface)?;
        target.deliver(&image.filename, &image.png)?;
        Ok(image)
    }
}

/// Encode a pixmap as 8-bit RGBA PNG.
pub fn encode_png(pixmap: &Pixmap) -> ExportResult<Vec<u8>> {
    let rgba: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();

    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, pixmap.width(), pixmap.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| ExportError::Encode(e.to_string()))?;
        writer
            .write_image_data(&rgba)
            .map_err(|e| ExportError::Encode(e.to_string()))?;
    }
    Ok(png_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::MemoryTarget;
    use boardink_core::{BoardEngine, Event, Timestamp, ToolKind};
    use kurbo::Size;

    fn decode(png_bytes: &[u8]) -> (u32, u32, Vec<u8>) {
        let decoder = png::Decoder::new(std::io::Cursor::new(png_bytes));
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        buf.truncate(info.buffer_size());
        (info.width, info.height, buf)
    }

    fn engine_with_stroke() -> BoardEngine {
        let mut engine = BoardEngine::default();
        let t = Timestamp::ZERO;
        engine.dispatch(Event::Resize(Size::new(60.0, 40.0)), t);
        engine.dispatch(Event::SetTool(ToolKind::Pen), t);
        engine.dispatch(Event::pointer_down(10.0, 20.0), t);
        engine.dispatch(Event::pointer_move(50.0, 20.0), t);
        engine.dispatch(Event::pointer_up(50.0, 20.0), t);
        engine
    }

    #[test]
    fn test_export_restores_graph_and_doubles_size() {
        let mut engine = engine_with_stroke();
        let before = engine.scene_graph().clone();

        let mut target = MemoryTarget::default();
        let image = Exporter::default()
            .export_to(engine.export_surface(), &mut target)
            .unwrap();

        assert_eq!(engine.scene_graph(), &before);
        assert_eq!(image.filename, "canvas-image.png");
        assert_eq!((image.width, image.height), (120, 80));
        assert_eq!(target.files.len(), 1);
        assert_eq!(target.files[0].0, "canvas-image.png");

        let (w, h, pixels) = decode(&image.png);
        assert_eq!((w, h), (120, 80));
        // Corner is background, the stroke passes through (60, 40).
        assert_eq!(&pixels[0..4], &[255, 255, 255, 255]);
        let at = |x: usize, y: usize| &pixels[(y * 120 + x) * 4..(y * 120 + x) * 4 + 4];
        assert_eq!(at(60, 40), &[0, 0, 0, 255]);
    }

    #[test]
    fn test_export_follows_viewport() {
        let mut engine = engine_with_stroke();
        engine.dispatch(Event::SetZoom(0.5), Timestamp::ZERO);
        let image = Exporter::default().export(engine.export_surface()).unwrap();
        let (_, _, pixels) = decode(&image.png);
        let at = |x: usize, y: usize| &pixels[(y * 120 + x) * 4..(y * 120 + x) * 4 + 4];
        // Canvas (30, 20) is device (15, 10), pixel (30, 20).
        assert_eq!(at(30, 20), &[0, 0, 0, 255]);
        assert_eq!(at(60, 40), &[255, 255, 255, 255]);
    }

    #[test]
    fn test_zero_size_export_keeps_graph() {
        let mut engine = engine_with_stroke();
        engine.dispatch(Event::Resize(Size::new(0.0, 0.0)), Timestamp::ZERO);
        let before = engine.scene_graph().clone();
        let result = Exporter::default().export(engine.export_surface());
        assert!(matches!(result, Err(ExportError::ZeroSize { .. })));
        assert_eq!(engine.scene_graph(), &before);
    }

    #[test]
    fn test_invalid_font_is_rejected() {
        let options = ExportOptions {
            font: Some(vec![0, 1, 2, 3]),
            ..ExportOptions::default()
        };
        assert!(matches!(
            Exporter::new(options),
            Err(ExportError::Render(RendererError::InvalidFont(_)))
        ));
    }

    #[test]
    fn test_encode_png_header() {
        let pixmap = Pixmap::new(3, 2).unwrap();
        let bytes = encode_png(&pixmap).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        assert_eq!(decode(&bytes).0, 3);
    }
}
