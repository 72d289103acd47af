//! Glyph rasterization for text labels.

use crate::renderer::{RenderResult, RendererError};
use ab_glyph::{Font, FontArc, FontVec, ScaleFont, point};
use boardink_core::elements::Color;
use kurbo::Point;
use tiny_skia::{Pixmap, PremultipliedColorU8};

/// Draws text with a host-supplied font by blending glyph coverage into a
/// pixmap.
#[derive(Clone)]
pub struct GlyphRenderer {
    font: FontArc,
}

impl std::fmt::Debug for GlyphRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphRenderer").finish_non_exhaustive()
    }
}

impl GlyphRenderer {
    pub fn new(font: FontArc) -> Self {
        Self { font }
    }

    /// Load a TrueType/OpenType font from raw bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> RenderResult<Self> {
        let font = FontVec::try_from_vec(bytes)
            .map_err(|e| RendererError::InvalidFont(e.to_string()))?;
        Ok(Self::new(FontArc::new(font)))
    }

    /// Draw one line of text whose top-left corner is `origin` (pixels).
    pub fn draw_text(&self, pixmap: &mut Pixmap, text: &str, origin: Point, size: f32, color: Color) {
        if text.is_empty() || size <= 0.0 {
            return;
        }
        let width = pixmap.width() as i64;
        let height = pixmap.height() as i64;
        let pixels = pixmap.pixels_mut();

        let scaled = self.font.as_scaled(size);
        let mut caret = point(origin.x as f32, origin.y as f32 + scaled.ascent());
        for ch in text.chars() {
            let mut glyph = scaled.scaled_glyph(ch);
            glyph.position = caret;
            caret.x += scaled.h_advance(glyph.id);
            let Some(outlined) = scaled.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|x, y, coverage| {
                let px = x as i64 + bounds.min.x as i64;
                let py = y as i64 + bounds.min.y as i64;
                if px < 0 || py < 0 || px >= width || py >= height {
                    return;
                }
                let index = (py * width + px) as usize;
                pixels[index] = blend_over(pixels[index], color, coverage);
            });
        }
    }
}

/// Source-over of `color` at `coverage` onto a premultiplied pixel.
fn blend_over(dst: PremultipliedColorU8, color: Color, coverage: f32) -> PremultipliedColorU8 {
    let alpha = (color.a as f32 / 255.0) * coverage.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return dst;
    }
    let inv = 1.0 - alpha;
    let channel = |src: u8, dst: u8| (src as f32 * alpha + dst as f32 * inv).round() as u8;
    let out_a = (alpha * 255.0 + dst.alpha() as f32 * inv).round() as u8;
    // Channels never exceed alpha here, so this always succeeds.
    PremultipliedColorU8::from_rgba(
        channel(color.r, dst.red()).min(out_a),
        channel(color.g, dst.green()).min(out_a),
        channel(color.b, dst.blue()).min(out_a),
        out_a,
    )
    .unwrap_or(dst)
}
