//! CPU rasterizer built on tiny-skia.

use crate::renderer::{RenderContext, RenderResult, Renderer, RendererError};
use crate::text::GlyphRenderer;
use boardink_core::elements::Color;
use boardink_core::scene_graph::{Blend, SceneNode};
use kurbo::{Affine, BezPath, PathEl, Rect, Shape};
use tiny_skia::{
    BlendMode, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke,
    StrokeDash, Transform,
};

/// Rasterizes a scene graph into a [`Pixmap`].
///
/// Background nodes go to the base layer; everything else is drawn on a
/// separate ink layer composited on top, so eraser strokes clear ink but
/// never the paper.
#[derive(Debug, Default)]
pub struct PixmapRenderer {
    pixmap: Option<Pixmap>,
    glyphs: Option<GlyphRenderer>,
    warned_no_font: bool,
}

impl PixmapRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderer that can also draw text labels.
    pub fn with_glyphs(glyphs: GlyphRenderer) -> Self {
        Self {
            glyphs: Some(glyphs),
            ..Self::default()
        }
    }

    pub fn has_glyphs(&self) -> bool {
        self.glyphs.is_some()
    }

    /// The last rendered frame.
    pub fn pixmap(&self) -> Option<&Pixmap> {
        self.pixmap.as_ref()
    }

    /// Take ownership of the last rendered frame.
    pub fn take_pixmap(&mut self) -> Option<Pixmap> {
        self.pixmap.take()
    }

    fn draw_node(&mut self, base: &mut Pixmap, ink: &mut Pixmap, node: &SceneNode, ctx: &RenderContext<'_>) {
        let affine = ctx.transform();
        let transform = to_skia_transform(affine);
        match node {
            SceneNode::Background { rect, color } => {
                if let Some(rect) = to_skia_rect(*rect) {
                    base.fill_rect(rect, &solid(*color, Blend::Normal), transform, None);
                }
            }
            SceneNode::Stroke {
                path,
                color,
                width,
                blend,
                ..
            } => stroke_path(ink, path, *color, *width, *blend, None, transform),
            SceneNode::Arrow {
                shaft,
                head,
                color,
                width,
                ..
            } => {
                stroke_path(ink, shaft, *color, *width, Blend::Normal, None, transform);
                if let Some(path) = to_skia_path(head) {
                    let paint = solid(*color, Blend::Normal);
                    ink.fill_path(&path, &paint, FillRule::Winding, transform, None);
                }
            }
            SceneNode::Text {
                id,
                text,
                origin,
                font_size,
                color,
            } => match &self.glyphs {
                Some(glyphs) => {
                    let scale = affine.as_coeffs()[0];
                    let size = (font_size * scale) as f32;
                    glyphs.draw_text(ink, text, affine * *origin, size, *color);
                }
                None => {
                    if !self.warned_no_font {
                        log::warn!("no font available, skipping text labels (first: {id})");
                        self.warned_no_font = true;
                    }
                }
            },
            SceneNode::SelectionOutline {
                rect,
                color,
                width,
                dash,
            } => {
                let outline = rect.to_path(0.1);
                stroke_path(ink, &outline, *color, *width, Blend::Normal, Some(dash), transform);
            }
        }
    }
}

impl Renderer for PixmapRenderer {
    fn build_scene(&mut self, ctx: &RenderContext<'_>) -> RenderResult<()> {
        let (width, height) = ctx.pixel_size();
        let zero = || RendererError::ZeroSize { width, height };
        let mut base = Pixmap::new(width, height).ok_or_else(zero)?;
        let mut ink = Pixmap::new(width, height).ok_or_else(zero)?;

        self.warned_no_font = false;
        for node in ctx.graph.nodes() {
            self.draw_node(&mut base, &mut ink, node, ctx);
        }

        base.draw_pixmap(
            0,
            0,
            ink.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
        self.pixmap = Some(base);
        Ok(())
    }
}

fn solid(color: Color, blend: Blend) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint.blend_mode = match blend {
        Blend::Normal => BlendMode::SourceOver,
        Blend::Erase => BlendMode::DestinationOut,
    };
    paint
}

fn stroke_path(
    pixmap: &mut Pixmap,
    path: &BezPath,
    color: Color,
    width: f64,
    blend: Blend,
    dash: Option<&[f64; 2]>,
    transform: Transform,
) {
    let Some(path) = to_skia_path(path) else {
        return;
    };
    let stroke = Stroke {
        width: width as f32,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        dash: dash.and_then(|d| StrokeDash::new(vec![d[0] as f32, d[1] as f32], 0.0)),
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, &solid(color, blend), &stroke, transform, None);
}

/// kurbo `Affine` to tiny-skia `Transform`.
pub fn to_skia_transform(affine: Affine) -> Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

fn to_skia_rect(rect: Rect) -> Option<tiny_skia::Rect> {
    tiny_skia::Rect::from_ltrb(rect.x0 as f32, rect.y0 as f32, rect.x1 as f32, rect.y1 as f32)
}

/// kurbo `BezPath` to a tiny-skia path. Empty paths yield `None`.
///
/// A zero-length segment is nudged so round caps still draw a dot.
pub fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    if let [PathEl::MoveTo(a), PathEl::LineTo(b)] = path.elements() {
        if a == b {
            pb.move_to(a.x as f32, a.y as f32);
            pb.line_to(a.x as f32 + 0.01, a.y as f32);
            return pb.finish();
        }
    }
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p2) => pb.quad_to(p1.x as f32, p1.y as f32, p2.x as f32, p2.y as f32),
            PathEl::CurveTo(p1, p2, p3) => pb.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p3.x as f32,
                p3.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardink_core::elements::{Stroke as BoardStroke, StrokeKind};
    use boardink_core::scene::Scene;
    use boardink_core::scene_graph::SceneGraph;
    use boardink_core::selection::Selection;
    use boardink_core::viewport::Viewport;
    use kurbo::{Point, Size};

    fn pixel(pixmap: &Pixmap, x: u32, y: u32) -> (u8, u8, u8, u8) {
        let c = pixmap.pixel(x, y).unwrap().demultiply();
        (c.red(), c.green(), c.blue(), c.alpha())
    }

    fn graph_with(strokes: Vec<BoardStroke>) -> SceneGraph {
        let mut scene = Scene::new();
        for stroke in strokes {
            scene.strokes.commit(stroke);
        }
        SceneGraph::build(&scene, &Selection::None, None)
    }

    fn line(kind: StrokeKind, y: f64, width: f64) -> BoardStroke {
        let mut stroke =
            BoardStroke::from_points(kind, vec![Point::new(0.0, y), Point::new(40.0, y)]);
        stroke.stroke_width = width;
        stroke
    }

    #[test]
    fn test_transform_conversion() {
        let t = to_skia_transform(Affine::translate((3.0, 4.0)) * Affine::scale(2.0));
        assert_eq!((t.sx, t.sy, t.tx, t.ty), (2.0, 2.0, 3.0, 4.0));
        assert_eq!((t.kx, t.ky), (0.0, 0.0));
    }

    #[test]
    fn test_empty_path_is_none() {
        assert!(to_skia_path(&BezPath::new()).is_none());
        let mut dot = BezPath::new();
        dot.move_to((5.0, 5.0));
        dot.line_to((5.0, 5.0));
        assert!(to_skia_path(&dot).is_some());
    }

    #[test]
    fn test_stroke_is_drawn() {
        let graph = graph_with(vec![line(StrokeKind::Pen, 10.0, 4.0)]);
        let ctx = RenderContext::new(&graph, Viewport::default(), Size::new(50.0, 20.0));
        let mut renderer = PixmapRenderer::new();
        renderer.build_scene(&ctx).unwrap();
        let pixmap = renderer.pixmap().unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (50, 20));
        assert_eq!(pixel(pixmap, 20, 10), (0, 0, 0, 255));
        assert_eq!(pixel(pixmap, 20, 2).3, 0);
    }

    #[test]
    fn test_eraser_clears_ink_not_background() {
        let mut graph = graph_with(vec![
            line(StrokeKind::Pen, 10.0, 6.0),
            line(StrokeKind::Eraser, 10.0, 6.0),
        ]);
        let guarded = graph.insert_background(Rect::new(0.0, 0.0, 50.0, 20.0), Color::WHITE);
        let ctx = RenderContext::new(&guarded, Viewport::default(), Size::new(50.0, 20.0));
        let mut renderer = PixmapRenderer::new();
        renderer.build_scene(&ctx).unwrap();
        let pixmap = renderer.take_pixmap().unwrap();
        assert_eq!(pixel(&pixmap, 20, 10), (255, 255, 255, 255));
        assert!(renderer.pixmap().is_none());
    }

    #[test]
    fn test_zero_size_fails() {
        let graph = SceneGraph::new();
        let ctx = RenderContext::new(&graph, Viewport::default(), Size::new(0.0, 10.0));
        let result = PixmapRenderer::new().build_scene(&ctx);
        assert!(matches!(result, Err(RendererError::ZeroSize { .. })));
    }
}
