//! Render-ready scene graph.
//!
//! The engine rebuilds this after every mutation. Renderers consume the nodes
//! in order (back to front); geometry is in canvas space.

use crate::elements::{Arrow, Color, ElementId, ElementRef, Stroke, TextLabel};
use crate::scene::Scene;
use crate::selection::Selection;
use kurbo::{BezPath, Point, Rect, Vec2};
use std::ops::Deref;

/// Outline drawn around the selected element.
pub const SELECTION_COLOR: Color = Color::BLUE;
pub const SELECTION_WIDTH: f64 = 1.0;
pub const SELECTION_DASH: [f64; 2] = [4.0, 4.0];

/// How a node composites onto what is below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Blend {
    #[default]
    Normal,
    /// Clears the pixels it covers (destination-out).
    Erase,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneNode {
    Background {
        rect: Rect,
        color: Color,
    },
    Stroke {
        id: ElementId,
        path: BezPath,
        color: Color,
        width: f64,
        blend: Blend,
    },
    Arrow {
        id: ElementId,
        shaft: BezPath,
        head: BezPath,
        color: Color,
        width: f64,
    },
    Text {
        id: ElementId,
        text: String,
        origin: Point,
        font_size: f64,
        color: Color,
    },
    SelectionOutline {
        rect: Rect,
        color: Color,
        width: f64,
        dash: [f64; 2],
    },
}

impl SceneNode {
    fn stroke(stroke: &Stroke) -> Self {
        SceneNode::Stroke {
            id: stroke.id.clone(),
            path: stroke.to_path(),
            color: stroke.color,
            width: stroke.stroke_width,
            blend: if stroke.is_eraser() {
                Blend::Erase
            } else {
                Blend::Normal
            },
        }
    }

    fn arrow(arrow: &Arrow) -> Self {
        SceneNode::Arrow {
            id: arrow.id.clone(),
            shaft: arrow.shaft_path(),
            head: arrow.head_path(),
            color: arrow.color,
            width: arrow.stroke_width,
        }
    }

    fn text(label: &TextLabel, offset: Vec2) -> Self {
        SceneNode::Text {
            id: label.id.clone(),
            text: label.text.clone(),
            origin: label.position() + offset,
            font_size: label.font_size,
            color: label.color,
        }
    }

    fn outline(rect: Rect) -> Self {
        SceneNode::SelectionOutline {
            rect,
            color: SELECTION_COLOR,
            width: SELECTION_WIDTH,
            dash: SELECTION_DASH,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            SceneNode::Stroke { id, .. }
            | SceneNode::Arrow { id, .. }
            | SceneNode::Text { id, .. } => Some(id),
            SceneNode::Background { .. } | SceneNode::SelectionOutline { .. } => None,
        }
    }
}

/// A text label being dragged, rendered displaced until the drag commits.
#[derive(Debug, Clone, Copy)]
pub struct DragPreview<'a> {
    pub id: &'a str,
    pub offset: Vec2,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(scene: &Scene, selection: &Selection, drag: Option<DragPreview<'_>>) -> Self {
        let offset_for = |id: &str| match drag {
            Some(preview) if preview.id == id => preview.offset,
            _ => Vec2::ZERO,
        };

        let mut nodes = Vec::new();
        let mut outline = None;
        for element in scene.elements() {
            let selected = selection.is_selected(element.id());
            match element {
                ElementRef::Stroke(stroke) => {
                    nodes.push(SceneNode::stroke(stroke));
                    if selected {
                        outline = Some(stroke.bounds().inflate(
                            stroke.stroke_width / 2.0,
                            stroke.stroke_width / 2.0,
                        ));
                    }
                }
                ElementRef::Arrow(arrow) => {
                    nodes.push(SceneNode::arrow(arrow));
                    if selected {
                        outline = Some(arrow.bounds());
                    }
                }
                ElementRef::Text(label) => {
                    let offset = offset_for(&label.id);
                    if selected {
                        nodes.push(SceneNode::outline(label.estimated_bounds() + offset));
                    }
                    nodes.push(SceneNode::text(label, offset));
                }
            }
        }
        if let Some(rect) = outline {
            nodes.push(SceneNode::outline(rect));
        }
        Self { nodes }
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Insert an opaque background beneath everything.
    ///
    /// The node is removed again when the returned guard drops.
    pub fn insert_background(&mut self, rect: Rect, color: Color) -> BackgroundGuard<'_> {
        self.nodes.insert(0, SceneNode::Background { rect, color });
        BackgroundGuard { graph: self }
    }
}

/// Keeps a temporary background node in a [`SceneGraph`].
pub struct BackgroundGuard<'a> {
    graph: &'a mut SceneGraph,
}

impl Deref for BackgroundGuard<'_> {
    type Target = SceneGraph;

    fn deref(&self) -> &SceneGraph {
        self.graph
    }
}

impl Drop for BackgroundGuard<'_> {
    fn drop(&mut self) {
        if matches!(self.graph.nodes.first(), Some(SceneNode::Background { .. })) {
            self.graph.nodes.remove(0);
        }
    }
}
