//! Live element collections.

use crate::document::{BoardDocument, DocumentView};
use crate::elements::{Arrow, ElementKind, ElementRef, HitTarget, Stroke, TextLabel};
use crate::history::StrokeHistory;
use kurbo::Point;

/// Strokes (with their history), arrows and text labels.
///
/// Each collection keeps insertion order, which is also paint order.
/// Strokes paint first, then arrows, then text.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub strokes: StrokeHistory,
    pub arrows: Vec<Arrow>,
    pub texts: Vec<TextLabel>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(document: BoardDocument) -> Self {
        Self {
            strokes: StrokeHistory::load(document.lines),
            arrows: document.arrows,
            texts: document.texts,
        }
    }

    pub fn view(&self) -> DocumentView<'_> {
        DocumentView {
            lines: self.strokes.strokes(),
            texts: &self.texts,
            arrows: &self.arrows,
        }
    }

    pub fn to_document(&self) -> BoardDocument {
        self.view().to_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.strokes().is_empty() && self.arrows.is_empty() && self.texts.is_empty()
    }

    /// All elements in paint order.
    pub fn elements(&self) -> impl DoubleEndedIterator<Item = ElementRef<'_>> {
        self.strokes
            .strokes()
            .iter()
            .map(ElementRef::Stroke)
            .chain(self.arrows.iter().map(ElementRef::Arrow))
            .chain(self.texts.iter().map(ElementRef::Text))
    }

    /// Topmost element under `point`.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> Option<HitTarget> {
        self.elements()
            .rev()
            .find(|element| element.hit_test(point, tolerance))
            .map(|element| HitTarget::new(element.id(), element.kind()))
    }

    /// Topmost text label under `point`.
    pub fn text_at(&self, point: Point) -> Option<&TextLabel> {
        self.texts.iter().rev().find(|t| t.hit_test(point))
    }

    pub fn text(&self, id: &str) -> Option<&TextLabel> {
        self.texts.iter().find(|t| t.id == id)
    }

    pub fn text_mut(&mut self, id: &str) -> Option<&mut TextLabel> {
        self.texts.iter_mut().find(|t| t.id == id)
    }

    pub fn arrow(&self, id: &str) -> Option<&Arrow> {
        self.arrows.iter().find(|a| a.id == id)
    }

    pub fn stroke(&self, id: &str) -> Option<&Stroke> {
        self.strokes.get(id)
    }

    pub fn contains(&self, id: &str, kind: ElementKind) -> bool {
        match kind {
            ElementKind::Stroke => self.stroke(id).is_some(),
            ElementKind::Arrow => self.arrow(id).is_some(),
            ElementKind::Text => self.text(id).is_some(),
        }
    }

    /// Remove an element from its collection. Returns false if it was not there.
    pub fn remove(&mut self, id: &str, kind: ElementKind) -> bool {
        match kind {
            ElementKind::Stroke => self.strokes.remove(id).is_some(),
            ElementKind::Arrow => remove_by_id(&mut self.arrows, id, |a| &a.id),
            ElementKind::Text => remove_by_id(&mut self.texts, id, |t| &t.id),
        }
    }

    /// Empty every collection and the stroke history.
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.arrows.clear();
        self.texts.clear();
    }
}

fn remove_by_id<T>(items: &mut Vec<T>, id: &str, key: impl Fn(&T) -> &String) -> bool {
    match items.iter().position(|item| key(item) == id) {
        Some(index) => {
            items.remove(index);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Color, StrokeKind};

    fn sample() -> Scene {
        let mut scene = Scene::new();
        let mut stroke = Stroke::from_points(
            StrokeKind::Pen,
            vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)],
        );
        stroke.stroke_width = 2.0;
        stroke.id = "s1".into();
        scene.strokes.commit(stroke);

        let mut arrow = Arrow::new(Color::BLACK, 2.0, Point::new(0.0, 0.0));
        arrow.set_end(Point::new(100.0, 0.0));
        arrow.id = "a1".into();
        scene.arrows.push(arrow);

        let mut text = TextLabel::new(Point::new(200.0, 200.0), "hello", 10.0, Color::BLACK);
        text.id = "t1".into();
        scene.texts.push(text);
        scene
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let scene = sample();
        // Arrow overlaps the stroke and paints above it.
        let hit = scene.hit_test(Point::new(50.0, 0.0), 4.0).unwrap();
        assert_eq!(hit, HitTarget::new("a1", ElementKind::Arrow));

        let hit = scene.hit_test(Point::new(201.0, 201.0), 4.0).unwrap();
        assert_eq!(hit, HitTarget::new("t1", ElementKind::Text));

        assert!(scene.hit_test(Point::new(500.0, 500.0), 4.0).is_none());
    }

    #[test]
    fn test_remove() {
        let mut scene = sample();
        assert!(scene.remove("a1", ElementKind::Arrow));
        assert!(!scene.remove("a1", ElementKind::Arrow));
        assert!(!scene.remove("t1", ElementKind::Stroke));
        let hit = scene.hit_test(Point::new(50.0, 0.0), 4.0).unwrap();
        assert_eq!(hit, HitTarget::new("s1", ElementKind::Stroke));
    }

    #[test]
    fn test_clear() {
        let mut scene = sample();
        scene.strokes.undo();
        scene.clear();
        assert!(scene.is_empty());
        assert!(scene.strokes.redo_stack().is_empty());
    }

    #[test]
    fn test_document_roundtrip() {
        let scene = sample();
        let doc = scene.to_document();
        let restored = Scene::from_document(doc.clone());
        assert_eq!(restored.to_document(), doc);
    }
}
