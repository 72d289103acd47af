//! Text label element.

use super::{Color, ElementId, new_element_id};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Text shown on new labels until edited.
pub const PLACEHOLDER_TEXT: &str = "Double click to edit";

/// Padding around the estimated text box.
const BOX_PADDING: f64 = 5.0;
/// Average glyph advance as a fraction of the font size.
const CHAR_WIDTH_RATIO: f64 = 0.6;

/// A text label positioned by its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLabel {
    pub id: ElementId,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    #[serde(default)]
    pub color: Color,
}

impl TextLabel {
    pub fn new(position: Point, text: impl Into<String>, font_size: f64, color: Color) -> Self {
        Self {
            id: new_element_id(),
            text: text.into(),
            x: position.x,
            y: position.y,
            font_size,
            color,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_position(&mut self, position: Point) {
        self.x = position.x;
        self.y = position.y;
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// Estimated box used both for hit testing and the dashed selection outline.
    pub fn estimated_bounds(&self) -> Rect {
        let width = self.text.chars().count() as f64 * self.font_size * CHAR_WIDTH_RATIO;
        Rect::new(
            self.x - BOX_PADDING,
            self.y - BOX_PADDING,
            self.x - BOX_PADDING + width,
            self.y - BOX_PADDING + self.font_size + 8.0,
        )
    }

    pub fn hit_test(&self, point: Point) -> bool {
        let b = self.estimated_bounds();
        point.x >= b.x0 && point.x <= b.x1 && point.y >= b.y0 && point.y <= b.y1
    }
}
