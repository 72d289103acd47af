//! Persisted board document.

use crate::elements::{Arrow, Stroke, TextLabel};
use serde::{Deserialize, Serialize};

/// The three element collections stored per board.
///
/// Missing collections deserialize as empty; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardDocument {
    pub lines: Vec<Stroke>,
    pub texts: Vec<TextLabel>,
    pub arrows: Vec<Arrow>,
}

impl BoardDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.texts.is_empty() && self.arrows.is_empty()
    }

    /// Serialize the document to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize a document from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Borrowed form of [`BoardDocument`] for saving without cloning.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DocumentView<'a> {
    pub lines: &'a [Stroke],
    pub texts: &'a [TextLabel],
    pub arrows: &'a [Arrow],
}

impl DocumentView<'_> {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_owned(&self) -> BoardDocument {
        BoardDocument {
            lines: self.lines.to_vec(),
            texts: self.texts.to_vec(),
            arrows: self.arrows.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Color, StrokeKind};
    use kurbo::Point;

    #[test]
    fn test_missing_collections_default_empty() {
        let doc = BoardDocument::from_json(r#"{"lines":[]}"#).unwrap();
        assert!(doc.is_empty());
        let doc = BoardDocument::from_json("{}").unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_malformed_is_error() {
        assert!(BoardDocument::from_json("{not json").is_err());
        assert!(BoardDocument::from_json(r#"{"lines":5}"#).is_err());
    }

    #[test]
    fn test_view_matches_owned() {
        let doc = BoardDocument {
            lines: vec![Stroke::new(StrokeKind::Pen, Color::RED, 3.0, Point::new(1.0, 1.0))],
            texts: vec![TextLabel::new(Point::new(5.0, 5.0), "hi", 15.0, Color::BLACK)],
            arrows: vec![Arrow::new(Color::BLUE, 2.0, Point::new(0.0, 0.0))],
        };
        let view = DocumentView {
            lines: &doc.lines,
            texts: &doc.texts,
            arrows: &doc.arrows,
        };
        assert_eq!(view.to_json().unwrap(), doc.to_json().unwrap());
        let back = BoardDocument::from_json(&view.to_json().unwrap()).unwrap();
        assert_eq!(back, doc);
    }
}
