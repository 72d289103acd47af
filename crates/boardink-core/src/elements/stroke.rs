//! Freehand strokes drawn with the pen or eraser.

use super::{Color, ElementId, flat_points, new_element_id, point_to_polyline_dist, smooth_path};
use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};

/// Catmull-Rom tension used when rendering strokes.
pub const STROKE_TENSION: f64 = 0.5;

/// Pen strokes paint; eraser strokes punch holes at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeKind {
    #[default]
    Pen,
    Eraser,
}

/// A freehand stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    pub id: ElementId,
    #[serde(rename = "tool", default)]
    pub kind: StrokeKind,
    #[serde(default)]
    pub color: Color,
    pub stroke_width: f64,
    /// Canvas-space points in drawing order.
    #[serde(with = "flat_points")]
    pub points: Vec<Point>,
}

impl Stroke {
    /// Start a stroke at `start`.
    pub fn new(kind: StrokeKind, color: Color, stroke_width: f64, start: Point) -> Self {
        Self {
            id: new_element_id(),
            kind,
            color,
            stroke_width,
            points: vec![start],
        }
    }

    pub fn from_points(kind: StrokeKind, points: Vec<Point>) -> Self {
        Self {
            id: new_element_id(),
            kind,
            color: Color::BLACK,
            stroke_width: crate::tools::DEFAULT_BRUSH_SIZE,
            points,
        }
    }

    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn is_eraser(&self) -> bool {
        self.kind == StrokeKind::Eraser
    }

    pub fn bounds(&self) -> Rect {
        let Some(first) = self.points.first() else {
            return Rect::ZERO;
        };
        self.points
            .iter()
            .fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p))
    }

    /// Eraser strokes are never selectable.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        if self.is_eraser() {
            return false;
        }
        point_to_polyline_dist(point, &self.points) <= tolerance + self.stroke_width / 2.0
    }

    pub fn to_path(&self) -> BezPath {
        smooth_path(&self.points, STROKE_TENSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pen(points: &[(f64, f64)]) -> Stroke {
        let mut stroke = Stroke::from_points(
            StrokeKind::Pen,
            points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        );
        stroke.stroke_width = 2.0;
        stroke
    }

    #[test]
    fn test_stroke_creation() {
        let stroke = Stroke::new(StrokeKind::Pen, Color::RED, 5.0, Point::new(1.0, 2.0));
        assert_eq!(stroke.points, vec![Point::new(1.0, 2.0)]);
        assert!(!stroke.id.is_empty());
    }

    #[test]
    fn test_bounds() {
        let stroke = pen(&[(0.0, 0.0), (10.0, 20.0), (-5.0, 3.0)]);
        assert_eq!(stroke.bounds(), Rect::new(-5.0, 0.0, 10.0, 20.0));
    }

    #[test]
    fn test_hit_test() {
        let stroke = pen(&[(0.0, 0.0), (100.0, 0.0)]);
        assert!(stroke.hit_test(Point::new(50.0, 4.0), 4.0));
        assert!(!stroke.hit_test(Point::new(50.0, 6.0), 4.0));
    }

    #[test]
    fn test_eraser_not_hittable() {
        let mut stroke = pen(&[(0.0, 0.0), (100.0, 0.0)]);
        stroke.kind = StrokeKind::Eraser;
        assert!(!stroke.hit_test(Point::new(50.0, 0.0), 4.0));
    }

    #[test]
    fn test_wire_format() {
        let stroke = Stroke {
            id: "1700000000000".to_string(),
            kind: StrokeKind::Eraser,
            color: Color::BLACK,
            stroke_width: 15.0,
            points: vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)],
        };
        let json = serde_json::to_value(&stroke).unwrap();
        assert_eq!(json["tool"], "eraser");
        assert_eq!(json["strokeWidth"], 15.0);
        assert_eq!(json["points"], serde_json::json!([0.0, 0.0, 10.0, 10.0]));

        let parsed: Stroke = serde_json::from_str(
            r##"{"id":"a","tool":"pen","color":"#ff0000","strokeWidth":3,"points":[1,2,3,4],"extra":true}"##,
        )
        .unwrap();
        assert_eq!(parsed.points, vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)]);
        assert_eq!(parsed.color, Color::RED);
    }
}
