//! Arrow element.

use super::{Color, ElementId, new_element_id, point_to_segment_dist};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// An arrow from `points[0]` to `points[1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arrow {
    pub id: ElementId,
    #[serde(default)]
    pub color: Color,
    pub stroke_width: f64,
    #[serde(with = "endpoints")]
    pub points: [Point; 2],
}

impl Arrow {
    /// Create a zero-length arrow anchored at `start`.
    pub fn new(color: Color, stroke_width: f64, start: Point) -> Self {
        Self {
            id: new_element_id(),
            color,
            stroke_width,
            points: [start, start],
        }
    }

    pub fn start(&self) -> Point {
        self.points[0]
    }

    pub fn end(&self) -> Point {
        self.points[1]
    }

    pub fn set_end(&mut self, end: Point) {
        self.points[1] = end;
    }

    /// Arrowhead length, scaled with the stroke.
    pub fn head_size(&self) -> f64 {
        (self.stroke_width * 2.0).max(10.0)
    }

    /// Get the direction vector (normalized).
    pub fn direction(&self) -> Vec2 {
        let d = self.end() - self.start();
        let len = d.hypot();
        if len < f64::EPSILON {
            Vec2::new(1.0, 0.0)
        } else {
            d / len
        }
    }

    pub fn length(&self) -> f64 {
        (self.end() - self.start()).hypot()
    }

    /// Tip, left and right corners of the arrowhead.
    fn head_corners(&self) -> (Point, Point, Point) {
        let dir = self.direction();
        let perp = Vec2::new(-dir.y, dir.x);
        let size = self.head_size();
        let head_back = self.end() - dir * size;
        let head_left = head_back + perp * (size * 0.5);
        let head_right = head_back - perp * (size * 0.5);
        (self.end(), head_left, head_right)
    }

    pub fn bounds(&self) -> Rect {
        let (tip, left, right) = self.head_corners();
        Rect::from_points(self.start(), tip)
            .union_pt(left)
            .union_pt(right)
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        if point_to_segment_dist(point, self.start(), self.end())
            <= tolerance + self.stroke_width / 2.0
        {
            return true;
        }
        if self.length() < f64::EPSILON {
            return false;
        }

        fn sign(p1: Point, p2: Point, p3: Point) -> f64 {
            (p1.x - p3.x) * (p2.y - p3.y) - (p2.x - p3.x) * (p1.y - p3.y)
        }

        let (tip, left, right) = self.head_corners();
        let d1 = sign(point, tip, left);
        let d2 = sign(point, left, right);
        let d3 = sign(point, right, tip);

        let has_neg = (d1 < 0.0) || (d2 < 0.0) || (d3 < 0.0);
        let has_pos = (d1 > 0.0) || (d2 > 0.0) || (d3 > 0.0);

        !(has_neg && has_pos)
    }

    /// Straight shaft.
    pub fn shaft_path(&self) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(self.start());
        path.line_to(self.end());
        path
    }

    /// Closed arrowhead triangle; empty while the arrow has no length.
    pub fn head_path(&self) -> BezPath {
        let mut path = BezPath::new();
        if self.length() < f64::EPSILON {
            return path;
        }
        let (tip, left, right) = self.head_corners();
        path.move_to(tip);
        path.line_to(left);
        path.line_to(right);
        path.close_path();
        path
    }
}

/// `[x0, y0, x1, y1]` on the wire.
mod endpoints {
    use kurbo::Point;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(points: &[Point; 2], serializer: S) -> Result<S::Ok, S::Error> {
        [points[0].x, points[0].y, points[1].x, points[1].y].serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[Point; 2], D::Error> {
        let flat = Vec::<f64>::deserialize(deserializer)?;
        match flat.as_slice() {
            [x0, y0, x1, y1] => Ok([Point::new(*x0, *y0), Point::new(*x1, *y1)]),
            _ => Err(D::Error::custom(format!(
                "arrow needs exactly 4 coordinates, got {}",
                flat.len()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arrow(x0: f64, y0: f64, x1: f64, y1: f64) -> Arrow {
        let mut arrow = Arrow::new(Color::BLACK, 2.0, Point::new(x0, y0));
        arrow.set_end(Point::new(x1, y1));
        arrow
    }

    #[test]
    fn test_arrow_creation() {
        let arrow = Arrow::new(Color::BLUE, 4.0, Point::new(3.0, 3.0));
        assert_eq!(arrow.start(), arrow.end());
        assert!(arrow.head_path().elements().is_empty());
    }

    #[test]
    fn test_direction() {
        let arrow = arrow(0.0, 0.0, 100.0, 0.0);
        let dir = arrow.direction();
        assert!((dir.x - 1.0).abs() < f64::EPSILON);
        assert!(dir.y.abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test_shaft_and_head() {
        let arrow = arrow(0.0, 0.0, 100.0, 0.0);
        assert!(arrow.hit_test(Point::new(50.0, 3.0), 4.0));
        assert!(!arrow.hit_test(Point::new(50.0, 20.0), 4.0));
        // Inside the head triangle but outside the shaft band.
        assert!(arrow.hit_test(Point::new(92.0, 3.0), 0.0));
    }

    #[test]
    fn test_bounds_include_head() {
        let arrow = arrow(0.0, 0.0, 100.0, 0.0);
        let bounds = arrow.bounds();
        assert!(bounds.y0 < 0.0 && bounds.y1 > 0.0);
        assert!((bounds.x1 - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_wire_format() {
        let parsed: Arrow = serde_json::from_str(
            r##"{"id":"x","color":"#0000ff","strokeWidth":2,"points":[1,2,3,4]}"##,
        )
        .unwrap();
        assert_eq!(parsed.points, [Point::new(1.0, 2.0), Point::new(3.0, 4.0)]);
        assert!(serde_json::from_str::<Arrow>(r#"{"id":"x","strokeWidth":2,"points":[1,2]}"#).is_err());
    }
}
