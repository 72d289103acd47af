//! Element definitions for the board.

mod arrow;
mod stroke;
mod text;

pub use arrow::Arrow;
pub use stroke::{Stroke, StrokeKind};
pub use text::{PLACEHOLDER_TEXT, TextLabel};

use kurbo::{BezPath, Point};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for elements.
///
/// Kept as a string so ids written by older boards load verbatim.
pub type ElementId = String;

/// Generate an id for a new element.
pub fn new_element_id() -> ElementId {
    Uuid::new_v4().to_string()
}

/// Which collection an element lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Stroke,
    Arrow,
    Text,
}

/// A hit-test result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitTarget {
    pub id: ElementId,
    pub kind: ElementKind,
}

impl HitTarget {
    pub fn new(id: impl Into<ElementId>, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }
}

/// Borrowed view of any element, for render and hit-test sites.
#[derive(Debug, Clone, Copy)]
pub enum ElementRef<'a> {
    Stroke(&'a Stroke),
    Arrow(&'a Arrow),
    Text(&'a TextLabel),
}

impl ElementRef<'_> {
    pub fn id(&self) -> &str {
        match self {
            ElementRef::Stroke(s) => &s.id,
            ElementRef::Arrow(a) => &a.id,
            ElementRef::Text(t) => &t.id,
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            ElementRef::Stroke(_) => ElementKind::Stroke,
            ElementRef::Arrow(_) => ElementKind::Arrow,
            ElementRef::Text(_) => ElementKind::Text,
        }
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        match self {
            ElementRef::Stroke(s) => s.hit_test(point, tolerance),
            ElementRef::Arrow(a) => a.hit_test(point, tolerance),
            ElementRef::Text(t) => t.hit_test(point),
        }
    }
}

/// RGBA8 color, persisted as a CSS hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 128, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);

    /// Preset swatches offered by the palette.
    pub const PALETTE: [(&'static str, Color); 6] = [
        ("Red", Color::RED),
        ("Green", Color::GREEN),
        ("Blue", Color::BLUE),
        ("Yellow", Color::YELLOW),
        ("Black", Color::BLACK),
        ("White", Color::WHITE),
    ];

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rgb`, `#rrggbb`, `#rrggbbaa` or a basic color name.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let Some(hex) = s.strip_prefix('#') else {
            return Self::named(s);
        };
        if !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (slot, c) in out.iter_mut().zip(hex.chars()) {
                    let v = c.to_digit(16)? as u8;
                    *slot = v * 16 + v;
                }
                Some(Self::rgb(out[0], out[1], out[2]))
            }
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    fn named(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "black" => Some(Self::BLACK),
            "white" => Some(Self::WHITE),
            "red" => Some(Self::RED),
            "green" => Some(Self::GREEN),
            "blue" => Some(Self::BLUE),
            "yellow" => Some(Self::YELLOW),
            "transparent" => Some(Self::rgba(0, 0, 0, 0)),
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<String> for Color {
    fn from(s: String) -> Self {
        Color::parse(&s).unwrap_or_else(|| {
            log::warn!("unrecognized color {s:?}, using black");
            Color::BLACK
        })
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl From<Color> for peniko::Color {
    fn from(color: Color) -> Self {
        peniko::Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

impl From<peniko::Color> for Color {
    fn from(color: peniko::Color) -> Self {
        let rgba = color.to_rgba8();
        Color::rgba(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    (point - proj).hypot()
}

/// Minimum distance from a point to a polyline. A single point is a dot.
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => (point - *only).hypot(),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Catmull-Rom spline through `points`, as cubic béziers.
///
/// A single point yields a zero-length segment so round caps draw a dot.
pub fn smooth_path(points: &[Point], tension: f64) -> BezPath {
    let mut path = BezPath::new();
    let Some(&first) = points.first() else {
        return path;
    };
    path.move_to(first);
    if points.len() == 1 {
        path.line_to(first);
        return path;
    }
    if points.len() == 2 {
        path.line_to(points[1]);
        return path;
    }

    let last = points.len() - 1;
    for i in 0..last {
        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(last)];

        let t1 = (p2 - p0) * tension;
        let t2 = (p3 - p1) * tension;

        let cp1 = p1 + t1 / 3.0;
        let cp2 = p2 - t2 / 3.0;
        path.curve_to(cp1, cp2, p2);
    }
    path
}

/// Serde adapter for `[x0, y0, x1, y1, ...]` point lists.
pub(crate) mod flat_points {
    use kurbo::Point;
    use serde::{Deserialize, Deserializer, Serializer, ser::SerializeSeq};

    pub fn serialize<S: Serializer>(points: &[Point], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(points.len() * 2))?;
        for p in points {
            seq.serialize_element(&p.x)?;
            seq.serialize_element(&p.y)?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Point>, D::Error> {
        let flat = Vec::<f64>::deserialize(deserializer)?;
        if flat.len() % 2 != 0 {
            log::warn!("odd point list length {}, dropping trailing value", flat.len());
        }
        Ok(flat
            .chunks_exact(2)
            .map(|pair| Point::new(pair[0], pair[1]))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parse() {
        assert_eq!(Color::parse("#FF0000"), Some(Color::RED));
        assert_eq!(Color::parse("#fff"), Some(Color::WHITE));
        assert_eq!(Color::parse("#00000080"), Some(Color::rgba(0, 0, 0, 128)));
        assert_eq!(Color::parse("blue"), Some(Color::BLUE));
        assert_eq!(Color::parse("#12"), None);
        assert_eq!(Color::parse("#gg0000"), None);
    }

    #[test]
    fn test_color_serde() {
        let json = serde_json::to_string(&Color::GREEN).unwrap();
        assert_eq!(json, "\"#008000\"");
        let back: Color = serde_json::from_str("\"#008000\"").unwrap();
        assert_eq!(back, Color::GREEN);
        let unknown: Color = serde_json::from_str("\"not-a-color\"").unwrap();
        assert_eq!(unknown, Color::BLACK);
    }

    #[test]
    fn test_color_peniko_conversion() {
        let color: peniko::Color = Color::YELLOW.into();
        let rgba = color.to_rgba8();
        assert_eq!((rgba.r, rgba.g, rgba.b, rgba.a), (255, 255, 0, 255));
    }

    #[test]
    fn test_point_to_segment_dist() {
        let d = point_to_segment_dist(
            Point::new(5.0, 3.0),
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
        );
        assert!((d - 3.0).abs() < 1e-9);
        let d = point_to_segment_dist(
            Point::new(13.0, 4.0),
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
        );
        assert!((d - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_smooth_path_endpoints() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(20.0, 0.0),
        ];
        let path = smooth_path(&points, 0.5);
        let elements = path.elements();
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[0], kurbo::PathEl::MoveTo(points[0]));
        match elements[2] {
            kurbo::PathEl::CurveTo(_, _, end) => assert_eq!(end, points[2]),
            ref other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_smooth_path_single_point_is_dot() {
        let path = smooth_path(&[Point::new(3.0, 4.0)], 0.5);
        assert_eq!(path.elements().len(), 2);
        assert!(smooth_path(&[], 0.5).elements().is_empty());
    }
}
