//! Viewport module for pan/zoom transforms.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest allowed scale.
pub const MIN_ZOOM: f64 = 0.5;
/// Largest allowed scale.
pub const MAX_ZOOM: f64 = 3.0;
/// Scale change per zoom button press.
pub const ZOOM_STEP: f64 = 0.1;
/// Wheel deltas are multiplied by `ZOOM_STEP * WHEEL_FACTOR`.
pub const WHEEL_FACTOR: f64 = 0.01;

/// Zoom bounds and step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomLimits {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub wheel_factor: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min: MIN_ZOOM,
            max: MAX_ZOOM,
            step: ZOOM_STEP,
            wheel_factor: WHEEL_FACTOR,
        }
    }
}

impl ZoomLimits {
    pub fn clamp(&self, scale: f64) -> f64 {
        scale.clamp(self.min, self.max)
    }

    /// Scale delta produced by a wheel movement.
    pub fn wheel_delta(&self, delta_y: f64) -> f64 {
        delta_y * self.step * self.wheel_factor
    }
}

/// Viewport manages the view transform for the canvas.
///
/// Device space is what the pointer reports; canvas space is where elements
/// live. `device = canvas * scale + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Uniform zoom factor.
    pub scale: f64,
    /// Translation in device pixels.
    pub offset: Vec2,
    #[serde(default)]
    pub limits: ZoomLimits,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(ZoomLimits::default())
    }
}

impl Viewport {
    pub fn new(limits: ZoomLimits) -> Self {
        Self {
            scale: limits.clamp(1.0),
            offset: Vec2::ZERO,
            limits,
        }
    }

    /// Canvas-to-device transform for rendering.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    /// Convert a device point to canvas coordinates: `(p - offset) / scale`.
    pub fn to_canvas_point(&self, device_point: Point) -> Point {
        Point::new(
            (device_point.x - self.offset.x) / self.scale,
            (device_point.y - self.offset.y) / self.scale,
        )
    }

    /// Convert a canvas point to device coordinates.
    pub fn to_device_point(&self, canvas_point: Point) -> Point {
        Point::new(
            canvas_point.x * self.scale + self.offset.x,
            canvas_point.y * self.scale + self.offset.y,
        )
    }

    /// Pan by a delta in device coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom by `delta_scale` (subtracted from the scale), keeping the canvas
    /// point under `device_point` fixed on screen.
    pub fn zoom_at(&mut self, device_point: Point, delta_scale: f64) {
        let new_scale = self.limits.clamp(self.scale - delta_scale);
        self.set_scale_at(device_point, new_scale);
    }

    /// Set the scale while keeping `device_point` anchored.
    pub fn set_scale_at(&mut self, device_point: Point, scale: f64) {
        let new_scale = self.limits.clamp(scale);
        if !new_scale.is_finite() {
            return;
        }

        let anchor = self.to_canvas_point(device_point);
        self.scale = new_scale;
        self.offset = Vec2::new(
            device_point.x - anchor.x * new_scale,
            device_point.y - anchor.y * new_scale,
        );
    }

    /// Zoom button: one step in, offset untouched.
    pub fn zoom_in(&mut self) {
        self.scale = self.limits.clamp(self.scale + self.limits.step);
    }

    /// Zoom button: one step out, offset untouched.
    pub fn zoom_out(&mut self) {
        self.scale = self.limits.clamp(self.scale - self.limits.step);
    }

    /// Zoom slider: set the scale directly, offset untouched.
    pub fn set_scale(&mut self, scale: f64) {
        if scale.is_finite() {
            self.scale = self.limits.clamp(scale);
        }
    }

    pub fn can_zoom_in(&self) -> bool {
        self.scale < self.limits.max
    }

    pub fn can_zoom_out(&self) -> bool {
        self.scale > self.limits.min
    }

    /// Canvas-space rectangle currently visible on a device surface.
    pub fn visible_canvas_rect(&self, device_size: Size) -> Rect {
        let origin = self.to_canvas_point(Point::ZERO);
        Rect::from_origin_size(
            origin,
            Size::new(
                device_size.width / self.scale,
                device_size.height / self.scale,
            ),
        )
    }

    /// Reset to scale 1 with no pan.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.scale = self.limits.clamp(1.0);
    }
}
