//! Renderer trait abstraction.

use boardink_core::scene_graph::SceneGraph;
use boardink_core::viewport::Viewport;
use kurbo::{Affine, Size};
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Surface has zero size ({width}x{height})")]
    ZeroSize { width: u32, height: u32 },
    #[error("Invalid font data: {0}")]
    InvalidFont(String),
    #[error("Render failed: {0}")]
    RenderFailed(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Context for a single render pass.
pub struct RenderContext<'a> {
    /// Nodes to draw, back to front, in canvas space.
    pub graph: &'a SceneGraph,
    /// Live view transform.
    pub viewport: Viewport,
    /// Surface size in device pixels.
    pub device_size: Size,
    /// Output pixels per device pixel.
    pub pixel_ratio: f64,
}

impl<'a> RenderContext<'a> {
    pub fn new(graph: &'a SceneGraph, viewport: Viewport, device_size: Size) -> Self {
        Self {
            graph,
            viewport,
            device_size,
            pixel_ratio: 1.0,
        }
    }

    /// Set the output pixel density.
    pub fn with_pixel_ratio(mut self, pixel_ratio: f64) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    /// Output size in whole pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        let px = |v: f64| (v * self.pixel_ratio).round().max(0.0) as u32;
        (px(self.device_size.width), px(self.device_size.height))
    }

    /// Canvas-to-pixel transform: the viewport pre-scaled by the pixel ratio.
    pub fn transform(&self) -> Affine {
        Affine::scale(self.pixel_ratio) * self.viewport.transform()
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// Draw every node of the context's scene graph.
    fn build_scene(&mut self, ctx: &RenderContext<'_>) -> RenderResult<()>;
}
