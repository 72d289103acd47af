//! Boardink Render Library
//!
//! CPU rasterization of the board scene graph and PNG export.
//! The default implementation uses tiny-skia for paths and ab_glyph for text.

pub mod download;
pub mod export;
mod raster;
mod renderer;
mod text;

pub use download::{DownloadTarget, MemoryTarget};
pub use export::{EXPORT_FILENAME, ExportError, ExportOptions, ExportResult, ExportedImage, Exporter, encode_png};
pub use raster::{PixmapRenderer, to_skia_path, to_skia_transform};
pub use renderer::{RenderContext, RenderResult, Renderer, RendererError};
pub use text::GlyphRenderer;

#[cfg(not(target_arch = "wasm32"))]
pub use download::DirectoryTarget;

#[cfg(target_arch = "wasm32")]
pub use download::BrowserDownload;
