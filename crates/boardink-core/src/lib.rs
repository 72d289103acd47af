//! Boardink Core Library
//!
//! Platform-agnostic annotation canvas for boardink task boards: elements,
//! viewport, tools, history, persistence and the event engine tying them
//! together.

pub mod config;
pub mod dialog;
pub mod document;
pub mod elements;
pub mod engine;
pub mod history;
pub mod input;
pub mod persistence;
pub mod scene;
pub mod scene_graph;
pub mod selection;
pub mod shortcuts;
pub mod storage;
pub mod tools;
pub mod viewport;

pub use config::{ConfigError, EngineConfig};
pub use dialog::{Dialog, DialogRequest};
pub use document::BoardDocument;
pub use elements::{Arrow, Color, ElementKind, HitTarget, Stroke, StrokeKind, TextLabel};
pub use engine::{BoardEngine, Effect, ExportSurface};
pub use input::{Event, Key, KeyEvent, Modifiers, PointerEvent, Timestamp};
pub use persistence::{BoardPersistence, SavePolicy, SharedStore};
pub use scene_graph::{Blend, SceneGraph, SceneNode};
pub use selection::Selection;
pub use storage::{KeyValueStore, MemoryStore, StorageError};
pub use tools::{Brush, ToolKind, ToolManager};
pub use viewport::Viewport;
