//! Input events consumed by the board engine.
//!
//! Hosts translate their native pointer, wheel and keyboard events into these
//! types and feed them to [`BoardEngine::dispatch`](crate::BoardEngine::dispatch)
//! together with a monotonic [`Timestamp`].

use crate::elements::Color;
use crate::tools::ToolKind;
use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Monotonic host time in milliseconds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub const ZERO: Self = Self(0);

    pub fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    pub fn as_millis(self) -> u64 {
        self.0
    }

    /// Milliseconds elapsed since `earlier` (zero if `earlier` is in the future).
    pub fn millis_since(self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// The timestamp `ms` milliseconds after this one.
    pub fn after(self, ms: u64) -> Timestamp {
        Timestamp(self.0.saturating_add(ms))
    }
}

/// Pointer event in device space.
///
/// The position is optional: some surfaces report events with no pointer
/// position (e.g. when the pointer left the drawing area). Those are no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Option<Point> },
    Move { position: Option<Point> },
    Up { position: Option<Point> },
}

impl PointerEvent {
    pub fn position(&self) -> Option<Point> {
        match *self {
            PointerEvent::Down { position }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position } => position,
        }
    }
}

/// Keyboard keys the engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Char(char),
    Space,
    Delete,
    Backspace,
    Escape,
    Enter,
}

impl Key {
    /// Lowercase letter keys so bindings match regardless of caps lock / shift.
    pub fn normalized(self) -> Self {
        match self {
            Key::Char(c) => Key::Char(c.to_ascii_lowercase()),
            other => other,
        }
    }

    /// Display label for shortcut listings.
    pub fn label(&self) -> String {
        match self {
            Key::Char(c) => c.to_ascii_uppercase().to_string(),
            Key::Space => "Space".to_string(),
            Key::Delete => "Delete".to_string(),
            Key::Backspace => "Backspace".to_string(),
            Key::Escape => "Escape".to_string(),
            Key::Enter => "Enter".to_string(),
        }
    }
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
        alt: false,
        meta: false,
    };

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A key press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn ctrl(key: Key) -> Self {
        Self::with_modifiers(key, Modifiers::CTRL)
    }
}

/// Everything the engine can be asked to do.
///
/// Raw device input (pointer, wheel, keys, ticks) sits next to the commands
/// the surrounding chrome issues: the tool palette, zoom buttons, brush
/// settings and the answers of the dialog surfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Pointer(PointerEvent),
    Wheel {
        position: Option<Point>,
        delta: Vec2,
    },
    KeyDown(KeyEvent),
    KeyUp(KeyEvent),
    /// Timer heartbeat; fires due click timers and deferred saves.
    Tick,
    /// Device surface resized.
    Resize(Size),
    /// Tool palette button.
    SetTool(ToolKind),
    SetColor(Color),
    SetBrushSize(f64),
    ZoomIn,
    ZoomOut,
    /// Zoom slider.
    SetZoom(f64),
    Undo,
    Redo,
    /// Ask for the clear-canvas confirmation.
    RequestClear,
    DeleteSelection,
    /// Current contents of the text-edit dialog's input.
    DialogDraft(String),
    DialogConfirm,
    DialogCancel,
}

impl Event {
    pub fn pointer_down(x: f64, y: f64) -> Self {
        Event::Pointer(PointerEvent::Down {
            position: Some(Point::new(x, y)),
        })
    }

    pub fn pointer_move(x: f64, y: f64) -> Self {
        Event::Pointer(PointerEvent::Move {
            position: Some(Point::new(x, y)),
        })
    }

    pub fn pointer_up(x: f64, y: f64) -> Self {
        Event::Pointer(PointerEvent::Up {
            position: Some(Point::new(x, y)),
        })
    }

    pub fn wheel(x: f64, y: f64, delta_y: f64) -> Self {
        Event::Wheel {
            position: Some(Point::new(x, y)),
            delta: Vec2::new(0.0, delta_y),
        }
    }

    pub fn key(key: Key) -> Self {
        Event::KeyDown(KeyEvent::new(key))
    }
}
