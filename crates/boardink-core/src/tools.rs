//! Tool system for the board.

use crate::elements::Color;
use crate::input::{Key, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default key debounce window.
pub const KEY_DEBOUNCE_MS: u64 = 150;
/// Default brush size.
pub const DEFAULT_BRUSH_SIZE: f64 = 15.0;
/// Brush size slider bounds.
pub const MIN_BRUSH_SIZE: f64 = 1.0;
pub const MAX_BRUSH_SIZE: f64 = 53.0;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Default,
    Pen,
    Eraser,
    Hand,
    Text,
    Line,
    Shapes,
    Image,
}

impl ToolKind {
    /// Every tool, in palette order.
    pub fn all() -> &'static [ToolKind] {
        &[
            ToolKind::Default,
            ToolKind::Hand,
            ToolKind::Pen,
            ToolKind::Eraser,
            ToolKind::Text,
            ToolKind::Line,
            ToolKind::Shapes,
            ToolKind::Image,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Default => "default",
            ToolKind::Pen => "pen",
            ToolKind::Eraser => "eraser",
            ToolKind::Hand => "hand",
            ToolKind::Text => "text",
            ToolKind::Line => "line",
            ToolKind::Shapes => "shapes",
            ToolKind::Image => "image",
        }
    }

    /// Tools that revert to `Default` after one completed gesture.
    pub fn is_one_shot(&self) -> bool {
        matches!(self, ToolKind::Text | ToolKind::Line)
    }

    /// Cursor hint for the drawing surface.
    pub fn cursor(&self) -> &'static str {
        match self {
            ToolKind::Eraser => "eraser",
            ToolKind::Pen => "pencil",
            ToolKind::Hand => "grab",
            _ => "default",
        }
    }
}

/// Inputs that drive tool transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolInput {
    /// Palette button or tool shortcut.
    Select(ToolKind),
    /// A one-shot tool finished its gesture.
    GestureCompleted,
    /// Space pressed.
    HoldHand,
    /// Space released.
    ReleaseHand,
}

/// Pure tool transition table.
pub fn transition(current: ToolKind, input: ToolInput) -> ToolKind {
    match input {
        ToolInput::Select(tool) if tool == current => ToolKind::Default,
        ToolInput::Select(tool) => tool,
        ToolInput::GestureCompleted if current.is_one_shot() => ToolKind::Default,
        ToolInput::GestureCompleted => current,
        ToolInput::HoldHand => ToolKind::Hand,
        ToolInput::ReleaseHand => ToolKind::Default,
    }
}

/// Discards key-down repeats of the same key inside a window.
///
/// The last-seen time is refreshed on every key-down, so auto-repeat from a
/// held key never gets through.
#[derive(Debug, Clone)]
pub struct KeyDebounce {
    window_ms: u64,
    last_seen: HashMap<Key, Timestamp>,
}

impl KeyDebounce {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            last_seen: HashMap::new(),
        }
    }

    /// Record a key-down and report whether it should be acted on.
    pub fn accept(&mut self, key: Key, now: Timestamp) -> bool {
        let key = key.normalized();
        let accepted = match self.last_seen.get(&key) {
            Some(last) => now.millis_since(*last) >= self.window_ms,
            None => true,
        };
        self.last_seen.insert(key, now);
        accepted
    }
}

/// Current brush applied to new elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Brush {
    pub color: Color,
    pub size: f64,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            size: DEFAULT_BRUSH_SIZE,
        }
    }
}

impl Brush {
    pub fn set_size(&mut self, size: f64) {
        if size.is_finite() {
            self.size = size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE);
        }
    }
}

/// Manages the current tool.
#[derive(Debug, Clone)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Whether space is being held for transient panning.
    space_held: bool,
    debounce: KeyDebounce,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self::new(KEY_DEBOUNCE_MS)
    }
}

impl ToolManager {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            current_tool: ToolKind::Default,
            space_held: false,
            debounce: KeyDebounce::new(debounce_ms),
        }
    }

    fn apply(&mut self, input: ToolInput) -> bool {
        let next = transition(self.current_tool, input);
        let changed = next != self.current_tool;
        if changed {
            log::debug!("tool {} -> {}", self.current_tool.name(), next.name());
        }
        self.current_tool = next;
        changed
    }

    /// Palette selection; selecting the active tool toggles back to default.
    pub fn select(&mut self, tool: ToolKind) -> bool {
        self.apply(ToolInput::Select(tool))
    }

    /// Revert one-shot tools after their gesture.
    pub fn complete_gesture(&mut self) -> bool {
        self.apply(ToolInput::GestureCompleted)
    }

    /// Space pressed. Repeats while held are ignored.
    pub fn hold_hand(&mut self) -> bool {
        if self.space_held {
            return false;
        }
        self.space_held = true;
        self.apply(ToolInput::HoldHand)
    }

    /// Space released.
    pub fn release_hand(&mut self) -> bool {
        if !self.space_held {
            return false;
        }
        self.space_held = false;
        self.apply(ToolInput::ReleaseHand)
    }

    pub fn is_space_held(&self) -> bool {
        self.space_held
    }

    /// Debounce a key-down.
    pub fn accept_key(&mut self, key: Key, now: Timestamp) -> bool {
        self.debounce.accept(key, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_selection() {
        let mut tm = ToolManager::default();
        assert_eq!(tm.current_tool, ToolKind::Default);

        tm.select(ToolKind::Pen);
        assert_eq!(tm.current_tool, ToolKind::Pen);

        tm.select(ToolKind::Eraser);
        assert_eq!(tm.current_tool, ToolKind::Eraser);
    }

    #[test]
    fn test_select_active_tool_toggles_off() {
        assert_eq!(
            transition(ToolKind::Pen, ToolInput::Select(ToolKind::Pen)),
            ToolKind::Default
        );
        assert_eq!(
            transition(ToolKind::Default, ToolInput::Select(ToolKind::Default)),
            ToolKind::Default
        );
    }

    #[test]
    fn test_one_shot_tools_revert() {
        assert_eq!(
            transition(ToolKind::Text, ToolInput::GestureCompleted),
            ToolKind::Default
        );
        assert_eq!(
            transition(ToolKind::Line, ToolInput::GestureCompleted),
            ToolKind::Default
        );
        assert_eq!(
            transition(ToolKind::Pen, ToolInput::GestureCompleted),
            ToolKind::Pen
        );
    }

    #[test]
    fn test_space_hold_and_release() {
        let mut tm = ToolManager::default();
        tm.select(ToolKind::Pen);
        assert!(tm.hold_hand());
        assert_eq!(tm.current_tool, ToolKind::Hand);
        assert!(!tm.hold_hand());

        tm.release_hand();
        assert_eq!(tm.current_tool, ToolKind::Default);
        assert!(!tm.release_hand());
    }

    #[test]
    fn test_key_debounce() {
        let mut debounce = KeyDebounce::new(150);
        let t0 = Timestamp::from_millis(1_000);
        assert!(debounce.accept(Key::Char('p'), t0));
        assert!(!debounce.accept(Key::Char('p'), t0.after(100)));
        // Window restarts from the rejected press.
        assert!(!debounce.accept(Key::Char('P'), t0.after(200)));
        assert!(debounce.accept(Key::Char('p'), t0.after(400)));
        assert!(debounce.accept(Key::Char('e'), t0.after(401)));
    }

    #[test]
    fn test_brush_size_clamped() {
        let mut brush = Brush::default();
        assert!((brush.size - 15.0).abs() < f64::EPSILON);
        brush.set_size(200.0);
        assert!((brush.size - MAX_BRUSH_SIZE).abs() < f64::EPSILON);
        brush.set_size(0.0);
        assert!((brush.size - MIN_BRUSH_SIZE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cursor_hints() {
        assert_eq!(ToolKind::Eraser.cursor(), "eraser");
        assert_eq!(ToolKind::Pen.cursor(), "pencil");
        assert_eq!(ToolKind::Hand.cursor(), "grab");
        assert_eq!(ToolKind::Text.cursor(), "default");
    }

    #[test]
    fn test_tool_serde_names() {
        let json = serde_json::to_string(&ToolKind::Line).unwrap();
        assert_eq!(json, "\"line\"");
    }
}
