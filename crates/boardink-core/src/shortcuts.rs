//! Keyboard shortcut registry and documentation.

use crate::input::{Key, KeyEvent};
use crate::tools::ToolKind;

/// What a shortcut does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ToggleTool(ToolKind),
    /// Transient hand while the key is held.
    HoldHand,
    Undo,
    Redo,
    RequestClear,
    ZoomIn,
    ZoomOut,
    DeleteSelection,
    CancelDialog,
    ConfirmDialog,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: Key,
    pub ctrl: bool,
    pub shift: bool,
    pub command: Command,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: Key,
        ctrl: bool,
        shift: bool,
        command: Command,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            command,
            description,
        }
    }

    /// Whether a key event triggers this shortcut.
    ///
    /// Shift only distinguishes command-key chords; plain keys match with or
    /// without it so caps lock and shifted symbols like `+` work.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        if event.key.normalized() != self.key.normalized() {
            return false;
        }
        if event.modifiers.command() != self.ctrl {
            return false;
        }
        !self.ctrl || event.modifiers.shift == self.shift
    }

    /// Format the shortcut for display (e.g., "Ctrl+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl".to_string());
        }
        if self.shift {
            parts.push("Shift".to_string());
        }
        parts.push(self.key.label());
        parts.join("+")
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        use Command::*;
        vec![
            Shortcut::new(Key::Char('h'), false, false, ToggleTool(ToolKind::Hand), "Hand tool"),
            Shortcut::new(Key::Char('p'), false, false, ToggleTool(ToolKind::Pen), "Pen tool"),
            Shortcut::new(Key::Char('e'), false, false, ToggleTool(ToolKind::Eraser), "Eraser tool"),
            Shortcut::new(Key::Char('t'), false, false, ToggleTool(ToolKind::Text), "Text tool"),
            Shortcut::new(Key::Char('l'), false, false, ToggleTool(ToolKind::Line), "Line tool"),
            Shortcut::new(Key::Char('s'), false, false, ToggleTool(ToolKind::Shapes), "Shapes tool"),
            Shortcut::new(Key::Char('i'), false, false, ToggleTool(ToolKind::Image), "Image tool"),
            Shortcut::new(Key::Space, false, false, HoldHand, "Pan while held"),
            Shortcut::new(Key::Char('z'), true, false, Undo, "Undo"),
            Shortcut::new(Key::Char('x'), true, false, Redo, "Redo"),
            Shortcut::new(Key::Char('z'), true, true, Redo, "Redo"),
            Shortcut::new(Key::Char('c'), false, false, RequestClear, "Clear canvas"),
            Shortcut::new(Key::Char('+'), false, false, ZoomIn, "Zoom in"),
            Shortcut::new(Key::Char('-'), false, false, ZoomOut, "Zoom out"),
            Shortcut::new(Key::Delete, false, false, DeleteSelection, "Delete selection"),
            Shortcut::new(Key::Backspace, false, false, DeleteSelection, "Delete selection"),
            Shortcut::new(Key::Escape, false, false, CancelDialog, "Close dialog"),
            Shortcut::new(Key::Enter, false, false, ConfirmDialog, "Confirm dialog"),
        ]
    }

    /// Find the command bound to a key event.
    pub fn lookup(event: &KeyEvent) -> Option<Command> {
        Self::all()
            .into_iter()
            .find(|shortcut| shortcut.matches(event))
            .map(|shortcut| shortcut.command)
    }

    /// Help overlay lines, `"<keys>  <description>"`.
    pub fn help_lines() -> Vec<String> {
        Self::all()
            .iter()
            .map(|shortcut| format!("{:14} {}", shortcut.format(), shortcut.description))
            .collect()
    }
}
