//! Undo/redo over committed strokes.

use crate::elements::Stroke;

/// Append-only stroke log with a head index.
///
/// `log[..head]` is the live stroke collection in paint order and
/// `log[head..]` is the redo stack, most recently undone first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrokeHistory {
    log: Vec<Stroke>,
    head: usize,
}

impl StrokeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything with a loaded collection; nothing to redo.
    pub fn load(strokes: Vec<Stroke>) -> Self {
        let head = strokes.len();
        Self { log: strokes, head }
    }

    /// Live strokes.
    pub fn strokes(&self) -> &[Stroke] {
        &self.log[..self.head]
    }

    /// Undone strokes, front = most recently undone.
    pub fn redo_stack(&self) -> &[Stroke] {
        &self.log[self.head..]
    }

    pub fn can_undo(&self) -> bool {
        self.head > 0
    }

    pub fn can_redo(&self) -> bool {
        self.head < self.log.len()
    }

    /// Commit a new stroke; discards the redo stack.
    pub fn commit(&mut self, stroke: Stroke) {
        self.log.truncate(self.head);
        self.log.push(stroke);
        self.head = self.log.len();
    }

    /// The stroke currently being drawn (always the newest live one).
    pub fn last_mut(&mut self) -> Option<&mut Stroke> {
        self.head.checked_sub(1).and_then(|i| self.log.get_mut(i))
    }

    pub fn get(&self, id: &str) -> Option<&Stroke> {
        self.strokes().iter().find(|s| s.id == id)
    }

    /// Move the newest live stroke onto the redo stack.
    pub fn undo(&mut self) -> Option<&Stroke> {
        if !self.can_undo() {
            return None;
        }
        self.head -= 1;
        self.log.get(self.head)
    }

    /// Move the front of the redo stack back to the end of the live strokes.
    pub fn redo(&mut self) -> Option<&Stroke> {
        if !self.can_redo() {
            return None;
        }
        self.head += 1;
        self.log.get(self.head - 1)
    }

    /// Remove a live stroke by id. The redo stack is left alone.
    pub fn remove(&mut self, id: &str) -> Option<Stroke> {
        let index = self.strokes().iter().position(|s| s.id == id)?;
        self.head -= 1;
        Some(self.log.remove(index))
    }

    /// Drop all strokes and the redo stack.
    pub fn clear(&mut self) {
        self.log.clear();
        self.head = 0;
    }
}
