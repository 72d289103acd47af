//! Selection state and single/double click disambiguation.

use crate::elements::{ElementId, ElementKind, HitTarget};
use crate::input::Timestamp;

/// Default double-click window.
pub const DOUBLE_CLICK_MS: u64 = 300;

/// At most one selected element.
///
/// Stroke/arrow selection and the text selection used for editing are
/// mutually exclusive, so they share one enum.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    None,
    /// A stroke or arrow.
    Element { id: ElementId, kind: ElementKind },
    /// A text label, drawn with a dashed outline.
    Text { id: ElementId },
}

impl Selection {
    pub fn from_target(target: HitTarget) -> Self {
        match target.kind {
            ElementKind::Text => Selection::Text { id: target.id },
            kind => Selection::Element { id: target.id, kind },
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Selection::None)
    }

    /// The selected element as a hit target.
    pub fn target(&self) -> Option<HitTarget> {
        match self {
            Selection::None => None,
            Selection::Element { id, kind } => Some(HitTarget::new(id.clone(), *kind)),
            Selection::Text { id } => Some(HitTarget::new(id.clone(), ElementKind::Text)),
        }
    }

    pub fn text_id(&self) -> Option<&str> {
        match self {
            Selection::Text { id } => Some(id),
            _ => None,
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        match self {
            Selection::None => false,
            Selection::Element { id: selected, .. } | Selection::Text { id: selected } => {
                selected == id
            }
        }
    }
}

/// A click waiting to find out whether it is the first half of a double click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingClick {
    pub target: HitTarget,
    pub at: Timestamp,
}

/// Outcome of registering a click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickResolution {
    /// The click is pending. A pending click on another target was pushed
    /// out and must take effect now.
    Scheduled { superseded: Option<HitTarget> },
    /// Second click on the same target inside the window.
    Double(HitTarget),
}

/// Deadline-based click timer driven by host timestamps.
#[derive(Debug, Clone)]
pub struct ClickTracker {
    window_ms: u64,
    pending: Option<PendingClick>,
}

impl Default for ClickTracker {
    fn default() -> Self {
        Self::new(DOUBLE_CLICK_MS)
    }
}

impl ClickTracker {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            pending: None,
        }
    }

    pub fn pending(&self) -> Option<&PendingClick> {
        self.pending.as_ref()
    }

    /// When the pending single click fires.
    pub fn deadline(&self) -> Option<Timestamp> {
        self.pending.as_ref().map(|p| p.at.after(self.window_ms))
    }

    /// Take the pending click if its window has elapsed.
    pub fn take_due(&mut self, now: Timestamp) -> Option<HitTarget> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|p| now.millis_since(p.at) >= self.window_ms);
        if due {
            self.pending.take().map(|p| p.target)
        } else {
            None
        }
    }

    /// Take the pending click regardless of its deadline.
    pub fn take(&mut self) -> Option<HitTarget> {
        self.pending.take().map(|p| p.target)
    }

    pub fn register(&mut self, target: HitTarget, now: Timestamp) -> ClickResolution {
        match self.pending.take() {
            Some(prev)
                if prev.target == target && now.millis_since(prev.at) < self.window_ms =>
            {
                ClickResolution::Double(target)
            }
            prev => {
                self.pending = Some(PendingClick { target, at: now });
                ClickResolution::Scheduled {
                    superseded: prev.map(|p| p.target),
                }
            }
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(id: &str) -> HitTarget {
        HitTarget::new(id, ElementKind::Text)
    }

    #[test]
    fn test_selection_from_target() {
        assert_eq!(
            Selection::from_target(text("t")),
            Selection::Text { id: "t".into() }
        );
        let sel = Selection::from_target(HitTarget::new("s", ElementKind::Stroke));
        assert!(sel.is_selected("s"));
        assert!(sel.text_id().is_none());
    }

    #[test]
    fn test_double_click_within_window() {
        let mut tracker = ClickTracker::new(300);
        let t0 = Timestamp::from_millis(1_000);
        assert_eq!(
            tracker.register(text("a"), t0),
            ClickResolution::Scheduled { superseded: None }
        );
        assert_eq!(
            tracker.register(text("a"), t0.after(200)),
            ClickResolution::Double(text("a"))
        );
        assert!(tracker.pending().is_none());
    }

    #[test]
    fn test_single_click_fires_after_window() {
        let mut tracker = ClickTracker::new(300);
        let t0 = Timestamp::from_millis(0);
        tracker.register(text("a"), t0);
        assert!(tracker.take_due(t0.after(299)).is_none());
        assert_eq!(tracker.take_due(t0.after(300)), Some(text("a")));
        assert!(tracker.take_due(t0.after(301)).is_none());
    }

    #[test]
    fn test_late_second_click_is_new_single() {
        let mut tracker = ClickTracker::new(300);
        let t0 = Timestamp::from_millis(0);
        tracker.register(text("a"), t0);
        assert_eq!(
            tracker.register(text("a"), t0.after(400)),
            ClickResolution::Scheduled {
                superseded: Some(text("a"))
            }
        );
    }

    #[test]
    fn test_click_on_other_target_supersedes() {
        let mut tracker = ClickTracker::new(300);
        let t0 = Timestamp::from_millis(0);
        tracker.register(text("a"), t0);
        assert_eq!(
            tracker.register(text("b"), t0.after(50)),
            ClickResolution::Scheduled {
                superseded: Some(text("a"))
            }
        );
        assert_eq!(tracker.deadline(), Some(t0.after(350)));
    }
}
