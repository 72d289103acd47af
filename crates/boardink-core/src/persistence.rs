//! Per-board persistence with immediate or debounced saves.

use crate::document::{BoardDocument, DocumentView};
use crate::input::Timestamp;
use crate::storage::{KeyValueStore, StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default debounce interval for [`SavePolicy::Debounced`].
pub const DEFAULT_SAVE_INTERVAL_MS: u64 = 1_000;

/// When mutations reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SavePolicy {
    /// One write per mutation.
    #[default]
    Immediate,
    /// Mark dirty; write on the first tick at least `interval_ms` after
    /// the first unsaved mutation.
    Debounced { interval_ms: u64 },
}

/// Shared handle to a storage backend.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Loads and saves one board's document.
///
/// Without a board id nothing is loaded or saved. Write failures are logged
/// and never reach the caller's input handling.
pub struct BoardPersistence {
    store: SharedStore,
    board_id: Option<String>,
    policy: SavePolicy,
    dirty: bool,
    last_save: Option<Timestamp>,
    dirty_since: Option<Timestamp>,
}

impl std::fmt::Debug for BoardPersistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardPersistence")
            .field("board_id", &self.board_id)
            .field("policy", &self.policy)
            .field("dirty", &self.dirty)
            .field("last_save", &self.last_save)
            .finish_non_exhaustive()
    }
}

impl BoardPersistence {
    pub fn new(store: SharedStore, policy: SavePolicy) -> Self {
        Self {
            store,
            board_id: None,
            policy,
            dirty: false,
            last_save: None,
            dirty_since: None,
        }
    }

    /// In-memory store with no board attached.
    pub fn detached() -> Self {
        Self::new(Arc::new(crate::storage::MemoryStore::new()), SavePolicy::Immediate)
    }

    pub fn board_id(&self) -> Option<&str> {
        self.board_id.as_deref()
    }

    pub fn policy(&self) -> SavePolicy {
        self.policy
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn last_save(&self) -> Option<Timestamp> {
        self.last_save
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Attach a board and load its document.
    ///
    /// Missing or malformed data yields an empty document.
    pub fn activate(&mut self, board_id: Option<String>) -> BoardDocument {
        self.board_id = board_id;
        self.dirty = false;
        self.dirty_since = None;
        let Some(id) = self.board_id.as_deref() else {
            return BoardDocument::default();
        };
        match self.try_load(id) {
            Ok(doc) => {
                log::info!(
                    "loaded board {id}: {} strokes, {} texts, {} arrows",
                    doc.lines.len(),
                    doc.texts.len(),
                    doc.arrows.len()
                );
                doc
            }
            Err(StorageError::NotFound(_)) => {
                log::info!("board {id} has no saved data, starting empty");
                BoardDocument::default()
            }
            Err(e) => {
                log::warn!("could not load board {id}, starting empty: {e}");
                BoardDocument::default()
            }
        }
    }

    fn try_load(&self, id: &str) -> StorageResult<BoardDocument> {
        let json = self.store.load(id)?;
        BoardDocument::from_json(&json).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Record a mutation. Saves right away under the immediate policy.
    pub fn mark_dirty(&mut self, document: DocumentView<'_>, now: Timestamp) {
        if self.board_id.is_none() {
            return;
        }
        if !self.dirty {
            self.dirty_since = Some(now);
        }
        self.dirty = true;
        if self.policy == SavePolicy::Immediate {
            self.write(document, now);
        }
    }

    /// Whether a debounced save is due.
    pub fn should_save(&self, now: Timestamp) -> bool {
        if !self.dirty {
            return false;
        }
        match self.policy {
            SavePolicy::Immediate => true,
            SavePolicy::Debounced { interval_ms } => {
                let since = self.dirty_since.unwrap_or(now);
                now.millis_since(since) >= interval_ms
            }
        }
    }

    /// Save if dirty and due. Returns true if a write happened.
    pub fn tick(&mut self, document: DocumentView<'_>, now: Timestamp) -> bool {
        if self.should_save(now) {
            self.write(document, now)
        } else {
            false
        }
    }

    /// Save now if there are unsaved changes.
    pub fn flush(&mut self, document: DocumentView<'_>, now: Timestamp) -> bool {
        if self.dirty {
            self.write(document, now)
        } else {
            false
        }
    }

    fn write(&mut self, document: DocumentView<'_>, now: Timestamp) -> bool {
        let Some(id) = self.board_id.as_deref() else {
            return false;
        };
        let result = document
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()))
            .and_then(|json| self.store.save(id, &json));
        match result {
            Ok(()) => {
                log::debug!("saved board {id}");
                self.dirty = false;
                self.dirty_since = None;
                self.last_save = Some(now);
                true
            }
            Err(e) => {
                log::error!("failed to save board {id}: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Color, Stroke, StrokeKind, TextLabel};
    use crate::storage::MemoryStore;
    use kurbo::Point;

    fn document() -> BoardDocument {
        BoardDocument {
            lines: vec![Stroke::from_points(
                StrokeKind::Pen,
                vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)],
            )],
            texts: vec![TextLabel::new(Point::new(5.0, 5.0), "hi", 15.0, Color::RED)],
            arrows: vec![],
        }
    }

    fn view(doc: &BoardDocument) -> DocumentView<'_> {
        DocumentView {
            lines: &doc.lines,
            texts: &doc.texts,
            arrows: &doc.arrows,
        }
    }

    #[test]
    fn test_save_then_reload() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let doc = document();

        let mut persistence = BoardPersistence::new(store.clone(), SavePolicy::Immediate);
        persistence.activate(Some("b1".into()));
        persistence.mark_dirty(view(&doc), Timestamp::ZERO);
        assert!(!persistence.is_dirty());

        let mut reopened = BoardPersistence::new(store, SavePolicy::Immediate);
        assert_eq!(reopened.activate(Some("b1".into())), doc);
    }

    #[test]
    fn test_malformed_data_loads_empty() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        store.save("b1", "{definitely not json").unwrap();
        let mut persistence = BoardPersistence::new(store, SavePolicy::Immediate);
        assert!(persistence.activate(Some("b1".into())).is_empty());
    }

    #[test]
    fn test_no_board_id_no_io() {
        let store = Arc::new(MemoryStore::new());
        let mut persistence = BoardPersistence::new(store.clone(), SavePolicy::Immediate);
        assert!(persistence.activate(None).is_empty());
        persistence.mark_dirty(view(&document()), Timestamp::ZERO);
        assert!(store.is_empty());
    }

    #[test]
    fn test_debounced_policy() {
        let store = Arc::new(MemoryStore::new());
        let mut persistence =
            BoardPersistence::new(store.clone(), SavePolicy::Debounced { interval_ms: 500 });
        persistence.activate(Some("b1".into()));
        let doc = document();

        let t0 = Timestamp::from_millis(1_000);
        persistence.mark_dirty(view(&doc), t0);
        assert!(store.is_empty());
        assert!(!persistence.tick(view(&doc), t0.after(499)));
        assert!(persistence.tick(view(&doc), t0.after(500)));
        assert_eq!(store.len(), 1);
        assert!(!persistence.tick(view(&doc), t0.after(2_000)));
    }

    #[test]
    fn test_debounce_restarts_after_idle() {
        let store = Arc::new(MemoryStore::new());
        let mut persistence =
            BoardPersistence::new(store.clone(), SavePolicy::Debounced { interval_ms: 500 });
        persistence.activate(Some("b1".into()));
        let doc = document();

        persistence.mark_dirty(view(&doc), Timestamp::ZERO);
        assert!(persistence.tick(view(&doc), Timestamp::from_millis(500)));

        // Long idle, then a new mutation: it still waits a full interval.
        let t1 = Timestamp::from_millis(60_000);
        store.delete("b1").unwrap();
        persistence.mark_dirty(view(&doc), t1);
        assert!(!persistence.tick(view(&doc), t1.after(1)));
        assert!(!persistence.tick(view(&doc), t1.after(499)));
        assert!(store.is_empty());
        assert!(persistence.tick(view(&doc), t1.after(500)));
        assert!(store.exists("b1").unwrap());
    }

    #[test]
    fn test_flush_writes_pending() {
        let store = Arc::new(MemoryStore::new());
        let mut persistence =
            BoardPersistence::new(store.clone(), SavePolicy::Debounced { interval_ms: 10_000 });
        persistence.activate(Some("b1".into()));
        let doc = document();
        persistence.mark_dirty(view(&doc), Timestamp::ZERO);
        assert!(persistence.flush(view(&doc), Timestamp::from_millis(1)));
        assert!(!persistence.flush(view(&doc), Timestamp::from_millis(2)));
        assert!(store.exists("b1").unwrap());
    }

    #[test]
    fn test_policy_serde() {
        let policy: SavePolicy = serde_json::from_str(r#"{"debounced":{"interval_ms":250}}"#).unwrap();
        assert_eq!(policy, SavePolicy::Debounced { interval_ms: 250 });
        let policy: SavePolicy = serde_json::from_str(r#""immediate""#).unwrap();
        assert_eq!(policy, SavePolicy::Immediate);
    }
}
