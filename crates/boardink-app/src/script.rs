//! Timed input scripts replayed against an engine.

use crate::AppError;
use boardink_core::{BoardEngine, Effect, Event, Timestamp};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One scripted event and the host time it arrives at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    /// Milliseconds on the host clock.
    pub at: u64,
    pub event: Event,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Script {
    pub steps: Vec<ScriptStep>,
}

/// Counts gathered while replaying.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub events: usize,
    pub repaints: usize,
    pub dialogs: usize,
    /// Host time of the last step.
    pub end: Timestamp,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let json = std::fs::read_to_string(path).map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json).map_err(|source| AppError::Script {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Feed every step to `engine` in order.
    ///
    /// Steps with a time earlier than the previous one are clamped so the
    /// engine always sees a monotonic clock.
    pub fn replay(&self, engine: &mut BoardEngine) -> ReplayStats {
        let mut stats = ReplayStats::default();
        for step in &self.steps {
            let now = Timestamp::from_millis(step.at.max(stats.end.as_millis()));
            stats.end = now;
            stats.events += 1;
            for effect in engine.dispatch(step.event.clone(), now) {
                match effect {
                    Effect::Repaint => stats.repaints += 1,
                    Effect::OpenDialog(request) => {
                        stats.dialogs += 1;
                        log::info!("dialog requested: {request:?}");
                    }
                    Effect::CloseDialog => log::debug!("dialog closed"),
                    Effect::ToolChanged(tool) => log::debug!("tool is now {}", tool.name()),
                }
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardink_core::ToolKind;

    const SCRIPT: &str = r#"[
        {"at": 0, "event": {"SetTool": "pen"}},
        {"at": 10, "event": {"Pointer": {"Down": {"position": {"x": 10.0, "y": 10.0}}}}},
        {"at": 20, "event": {"Pointer": {"Move": {"position": {"x": 20.0, "y": 20.0}}}}},
        {"at": 30, "event": {"Pointer": {"Up": {"position": {"x": 20.0, "y": 20.0}}}}},
        {"at": 40, "event": "RequestClear"},
        {"at": 50, "event": "DialogCancel"}
    ]"#;

    #[test]
    fn test_replay_script() {
        let script = Script::from_json(SCRIPT).unwrap();
        assert_eq!(script.steps.len(), 6);

        let mut engine = BoardEngine::default();
        let stats = script.replay(&mut engine);
        assert_eq!(stats.events, 6);
        assert_eq!(stats.dialogs, 1);
        assert_eq!(stats.end, Timestamp::from_millis(50));
        assert_eq!(engine.tool(), ToolKind::Pen);
        assert_eq!(engine.strokes().len(), 1);
        assert_eq!(engine.strokes()[0].points.len(), 2);
        assert!(engine.dialog().is_none());
    }

    #[test]
    fn test_clock_is_monotonic() {
        let script = Script {
            steps: vec![
                ScriptStep {
                    at: 100,
                    event: Event::Tick,
                },
                ScriptStep {
                    at: 50,
                    event: Event::Tick,
                },
            ],
        };
        let stats = script.replay(&mut BoardEngine::default());
        assert_eq!(stats.end, Timestamp::from_millis(100));
    }

    #[test]
    fn test_bad_script_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        std::fs::write(&path, r#"[{"at": "soon"}]"#).unwrap();
        assert!(matches!(Script::load(&path), Err(AppError::Script { .. })));
    }
}
