//! Headless host: opens a board, replays input, persists and exports.

use crate::config::{AppConfig, CliArgs};
use crate::script::{ReplayStats, Script};
use boardink_core::config::ConfigError;
use boardink_core::storage::{FileStore, StorageError};
use boardink_core::{BoardEngine, Event, SharedStore, Timestamp};
use boardink_render::{DirectoryTarget, ExportError, ExportedImage, Exporter};
use kurbo::Size;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid script {path}: {source}")]
    Script {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
}

/// What a run did.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub board_id: String,
    pub replay: ReplayStats,
    pub strokes: usize,
    pub arrows: usize,
    pub texts: usize,
    pub export: Option<(PathBuf, ExportedImage)>,
}

/// The headless application shell.
pub struct App {
    config: AppConfig,
    engine: BoardEngine,
    store_dir: PathBuf,
}

impl App {
    /// Open a file store and build the engine.
    pub fn new(config: AppConfig, store_dir: Option<PathBuf>) -> Result<Self, AppError> {
        let store = match store_dir.or_else(|| config.store_dir.clone()) {
            Some(dir) => FileStore::new(dir)?,
            None => FileStore::default_location()?,
        };
        let store_dir = store.base_path().to_path_buf();
        log::info!("boards stored in {}", store_dir.display());

        let shared: SharedStore = Arc::new(store);
        let mut engine = BoardEngine::new(config.engine.clone(), shared);
        engine.dispatch(
            Event::Resize(Size::new(config.width as f64, config.height as f64)),
            Timestamp::ZERO,
        );
        Ok(Self {
            config,
            engine,
            store_dir,
        })
    }

    pub fn engine(&self) -> &BoardEngine {
        &self.engine
    }

    pub fn store_dir(&self) -> &std::path::Path {
        &self.store_dir
    }

    /// Run one invocation of the command line.
    pub fn run(config: AppConfig, args: CliArgs) -> Result<RunSummary, AppError> {
        let mut app = Self::new(config, args.store_dir.clone())?;
        app.engine.open_board(Some(args.board_id.clone()));

        let replay = match &args.script {
            Some(path) => Script::load(path)?.replay(&mut app.engine),
            None => ReplayStats::default(),
        };
        // Deliver deferred saves and any click still waiting on its window.
        let end = replay.end.after(app.config.engine.double_click_ms);
        app.engine.dispatch(Event::Tick, end);
        app.engine.flush(end);

        let export = match &args.export_dir {
            Some(dir) => Some((dir.clone(), app.export_to(dir.clone())?)),
            None => None,
        };

        let summary = RunSummary {
            board_id: args.board_id,
            replay,
            strokes: app.engine.strokes().len(),
            arrows: app.engine.arrows().len(),
            texts: app.engine.texts().len(),
            export,
        };
        log::info!(
            "board {}: {} strokes, {} arrows, {} texts after {} events",
            summary.board_id,
            summary.strokes,
            summary.arrows,
            summary.texts,
            summary.replay.events
        );
        Ok(summary)
    }

    /// Export the visible viewport into `dir`.
    pub fn export_to(&mut self, dir: PathBuf) -> Result<ExportedImage, AppError> {
        let mut exporter = Exporter::new(self.config.export.to_options()?)?;
        let mut target = DirectoryTarget::new(dir);
        Ok(exporter.export_to(self.engine.export_surface(), &mut target)?)
    }
}
