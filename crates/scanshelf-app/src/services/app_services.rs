// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — resolves the data directory, loads the persisted
// config, and assembles the pieces the library controller needs.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use scanshelf_bridge::PlatformBridge;
use scanshelf_core::AppConfig;
use scanshelf_core::error::Result;
use scanshelf_document::{EmbeddedImageRenderer, TextExtractor, TextRecognizer, UnavailableRecognizer};
use tracing::{info, warn};

use super::data_dir;
use super::notices::NoticeBoard;
use crate::controller::LibraryController;
use crate::environment::Environment;

const CONFIG_FILE: &str = "config.json";

/// Shared application services accessible from all Dioxus components via
/// `use_context::<AppServices>()`.
///
/// Cheap to clone; clones share config and notices.
#[derive(Debug, Clone)]
pub struct AppServices {
    data_dir: PathBuf,
    config: Arc<Mutex<AppConfig>>,
    notices: NoticeBoard,
}

impl AppServices {
    /// Initialise services in the platform data directory. Call once at
    /// app startup.
    pub fn init() -> Result<Self> {
        Self::init_in(data_dir::data_dir()?)
    }

    /// Initialise services rooted at `dir`.
    pub fn init_in(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        info!(path = %dir.display(), "initialising app services");

        let config = load_config(&dir).unwrap_or_default();

        Ok(Self {
            data_dir: dir,
            config: Arc::new(Mutex::new(config)),
            notices: NoticeBoard::new(),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    // -- Config ----------------------------------------------------------------

    /// Snapshot of the current config.
    pub fn config(&self) -> AppConfig {
        self.lock_config().clone()
    }

    /// Update and persist the config.
    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        *self.lock_config() = config.clone();
        persist_config(&self.data_dir, config)
    }

    fn lock_config(&self) -> MutexGuard<'_, AppConfig> {
        self.config.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -- Library ---------------------------------------------------------------

    /// Notices raised by the controller, waiting for the UI.
    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    /// Where scanned documents are kept under the current config.
    pub fn documents_dir(&self) -> PathBuf {
        data_dir::documents_dir(&self.data_dir, self.config().documents_dir.as_deref())
    }

    /// Build a controller over the documents directory, reporting through
    /// the shared notice board.
    pub fn library_controller(&self, platform: Arc<dyn PlatformBridge>) -> Result<LibraryController> {
        let config = self.config();
        let environment = Environment::new(self.documents_dir(), Arc::new(self.notices.clone()));
        LibraryController::new(environment, platform, build_extractor(&config), &config)
    }
}

/// The extraction pipeline for `config`: embedded-image rendering plus the
/// best recognizer this build has.
pub fn build_extractor(config: &AppConfig) -> TextExtractor {
    TextExtractor::new(Arc::new(EmbeddedImageRenderer), recognizer())
        .with_concurrency(config.page_concurrency())
}

#[cfg(feature = "ocr")]
fn recognizer() -> Arc<dyn TextRecognizer> {
    match scanshelf_document::OcrEngine::with_defaults() {
        Ok(engine) => Arc::new(engine),
        Err(err) => {
            warn!(%err, "OCR models unavailable, text extraction disabled");
            Arc::new(UnavailableRecognizer)
        }
    }
}

#[cfg(not(feature = "ocr"))]
fn recognizer() -> Arc<dyn TextRecognizer> {
    warn!("built without OCR support, text extraction disabled");
    Arc::new(UnavailableRecognizer)
}

fn load_config(data_dir: &Path) -> Option<AppConfig> {
    let path = data_dir.join(CONFIG_FILE);
    let data = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&data) {
        Ok(config) => Some(config),
        Err(err) => {
            warn!(%err, path = %path.display(), "ignoring unreadable config");
            None
        }
    }
}

fn persist_config(data_dir: &Path, config: &AppConfig) -> Result<()> {
    let path = data_dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(())
}
