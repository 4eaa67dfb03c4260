// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ScannerOptions;

/// What happens when exported text would land on an existing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportPolicy {
    /// Replace the previous export.
    Overwrite,
    /// Keep the previous export and pick `name_1.txt`, `name_2.txt`, ...
    Uniquify,
}

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Options handed to the platform scanner for every capture.
    pub scanner: ScannerOptions,
    /// Overrides the directory scanned documents are stored in.
    pub documents_dir: Option<PathBuf>,
    /// File name extracted text is exported to, inside the documents directory.
    pub export_file_name: String,
    pub export_policy: ExportPolicy,
    /// Upper bound on pages rendered and recognised at the same time.
    pub max_concurrent_pages: usize,
    /// Speak one-shot notices (e.g. "Scan completed") via the screen reader.
    pub announce_completions: bool,
    /// Longest edge of list thumbnails, in pixels.
    pub preview_max_dimension: u32,
}

impl AppConfig {
    /// `max_concurrent_pages`, never below one.
    pub fn page_concurrency(&self) -> usize {
        self.max_concurrent_pages.max(1)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scanner: ScannerOptions::default(),
            documents_dir: None,
            export_file_name: "extracted_text.txt".into(),
            export_policy: ExportPolicy::Overwrite,
            max_concurrent_pages: 2,
            announce_completions: true,
            preview_max_dimension: 240,
        }
    }
}
