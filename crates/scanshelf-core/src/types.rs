// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Scanshelf document library.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// File extension of every document the store manages.
pub const PDF_EXTENSION: &str = "pdf";

/// MIME type handed to viewers and share sheets.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Identifier for one asynchronous operation (a capture or an extraction).
///
/// Completions carry the id they were started with so that a result arriving
/// after the user aborted the operation can be recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationId(pub Uuid);

impl OperationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A PDF held in the store directory.
///
/// The file name is the identity. A rename produces a new value; any copy
/// holding the old name is stale until the list is refreshed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedDocument {
    /// File name inside the store directory, including the `.pdf` extension.
    pub file_name: String,
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Last-modified time reported by the filesystem.
    pub modified: DateTime<Utc>,
    /// File size in bytes.
    pub size_bytes: u64,
}

impl ScannedDocument {
    /// Name shown to the user: the file name without its `.pdf` extension.
    pub fn display_name(&self) -> &str {
        strip_pdf_extension(&self.file_name)
    }
}

/// Remove a trailing `.pdf` (any case) from `name`, if present.
pub fn strip_pdf_extension(name: &str) -> &str {
    let split = name.len().saturating_sub(PDF_EXTENSION.len() + 1);
    if split == 0 || !name.is_char_boundary(split) {
        return name;
    }
    let (stem, ext) = name.split_at(split);
    match ext.strip_prefix('.') {
        Some(ext) if ext.eq_ignore_ascii_case(PDF_EXTENSION) => stem,
        _ => name,
    }
}

/// Documents sorted newest first, as last read from disk.
pub type DocumentList = Vec<ScannedDocument>;

/// Outcome of one capture flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureResult {
    /// The scanner produced a PDF.
    Success(Vec<u8>),
    /// The user left the capture flow without producing anything.
    Cancelled,
    /// The scanner reported an error.
    Failed(String),
}

/// Output formats a capture flow can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultFormat {
    Pdf,
    Jpeg,
}

/// How much of the platform scanner UI is offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScannerMode {
    /// Basic capture with crop and rotate only.
    Base,
    /// Basic capture plus image filters.
    BaseWithFilter,
    /// Everything the platform offers, including automatic cleanup.
    Full,
}

/// Capture configuration handed to the scan service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerOptions {
    /// Maximum number of pages per capture.
    pub page_limit: u32,
    /// Formats requested from the scanner. PDF is always required.
    pub result_formats: Vec<ResultFormat>,
    pub mode: ScannerMode,
    /// Whether the user may import photos from the gallery.
    pub gallery_import: bool,
}

impl ScannerOptions {
    /// Whether the options request PDF output.
    pub fn produces_pdf(&self) -> bool {
        self.result_formats.contains(&ResultFormat::Pdf)
    }
}

impl Default for ScannerOptions {
    fn default() -> Self {
        Self {
            page_limit: 5,
            result_formats: vec![ResultFormat::Jpeg, ResultFormat::Pdf],
            mode: ScannerMode::Full,
            gallery_import: true,
        }
    }
}

/// Text recognised on one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    /// Zero-based page index.
    pub page_index: usize,
    /// Recognised text; empty for a blank page.
    pub text: String,
}

/// Text recognised across a whole document, in page order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedText {
    pub pages: Vec<PageText>,
}

impl ExtractedText {
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All pages joined with a blank line between them.
    pub fn to_plain_text(&self) -> String {
        self.pages
            .iter()
            .map(|page| page.text.trim_end())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// How the user should perceive a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeKind {
    Success,
    Info,
    Error,
}

/// A one-shot, dismissible message for the user (toast / snackbar).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    /// Short headline.
    pub message: String,
    /// Optional second line (what to try next).
    pub detail: Option<String>,
    /// Also speak the message through the platform screen reader.
    pub announce: bool,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
            detail: None,
            announce: false,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
            detail: None,
            announce: false,
        }
    }

    pub fn error(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
            detail: Some(detail.into()),
            announce: false,
        }
    }

    pub fn announced(mut self) -> Self {
        self.announce = true;
        self
    }
}
