// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scanshelf.

use thiserror::Error;

/// Top-level error type for all Scanshelf operations.
#[derive(Debug, Error)]
pub enum ScanshelfError {
    // -- Capture --
    /// The user backed out of the capture flow. Not a failure.
    #[error("scan cancelled")]
    CaptureCancelled,

    #[error("scan failed: {0}")]
    CaptureFailed(String),

    // -- Document store --
    #[error("could not save scanned document: {0}")]
    PersistFailed(#[source] std::io::Error),

    #[error("a document named {0} already exists")]
    NameConflict(String),

    #[error("invalid document name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("rename failed: {0}")]
    RenameFailed(#[source] std::io::Error),

    #[error("document not found: {0}")]
    NotFound(String),

    #[error("delete failed: {0}")]
    DeleteFailed(#[source] std::io::Error),

    // -- Extraction --
    #[error("text extraction failed on page {page_index}: {message}")]
    ExtractionFailed { page_index: usize, message: String },

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("OCR failed: {0}")]
    OcrError(String),

    #[error("could not write extracted text: {0}")]
    ExportFailed(#[source] std::io::Error),

    // -- Controller --
    #[error("another action is in progress ({state})")]
    Busy { state: &'static str },

    #[error("no rename or delete is awaiting confirmation")]
    NoPendingAction,

    #[error("operation cancelled")]
    Cancelled,

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanshelfError>;
