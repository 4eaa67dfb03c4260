// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every failure a user can run into is mapped to plain English with a clear
// suggestion, and from there into a dismissible `Notice`. Nothing is retried
// automatically; `retriable` only tells the UI whether offering "Try again"
// makes sense.

use crate::error::ScanshelfError;
use crate::types::{Notice, NoticeKind};

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Not really a failure (the user backed out).
    Benign,
    /// Likely to work if the user simply tries again.
    Transient,
    /// The user must change something first (pick another name, free space).
    ActionRequired,
    /// Cannot be fixed by retrying — damaged file, missing platform feature.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether offering "Try again" makes sense.
    pub retriable: bool,
    pub severity: Severity,
}

impl HumanError {
    fn new(message: &str, suggestion: impl Into<String>, retriable: bool, severity: Severity) -> Self {
        Self {
            message: message.into(),
            suggestion: suggestion.into(),
            retriable,
            severity,
        }
    }
}

impl From<HumanError> for Notice {
    fn from(human: HumanError) -> Self {
        let kind = match human.severity {
            Severity::Benign => NoticeKind::Info,
            _ => NoticeKind::Error,
        };
        Notice {
            kind,
            message: human.message,
            detail: Some(human.suggestion),
            announce: false,
        }
    }
}

/// Build the notice shown when `err` ends an operation.
pub fn notice_for(err: &ScanshelfError) -> Notice {
    humanize_error(err).into()
}

/// Convert a `ScanshelfError` into a `HumanError` anyone can understand.
pub fn humanize_error(err: &ScanshelfError) -> HumanError {
    use Severity::*;

    match err {
        // -- Capture --
        ScanshelfError::CaptureCancelled | ScanshelfError::Cancelled => HumanError::new(
            "Cancelled.",
            "Nothing was changed.",
            false,
            Benign,
        ),

        ScanshelfError::CaptureFailed(detail) => HumanError::new(
            "The scan didn't work.",
            format!("Try scanning again, holding the page flat and well lit. ({detail})"),
            true,
            Transient,
        ),

        // -- Document store --
        ScanshelfError::PersistFailed(io_err) => HumanError::new(
            "The scan couldn't be saved.",
            storage_suggestion(io_err),
            true,
            ActionRequired,
        ),

        ScanshelfError::NameConflict(name) => HumanError::new(
            "Rename failed.",
            format!("A document called \"{name}\" already exists. Pick a different name."),
            false,
            ActionRequired,
        ),

        ScanshelfError::InvalidName { reason, .. } => HumanError::new(
            "That name can't be used.",
            format!("The name {reason}. Try a simpler name."),
            false,
            ActionRequired,
        ),

        ScanshelfError::RenameFailed(io_err) => HumanError::new(
            "Rename failed.",
            storage_suggestion(io_err),
            true,
            Transient,
        ),

        ScanshelfError::NotFound(_) => HumanError::new(
            "That document is no longer there.",
            "It may already have been deleted. The list has been refreshed.",
            false,
            Permanent,
        ),

        ScanshelfError::DeleteFailed(io_err) => HumanError::new(
            "Delete failed.",
            storage_suggestion(io_err),
            true,
            Transient,
        ),

        // -- Extraction --
        ScanshelfError::ExtractionFailed { page_index, .. } => HumanError::new(
            "Text recognition didn't work on this document.",
            format!(
                "Page {} couldn't be read. Try scanning it again with better lighting, \
                 making sure the text is clear and in focus.",
                page_index + 1
            ),
            true,
            Transient,
        ),

        ScanshelfError::PdfError(_) => HumanError::new(
            "There's a problem with this PDF file.",
            "The file may be damaged. Try scanning the document again.",
            false,
            Permanent,
        ),

        ScanshelfError::ImageError(_) => HumanError::new(
            "A page image couldn't be read.",
            "The page may be stored in an unusual format. Try scanning the document again.",
            false,
            Permanent,
        ),

        ScanshelfError::OcrError(_) => HumanError::new(
            "Text recognition didn't work on this scan.",
            "Try scanning the document again with better lighting, making sure the text is clear and in focus.",
            true,
            Transient,
        ),

        ScanshelfError::ExportFailed(io_err) => HumanError::new(
            "The extracted text couldn't be saved.",
            storage_suggestion(io_err),
            true,
            Transient,
        ),

        // -- Controller --
        ScanshelfError::Busy { .. } => HumanError::new(
            "Please wait.",
            "Another action is still in progress.",
            true,
            Transient,
        ),

        ScanshelfError::NoPendingAction => HumanError::new(
            "Nothing to confirm.",
            "Choose a document first.",
            false,
            ActionRequired,
        ),

        // -- Storage --
        ScanshelfError::Io(io_err) => HumanError::new(
            "There was a problem reading or writing a file.",
            storage_suggestion(io_err),
            true,
            Transient,
        ),

        ScanshelfError::Serialization(_) => HumanError::new(
            "The app had an internal data problem.",
            "Try again. If this keeps happening, please report it.",
            true,
            Transient,
        ),

        // -- Platform --
        ScanshelfError::Bridge(_) => HumanError::new(
            "A device-specific feature didn't work.",
            "Try restarting the app. Some features may not be available on all devices.",
            true,
            Transient,
        ),

        ScanshelfError::PlatformUnavailable => HumanError::new(
            "This feature isn't available on your device.",
            "Some features require a specific type of phone or tablet.",
            false,
            Permanent,
        ),
    }
}

fn storage_suggestion(io_err: &std::io::Error) -> String {
    match io_err.kind() {
        std::io::ErrorKind::PermissionDenied => {
            "The app doesn't have permission to change its document folder.".into()
        }
        std::io::ErrorKind::NotFound => {
            "The file may have been moved or deleted. The list has been refreshed.".into()
        }
        _ => "Try again. If this keeps happening, your device's storage may be full.".into(),
    }
}
