// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for native capabilities.
//
// The library only needs four things from the host platform: a document
// scanner flow, a share sheet, a viewer, and a way to surface notices.
// Platforms that lack one return `ScanshelfError::PlatformUnavailable`.

use std::path::Path;

use scanshelf_core::error::Result;
use scanshelf_core::types::{CaptureResult, Notice, ScannerOptions};
use tokio::sync::oneshot;

/// Unified bridge that groups all native capabilities.
pub trait PlatformBridge: NativeDocumentScanner + NativeShare + NativeViewer {
    /// Human-readable platform name (e.g. "Android 14", "Desktop").
    fn platform_name(&self) -> &str;
}

/// Launch the platform's document scanner flow.
pub trait NativeDocumentScanner: Send + Sync {
    /// Present the scanner UI. Returns as soon as the flow is on screen; the
    /// outcome arrives later through the returned [`PendingCapture`].
    ///
    /// An `Err` means the flow could not be started at all.
    fn start_capture(&self, options: &ScannerOptions) -> Result<PendingCapture>;
}

/// Share content via the OS share sheet.
pub trait NativeShare: Send + Sync {
    /// Offer the file at `path` to other apps.
    fn share_file(&self, path: &Path, mime_type: &str) -> Result<()>;
}

/// Open files in the platform's default viewer.
pub trait NativeViewer: Send + Sync {
    fn open_file(&self, path: &Path, mime_type: &str) -> Result<()>;
}

/// Surface one-shot, dismissible notices (snackbar, toast, screen reader).
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice);
}

// ---------------------------------------------------------------------------
// Capture continuation
// ---------------------------------------------------------------------------

/// The outcome of a scanner flow that has been started but not finished.
#[derive(Debug)]
pub struct PendingCapture {
    receiver: oneshot::Receiver<CaptureResult>,
}

/// Handed to the platform side to deliver the scanner flow's outcome.
#[derive(Debug)]
pub struct CaptureCompleter {
    sender: oneshot::Sender<CaptureResult>,
}

impl PendingCapture {
    /// A linked completer / pending pair.
    pub fn channel() -> (CaptureCompleter, PendingCapture) {
        let (sender, receiver) = oneshot::channel();
        (CaptureCompleter { sender }, PendingCapture { receiver })
    }

    /// A capture whose outcome is already known.
    pub fn ready(result: CaptureResult) -> Self {
        let (completer, pending) = Self::channel();
        completer.complete(result);
        pending
    }

    /// Wait for the flow to finish. A flow torn down without reporting
    /// counts as a failure.
    pub async fn wait(self) -> CaptureResult {
        self.receiver.await.unwrap_or_else(|_| {
            CaptureResult::Failed("capture flow ended without a result".into())
        })
    }
}

impl CaptureCompleter {
    /// Deliver the outcome. Silently dropped if nobody is waiting any more
    /// (the capture was cancelled on the library side).
    pub fn complete(self, result: CaptureResult) {
        if self.sender.send(result).is_err() {
            tracing::debug!("capture completed after the waiter went away");
        }
    }
}
