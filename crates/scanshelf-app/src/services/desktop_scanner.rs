// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Desktop platform: a native file picker stands in for the camera scanner.
//
// "Scanning" imports an existing PDF. Dismissing the picker is a cancel;
// share and open are not wired up on desktop and defer to the stub bridge.

use std::path::{Path, PathBuf};

use scanshelf_bridge::{
    CaptureCompleter, NativeDocumentScanner, NativeShare, NativeViewer, PendingCapture,
    PlatformBridge, StubBridge,
};
use scanshelf_core::error::{Result, ScanshelfError};
use scanshelf_core::types::{CaptureResult, ScannerOptions};
use tracing::{info, warn};

/// Bridge used by the desktop build.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopPlatform;

impl PlatformBridge for DesktopPlatform {
    fn platform_name(&self) -> &str {
        "Desktop"
    }
}

impl NativeDocumentScanner for DesktopPlatform {
    fn start_capture(&self, options: &ScannerOptions) -> Result<PendingCapture> {
        if !options.produces_pdf() {
            return Err(ScanshelfError::Bridge(
                "the desktop scanner only imports PDF documents".into(),
            ));
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|err| ScanshelfError::Bridge(format!("no async runtime: {err}")))?;

        let (completer, pending) = PendingCapture::channel();
        runtime.spawn_blocking(move || pick_document(completer));
        Ok(pending)
    }
}

impl NativeShare for DesktopPlatform {
    fn share_file(&self, path: &Path, mime_type: &str) -> Result<()> {
        StubBridge.share_file(path, mime_type)
    }
}

impl NativeViewer for DesktopPlatform {
    fn open_file(&self, path: &Path, mime_type: &str) -> Result<()> {
        StubBridge.open_file(path, mime_type)
    }
}

fn pick_document(completer: CaptureCompleter) {
    let picked = rfd::FileDialog::new()
        .set_title("Import scanned document")
        .add_filter("PDF", &["pdf"])
        .pick_file();
    completer.complete(read_picked(picked));
}

/// Turn the picker's answer into a capture outcome.
fn read_picked(picked: Option<PathBuf>) -> CaptureResult {
    let Some(path) = picked else {
        return CaptureResult::Cancelled;
    };
    match std::fs::read(&path) {
        Ok(bytes) if bytes.is_empty() => {
            warn!(path = %path.display(), "picked document is empty");
            CaptureResult::Failed(format!("{} is empty", path.display()))
        }
        Ok(bytes) => {
            info!(path = %path.display(), bytes = bytes.len(), "document imported");
            CaptureResult::Success(bytes)
        }
        Err(err) => {
            warn!(path = %path.display(), %err, "picked document unreadable");
            CaptureResult::Failed(err.to_string())
        }
    }
}
