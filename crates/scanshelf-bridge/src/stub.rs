// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub bridge for builds where no native scanner, share sheet, or viewer is
// wired up. Every capability returns `PlatformUnavailable`; notices go to
// the log.

use std::path::Path;

use scanshelf_core::error::{Result, ScanshelfError};
use scanshelf_core::types::{Notice, NoticeKind, ScannerOptions};

use crate::traits::*;

/// No-op bridge returned on platforms without native integrations.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubBridge;

impl PlatformBridge for StubBridge {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }
}

impl NativeDocumentScanner for StubBridge {
    fn start_capture(&self, _options: &ScannerOptions) -> Result<PendingCapture> {
        tracing::warn!("NativeDocumentScanner::start_capture called on stub bridge");
        Err(ScanshelfError::PlatformUnavailable)
    }
}

impl NativeShare for StubBridge {
    fn share_file(&self, path: &Path, _mime_type: &str) -> Result<()> {
        tracing::warn!(path = %path.display(), "NativeShare::share_file called on stub bridge");
        Err(ScanshelfError::PlatformUnavailable)
    }
}

impl NativeViewer for StubBridge {
    fn open_file(&self, path: &Path, _mime_type: &str) -> Result<()> {
        tracing::warn!(path = %path.display(), "NativeViewer::open_file called on stub bridge");
        Err(ScanshelfError::PlatformUnavailable)
    }
}

/// Writes notices to the log instead of the screen.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: &Notice) {
        let detail = notice.detail.as_deref().unwrap_or_default();
        match notice.kind {
            NoticeKind::Error => tracing::warn!(text = %notice.message, detail, "notice"),
            NoticeKind::Success | NoticeKind::Info => {
                tracing::info!(text = %notice.message, detail, announce = notice.announce, "notice")
            }
        }
    }
}
