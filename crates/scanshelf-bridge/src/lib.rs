// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanshelf-bridge — Native platform bridge abstractions.
//
// Defines the traits the library controller talks to (scanner flow, share
// sheet, viewer, notifier) and picks the implementation for the target.

pub mod stub;
pub mod traits;

use std::sync::Arc;

pub use stub::{LogNotifier, StubBridge};
pub use traits::{
    CaptureCompleter, NativeDocumentScanner, NativeShare, NativeViewer, Notifier, PendingCapture,
    PlatformBridge,
};

/// The bridge implementation for the current target.
///
/// No native integration ships in this crate yet, so every target gets the
/// stub; front ends with their own scanner (see the desktop app) supply
/// their own `PlatformBridge` instead.
pub fn platform_bridge() -> Arc<dyn PlatformBridge> {
    Arc::new(StubBridge)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bridge_is_the_stub() {
        assert_eq!(platform_bridge().platform_name(), "Desktop (stub)");
    }
}
