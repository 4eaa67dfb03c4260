// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanshelf-app — the library screen's controller and service layer.
//
// The Dioxus front end lives in the `scanshelf` binary (feature `desktop`);
// everything it drives is here so it can be tested headless.

pub mod controller;
pub mod environment;
pub mod services;

pub use controller::{Confirmed, ExtractionView, LibraryController, LibraryState};
pub use environment::Environment;
pub use services::app_services::AppServices;
pub use services::notices::NoticeBoard;

/// Install the global tracing subscriber: `RUST_LOG` if set, else `info`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
