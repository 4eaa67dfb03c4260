// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanshelf — scan, keep, and read paper documents.
//
// Entry point. Initialises logging and backend services, then launches the
// Dioxus UI.

mod pages;

use dioxus::prelude::*;

use pages::library::Library;
use scanshelf_app::AppServices;

fn main() {
    scanshelf_app::init_tracing();

    tracing::info!("Scanshelf starting");

    dioxus::launch(app);
}

/// Root component.
fn app() -> Element {
    let svc = use_hook(|| match AppServices::init() {
        Ok(svc) => Some(svc),
        Err(err) => {
            tracing::error!(error = %err, "could not initialise app services");
            None
        }
    });

    let Some(svc) = svc else {
        return rsx! {
            div { style: "padding: 32px; font-family: system-ui, -apple-system, sans-serif;",
                h1 { "Scanshelf" }
                p { "The document folder could not be opened. Check that your home directory is writable and restart." }
            }
        };
    };

    use_context_provider(|| svc.clone());

    rsx! {
        div { class: "app-container",
            style: "display: flex; flex-direction: column; height: 100vh; font-family: system-ui, -apple-system, sans-serif;",
            div { class: "page-content",
                style: "flex: 1; overflow-y: auto; padding: 16px;",
                Library {}
            }
        }
    }
}
