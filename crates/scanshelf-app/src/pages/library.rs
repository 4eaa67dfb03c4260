// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Library page — the document list with scan, extract, rename, and delete.
//
// All state lives in the `LibraryController`; this page only renders it and
// forwards clicks. Long-running work uses the controller's begin/complete
// pairs so the write lock is never held across an await.

use std::sync::Arc;
use std::time::Duration;

use dioxus::prelude::*;

use scanshelf_app::services::desktop_scanner::DesktopPlatform;
use scanshelf_app::{AppServices, LibraryController, LibraryState};
use scanshelf_core::human_errors::humanize_error;
use scanshelf_core::types::{Notice, NoticeKind, ScannedDocument};

const NOTICE_POLL: Duration = Duration::from_millis(200);

#[component]
pub fn Library() -> Element {
    let svc = use_context::<AppServices>();
    let controller = use_hook(|| {
        svc.library_controller(Arc::new(DesktopPlatform))
            .map(Signal::new)
            .map_err(|err| humanize_error(&err).message)
    });

    match controller {
        Ok(controller) => rsx! { LibraryView { controller } },
        Err(message) => rsx! {
            div {
                h1 { "Documents" }
                p { style: "color: #c00;", "{message}" }
            }
        },
    }
}

#[component]
fn LibraryView(mut controller: Signal<LibraryController>) -> Element {
    let svc = use_context::<AppServices>();
    let mut toast = use_signal(|| Option::<Notice>::None);

    // Notices are posted from wherever the controller runs; pick up the
    // newest one for the toast.
    let notices = svc.notices().clone();
    use_future(move || {
        let notices = notices.clone();
        async move {
            loop {
                if let Some(notice) = notices.take_latest() {
                    toast.set(Some(notice));
                }
                tokio::time::sleep(NOTICE_POLL).await;
            }
        }
    });

    let state = controller.read().state().clone();
    let idle = state.is_idle();
    let documents = controller.read().documents().to_vec();

    let status = match &state {
        LibraryState::Capturing => Some("Waiting for the scanner...".to_string()),
        LibraryState::Extracting { document } => {
            Some(format!("Reading text from {}...", document.display_name()))
        }
        _ => None,
    };
    let status_bar = match status {
        Some(status) => rsx! {
            div { style: "display: flex; justify-content: space-between; align-items: center; padding: 8px 12px; background: #f0f4ff; border-radius: 8px;",
                span { "{status}" }
                button {
                    style: "padding: 6px 12px; border-radius: 6px; border: 1px solid #ccc; background: white;",
                    onclick: move |_| {
                        controller.write().cancel();
                    },
                    "Cancel"
                }
            }
        },
        None => rsx! {},
    };

    let dialog = match state {
        LibraryState::ConfirmingRename { proposed_name, .. } => rsx! {
            Dialog { title: "Rename document",
                input {
                    style: "width: 100%; padding: 8px; font-size: 16px; box-sizing: border-box;",
                    value: "{proposed_name}",
                    oninput: move |evt| {
                        let _ = controller.write().edit_proposed_name(evt.value());
                    },
                }
                DialogButtons { controller, confirm_label: "Rename" }
            }
        },
        LibraryState::ConfirmingDelete { document } => {
            let name = document.display_name().to_string();
            rsx! {
                Dialog { title: "Delete document",
                    p { "Delete \"{name}\"? This cannot be undone." }
                    DialogButtons { controller, confirm_label: "Delete" }
                }
            }
        }
        _ => rsx! {},
    };

    let extraction = controller.read().extraction().cloned();
    let extraction_panel = match extraction {
        Some(view) => {
            let title = view.document.display_name().to_string();
            let body = match &view.outcome {
                Ok(text) => {
                    let plain = text.to_plain_text();
                    let pages = text.page_count();
                    rsx! {
                        p { style: "color: #666;", "{pages} page(s)" }
                        textarea {
                            style: "width: 100%; min-height: 240px; font-family: monospace; box-sizing: border-box;",
                            readonly: true,
                            value: "{plain}",
                        }
                        button {
                            style: "padding: 10px 16px; border-radius: 8px; border: none; background: #007aff; color: white;",
                            onclick: move |_| {
                                controller.read().export_extraction();
                            },
                            "Export as text"
                        }
                    }
                }
                Err(message) => rsx! {
                    p { style: "color: #c00;", "{message}" }
                },
            };
            rsx! {
                section { style: "margin-top: 24px; padding: 16px; border: 1px solid #e0e0e0; border-radius: 12px;",
                    div { style: "display: flex; justify-content: space-between; align-items: center;",
                        h2 { style: "margin: 0;", "Text of {title}" }
                        button {
                            style: "border: none; background: none; font-size: 18px;",
                            onclick: move |_| controller.write().dismiss_extraction(),
                            "\u{2715}"
                        }
                    }
                    {body}
                }
            }
        }
        None => rsx! {},
    };

    let toast_view = match toast() {
        Some(notice) => {
            let background = match notice.kind {
                NoticeKind::Error => "#c62828",
                NoticeKind::Success => "#2e7d32",
                NoticeKind::Info => "#333",
            };
            let detail = notice.detail.clone().unwrap_or_default();
            // Announced notices are read out by screen readers.
            let role = if notice.announce { "alert" } else { "status" };
            rsx! {
                div {
                    style: "position: fixed; left: 16px; right: 16px; bottom: 16px; padding: 12px 16px; border-radius: 8px; color: white; background: {background}; display: flex; justify-content: space-between; align-items: center;",
                    role,
                    div {
                        strong { "{notice.message}" }
                        if !detail.is_empty() {
                            div { style: "font-size: 13px; opacity: 0.9;", "{detail}" }
                        }
                    }
                    button {
                        style: "border: none; background: none; color: white; font-size: 16px;",
                        onclick: move |_| toast.set(None),
                        "Dismiss"
                    }
                }
            }
        }
        None => rsx! {},
    };

    rsx! {
        div {
            h1 { "Documents" }

            button {
                style: "width: 100%; padding: 16px; border-radius: 12px; border: 2px dashed #007aff; color: #007aff; background: white; font-size: 16px; margin: 16px 0;",
                disabled: !idle,
                onclick: move |_| {
                    spawn(async move {
                        let pending = controller.write().begin_scan();
                        let Ok(pending) = pending else { return };
                        let completed = pending.wait().await;
                        let _ = controller.write().complete_scan(completed);
                    });
                },
                "\u{1F4C4} Scan document"
            }

            {status_bar}

            if documents.is_empty() {
                p { style: "text-align: center; color: #aaa; margin: 48px 0;",
                    "No documents yet. Scan one to get started."
                }
            } else {
                for document in documents {
                    DocumentRow { key: "{document.file_name}", controller, document: document.clone(), idle }
                }
            }

            {extraction_panel}
            {dialog}
            {toast_view}
        }
    }
}

#[component]
fn DocumentRow(mut controller: Signal<LibraryController>, document: ScannedDocument, idle: bool) -> Element {
    let name = document.display_name().to_string();
    let modified = document.modified.format("%Y-%m-%d %H:%M").to_string();
    let size_kb = document.size_bytes / 1024;

    // Rendered once per row; rows are keyed by file name, so a rename remounts.
    let thumbnail = use_hook({
        let document = document.clone();
        move || controller.read().preview_data_uri(&document)
    });
    let thumbnail_view = match thumbnail {
        Some(uri) => rsx! {
            img {
                style: "width: 56px; height: 72px; object-fit: cover; border: 1px solid #ddd; border-radius: 4px; background: #fafafa;",
                src: "{uri}",
                alt: "First page of {name}",
            }
        },
        None => rsx! {
            div { style: "width: 56px; height: 72px; border: 1px dashed #ddd; border-radius: 4px;" }
        },
    };

    rsx! {
        div { style: "padding: 12px 0; border-bottom: 1px solid #eee;",
            div { style: "display: flex; gap: 12px; align-items: center;",
                {thumbnail_view}
                div {
                    strong { "{name}" }
                    div { style: "color: #888; font-size: 13px;", "{modified} \u{00B7} {size_kb} KB" }
                }
            }
            div { style: "display: flex; gap: 8px; margin-top: 8px;",
                button {
                    disabled: !idle,
                    onclick: {
                        let document = document.clone();
                        move |_| {
                            let document = document.clone();
                            spawn(async move {
                                let pending = controller.write().begin_extract(&document);
                                let Ok(pending) = pending else { return };
                                let completed = pending.run().await;
                                controller.write().complete_extract(completed);
                            });
                        }
                    },
                    "Extract text"
                }
                button {
                    disabled: !idle,
                    onclick: {
                        let document = document.clone();
                        move |_| {
                            let _ = controller.read().open(&document);
                        }
                    },
                    "Open"
                }
                button {
                    disabled: !idle,
                    onclick: {
                        let document = document.clone();
                        move |_| {
                            let _ = controller.read().share(&document);
                        }
                    },
                    "Share"
                }
                button {
                    disabled: !idle,
                    onclick: {
                        let document = document.clone();
                        move |_| {
                            let _ = controller.write().request_rename(&document);
                        }
                    },
                    "Rename"
                }
                button {
                    style: "color: #c00;",
                    disabled: !idle,
                    onclick: {
                        let document = document.clone();
                        move |_| {
                            let _ = controller.write().request_delete(&document);
                        }
                    },
                    "Delete"
                }
            }
        }
    }
}

#[component]
fn Dialog(title: &'static str, children: Element) -> Element {
    rsx! {
        div { style: "position: fixed; inset: 0; background: rgba(0, 0, 0, 0.4); display: flex; align-items: center; justify-content: center;",
            div { style: "background: white; border-radius: 12px; padding: 20px; width: 320px;",
                h2 { style: "margin-top: 0;", "{title}" }
                {children}
            }
        }
    }
}

#[component]
fn DialogButtons(mut controller: Signal<LibraryController>, confirm_label: &'static str) -> Element {
    rsx! {
        div { style: "display: flex; justify-content: flex-end; gap: 8px; margin-top: 16px;",
            button {
                onclick: move |_| {
                    controller.write().cancel();
                },
                "Cancel"
            }
            button {
                style: "background: #007aff; color: white; border: none; border-radius: 6px; padding: 6px 14px;",
                onclick: move |_| {
                    let _ = controller.write().confirm();
                },
                "{confirm_label}"
            }
        }
    }
}
