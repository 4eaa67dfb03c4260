// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanshelf-document — Document handling for the Scanshelf library.
//
// Provides the on-disk document store (list, persist, rename, delete, text
// export), page rasterization of scanned PDFs, the text recognizer seam, and
// the page-ordered text extraction pipeline.

mod atomic;
pub mod cancel;
pub mod export;
pub mod pdf;
pub mod render;
pub mod scan;
pub mod store;

// Re-export the primary structs so callers can use `scanshelf_document::DocumentStore` etc.
pub use cancel::CancelFlag;
pub use pdf::reader::PdfReader;
pub use render::{EmbeddedImageRenderer, PageRenderer};
pub use scan::extract::TextExtractor;
pub use scan::recognize::{TextRecognizer, UnavailableRecognizer};
pub use store::DocumentStore;

#[cfg(feature = "ocr")]
pub use scan::ocr::OcrEngine;
