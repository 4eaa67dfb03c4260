// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text extraction pipeline — render each page, recognize its text, and
// reassemble the results in page order.

pub mod extract;
pub mod recognize;

#[cfg(feature = "ocr")]
pub mod ocr;

pub use extract::TextExtractor;
pub use recognize::{TextRecognizer, UnavailableRecognizer};

#[cfg(feature = "ocr")]
pub use ocr::OcrEngine;
