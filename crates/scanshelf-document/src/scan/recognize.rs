// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text recognizer seam.

use image::DynamicImage;
use scanshelf_core::error::{Result, ScanshelfError};
use tracing::warn;

/// Recognizes the text in one rendered page.
///
/// Called from blocking worker threads, possibly for several pages at once.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &DynamicImage) -> Result<String>;
}

/// Stand-in used when no recognition engine is available on this build or
/// device. Every call fails with [`ScanshelfError::PlatformUnavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableRecognizer;

impl TextRecognizer for UnavailableRecognizer {
    fn recognize(&self, _image: &DynamicImage) -> Result<String> {
        warn!("text recognition requested but no engine is available");
        Err(ScanshelfError::PlatformUnavailable)
    }
}

#[cfg(feature = "ocr")]
impl TextRecognizer for super::ocr::OcrEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<String> {
        self.recognize_text(image)
    }
}
