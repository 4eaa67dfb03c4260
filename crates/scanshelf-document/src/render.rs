// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page rendering seam.
//
// Extraction and previews only need "how many pages" and "give me page N as
// pixels". The default implementation decodes the scanned image embedded in
// each page; anything able to rasterize arbitrary PDFs can be swapped in.

use image::DynamicImage;
use scanshelf_core::error::Result;
use tracing::debug;

use crate::pdf::PdfReader;

/// Turns PDF pages into images.
///
/// Implementations are called from blocking worker threads and must be
/// shareable across them.
pub trait PageRenderer: Send + Sync {
    /// Number of pages in `pdf`.
    fn page_count(&self, pdf: &[u8]) -> Result<usize>;

    /// Rasterize page `page_index` (zero-based) of `pdf`.
    fn render_page(&self, pdf: &[u8], page_index: usize) -> Result<DynamicImage>;
}

/// Renders a page by decoding the scan image it embeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedImageRenderer;

impl PageRenderer for EmbeddedImageRenderer {
    fn page_count(&self, pdf: &[u8]) -> Result<usize> {
        Ok(PdfReader::from_bytes(pdf)?.page_count())
    }

    fn render_page(&self, pdf: &[u8], page_index: usize) -> Result<DynamicImage> {
        PdfReader::from_bytes(pdf)?.page_raster(page_index)
    }
}

/// Render the first page of `pdf` scaled to fit within `max_dimension`.
///
/// Returns `None` when the page cannot be rendered; a missing thumbnail is
/// not worth surfacing to the user.
pub fn render_preview(
    renderer: &dyn PageRenderer,
    pdf: &[u8],
    max_dimension: u32,
) -> Option<DynamicImage> {
    match renderer.render_page(pdf, 0) {
        Ok(page) => Some(page.thumbnail(max_dimension.max(1), max_dimension.max(1))),
        Err(err) => {
            debug!(%err, "no preview for document");
            None
        }
    }
}
