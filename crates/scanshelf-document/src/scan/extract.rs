// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text extraction — turn a scanned PDF into per-page text.
//
// Pages are dispatched in ascending order to blocking workers, at most
// `max_concurrent_pages` at a time, and reassembled by index so the result
// is in page order whatever order the workers finish in.
//
// Extraction is fail-fast: once a page fails no further pages are started,
// pages already in flight are drained, and the lowest failing page index is
// reported. Partial text is never returned.

use std::io;
use std::sync::Arc;

use scanshelf_core::error::{Result, ScanshelfError};
use scanshelf_core::types::{ExtractedText, PageText, ScannedDocument};
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use crate::cancel::CancelFlag;
use crate::render::PageRenderer;
use crate::scan::recognize::TextRecognizer;

const DEFAULT_CONCURRENT_PAGES: usize = 2;

/// Outcome of one page: its index and either the text or a failure message.
type PageOutcome = (usize, std::result::Result<String, String>);

/// Renders and recognizes every page of a document.
#[derive(Clone)]
pub struct TextExtractor {
    renderer: Arc<dyn PageRenderer>,
    recognizer: Arc<dyn TextRecognizer>,
    max_concurrent_pages: usize,
}

impl TextExtractor {
    pub fn new(renderer: Arc<dyn PageRenderer>, recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self {
            renderer,
            recognizer,
            max_concurrent_pages: DEFAULT_CONCURRENT_PAGES,
        }
    }

    /// Bound the number of pages processed at once (at least one).
    pub fn with_concurrency(mut self, max_concurrent_pages: usize) -> Self {
        self.max_concurrent_pages = max_concurrent_pages.max(1);
        self
    }

    pub fn max_concurrent_pages(&self) -> usize {
        self.max_concurrent_pages
    }

    /// The renderer pages are rasterized with (also used for previews).
    pub fn renderer(&self) -> &Arc<dyn PageRenderer> {
        &self.renderer
    }

    /// Extract the text of a stored document.
    #[instrument(skip_all, fields(file = %document.file_name))]
    pub async fn extract(
        &self,
        document: &ScannedDocument,
        cancel: &CancelFlag,
    ) -> Result<ExtractedText> {
        let bytes = tokio::fs::read(&document.path).await.map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                ScanshelfError::NotFound(document.file_name.clone())
            } else {
                ScanshelfError::Io(err)
            }
        })?;
        self.extract_bytes(Arc::from(bytes), cancel).await
    }

    /// Extract the text of an in-memory PDF.
    pub async fn extract_bytes(&self, pdf: Arc<[u8]>, cancel: &CancelFlag) -> Result<ExtractedText> {
        let page_count = self.count_pages(Arc::clone(&pdf), cancel).await?;
        if page_count == 0 {
            info!("document has no pages");
            return Ok(ExtractedText::default());
        }
        info!(page_count, limit = self.max_concurrent_pages, "extracting text");

        let mut texts: Vec<Option<String>> = vec![None; page_count];
        let mut failure: Option<(usize, String)> = None;
        let mut next_page = 0;
        let mut in_flight: JoinSet<PageOutcome> = JoinSet::new();

        loop {
            while failure.is_none()
                && next_page < page_count
                && in_flight.len() < self.max_concurrent_pages
            {
                in_flight.spawn(Self::process_page(
                    Arc::clone(&self.renderer),
                    Arc::clone(&self.recognizer),
                    Arc::clone(&pdf),
                    next_page,
                ));
                next_page += 1;
            }

            let joined = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    in_flight.abort_all();
                    info!("extraction cancelled");
                    return Err(ScanshelfError::Cancelled);
                }
                joined = in_flight.join_next() => joined,
            };

            match joined {
                None => break,
                Some(Ok((page_index, Ok(text)))) => {
                    debug!(page_index, chars = text.len(), "page recognized");
                    texts[page_index] = Some(text);
                }
                Some(Ok((page_index, Err(message)))) => {
                    warn!(page_index, %message, "page failed");
                    if failure.as_ref().is_none_or(|(lowest, _)| page_index < *lowest) {
                        failure = Some((page_index, message));
                    }
                }
                // Only reachable if the runtime tears the task down; the
                // missing page is reported below.
                Some(Err(err)) => warn!(%err, "page task ended abnormally"),
            }
        }

        if let Some((page_index, message)) = failure {
            return Err(ScanshelfError::ExtractionFailed { page_index, message });
        }

        let mut pages = Vec::with_capacity(page_count);
        for (page_index, text) in texts.into_iter().enumerate() {
            let text = text.ok_or_else(|| ScanshelfError::ExtractionFailed {
                page_index,
                message: "page produced no result".into(),
            })?;
            pages.push(PageText { page_index, text });
        }

        info!(page_count, "extraction complete");
        Ok(ExtractedText { pages })
    }

    async fn count_pages(&self, pdf: Arc<[u8]>, cancel: &CancelFlag) -> Result<usize> {
        let renderer = Arc::clone(&self.renderer);
        let counting = tokio::task::spawn_blocking(move || renderer.page_count(&pdf));

        let counted = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ScanshelfError::Cancelled),
            counted = counting => counted,
        };

        // A document that cannot be opened fails like its first page would.
        match counted {
            Ok(Ok(count)) => Ok(count),
            Ok(Err(err)) => Err(ScanshelfError::ExtractionFailed {
                page_index: 0,
                message: err.to_string(),
            }),
            Err(err) => Err(ScanshelfError::ExtractionFailed {
                page_index: 0,
                message: format!("page count worker stopped: {err}"),
            }),
        }
    }

    /// Render then recognize one page on the blocking pool.
    async fn process_page(
        renderer: Arc<dyn PageRenderer>,
        recognizer: Arc<dyn TextRecognizer>,
        pdf: Arc<[u8]>,
        page_index: usize,
    ) -> PageOutcome {
        let work = tokio::task::spawn_blocking(move || {
            let image = renderer.render_page(&pdf, page_index)?;
            recognizer.recognize(&image)
        });

        let outcome = match work.await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(err)) => Err(err.to_string()),
            Err(err) => Err(format!("page worker stopped: {err}")),
        };
        (page_index, outcome)
    }
}
