// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain-text export of extracted text.

use std::path::{Path, PathBuf};

use scanshelf_core::config::ExportPolicy;
use scanshelf_core::error::{Result, ScanshelfError};
use tracing::{info, instrument};

use crate::atomic::{Placement, place_atomically};
use crate::store::DocumentStore;

/// Suffixed names tried under [`ExportPolicy::Uniquify`].
const MAX_EXPORT_ATTEMPTS: u32 = 1000;

/// Write `text` as UTF-8 into `dir/file_name`, returning the path written.
///
/// The file appears atomically. Under [`ExportPolicy::Uniquify`] an existing
/// file is left alone and `stem_1.ext`, `stem_2.ext`, ... is used instead.
#[instrument(skip(dir, text), fields(bytes = text.len()))]
pub fn export_text(
    dir: &Path,
    file_name: &str,
    text: &str,
    policy: ExportPolicy,
) -> Result<PathBuf> {
    validate_export_name(file_name)?;

    let placed = match policy {
        ExportPolicy::Overwrite => place_atomically(
            dir,
            text.as_bytes(),
            [file_name.to_string()],
            Placement::Replace,
        ),
        ExportPolicy::Uniquify => {
            let (stem, ext) = split_extension(file_name);
            let candidates = (0..MAX_EXPORT_ATTEMPTS).map(|n| match (n, ext) {
                (0, _) => file_name.to_string(),
                (n, Some(ext)) => format!("{stem}_{n}.{ext}"),
                (n, None) => format!("{stem}_{n}"),
            });
            place_atomically(dir, text.as_bytes(), candidates, Placement::NoClobber)
        }
    }
    .map_err(ScanshelfError::ExportFailed)?;

    info!(path = %placed.display(), "text exported");
    Ok(placed)
}

impl DocumentStore {
    /// Export `text` next to the documents. The export file does not show up
    /// in [`list`](Self::list) unless it is named like a PDF.
    pub fn export_text(&self, file_name: &str, text: &str, policy: ExportPolicy) -> Result<PathBuf> {
        export_text(self.dir(), file_name, text, policy)
    }
}

fn validate_export_name(file_name: &str) -> Result<()> {
    let reason = if file_name.trim().is_empty() {
        Some("is empty")
    } else if file_name.contains(|c| c == '/' || c == '\\') {
        Some("contains a path separator")
    } else if file_name.starts_with('.') {
        Some("starts with a dot")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(ScanshelfError::InvalidName {
            name: file_name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

fn split_extension(file_name: &str) -> (&str, Option<&str>) {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (file_name, None),
    }
}
