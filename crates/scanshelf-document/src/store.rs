// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document store — the flat directory of scanned PDFs.
//
// The directory is the only source of truth: there is no index, and every
// listing is read fresh from disk. File names are document identity.
//
// Policies:
//   - New scans are named `scan_<unix-millis>.pdf`; a `_<n>` suffix is added
//     when that name is taken, and the file is placed with a no-clobber move
//     so two captures finishing in the same millisecond cannot collide.
//   - Deleting a document that is already gone fails with `NotFound` (the
//     caller refreshes its list either way).
//   - A single active controller per directory is assumed; mutations are not
//     serialised across processes.

use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use scanshelf_core::error::{Result, ScanshelfError};
use scanshelf_core::types::{
    DocumentList, PDF_EXTENSION, ScannedDocument, strip_pdf_extension,
};
use tracing::{debug, info, instrument, warn};

use crate::atomic::{Placement, place_atomically};

/// How many suffixed names `persist` tries before giving up.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Longest file name most filesystems accept, in bytes.
const MAX_FILE_NAME_BYTES: usize = 255;

/// Owns the directory holding every scanned document.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    dir: PathBuf,
}

impl DocumentStore {
    /// Open the store at `dir`, creating the directory if needed.
    #[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        info!("document store opened");
        Ok(Self { dir })
    }

    /// The store directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Every document in the store, newest first.
    ///
    /// Never fails: an unreadable directory yields an empty list, and entries
    /// whose metadata cannot be read are skipped.
    pub fn list(&self) -> DocumentList {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(dir = %self.dir.display(), %err, "document directory unreadable");
                return Vec::new();
            }
        };

        let mut documents: DocumentList = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let file_name = match entry.file_name().into_string() {
                    Ok(file_name) => file_name,
                    Err(raw) => {
                        debug!(name = ?raw, "skipping entry with a non-UTF-8 name");
                        return None;
                    }
                };
                if !is_document_name(&file_name) {
                    return None;
                }
                let metadata = entry.metadata().ok()?;
                metadata
                    .is_file()
                    .then(|| describe(entry.path(), file_name, &metadata))
            })
            .collect();

        sort_newest_first(&mut documents);
        debug!(count = documents.len(), "documents listed");
        documents
    }

    /// Look up a single document by file name.
    pub fn get(&self, file_name: &str) -> Option<ScannedDocument> {
        if !is_document_name(file_name) {
            return None;
        }
        let path = self.dir.join(file_name);
        let metadata = fs::metadata(&path).ok()?;
        metadata
            .is_file()
            .then(|| describe(path, file_name.to_string(), &metadata))
    }

    /// Store freshly captured PDF bytes under a new unique name.
    #[instrument(skip_all, fields(bytes = bytes.len()))]
    pub fn persist(&self, bytes: &[u8]) -> Result<ScannedDocument> {
        let stamp = Utc::now().timestamp_millis();
        let candidates = (0..MAX_NAME_ATTEMPTS).map(|attempt| generated_name(stamp, attempt));

        let path = place_atomically(&self.dir, bytes, candidates, Placement::NoClobber)
            .map_err(ScanshelfError::PersistFailed)?;
        let document = self.describe_path(&path).map_err(ScanshelfError::PersistFailed)?;

        info!(file = %document.file_name, "scan persisted");
        Ok(document)
    }

    /// Give `document` a new name.
    ///
    /// `new_name` is what the user typed; `.pdf` is appended when missing.
    /// Renaming onto the current name is a no-op.
    #[instrument(skip(self, document), fields(from = %document.file_name))]
    pub fn rename(&self, document: &ScannedDocument, new_name: &str) -> Result<ScannedDocument> {
        let target_name = normalize_document_name(new_name)?;
        let source = self.dir.join(&document.file_name);
        if !source.is_file() {
            return Err(ScanshelfError::NotFound(document.file_name.clone()));
        }
        // `B.PDF` confirmed as "B" keeps its name rather than becoming `B.pdf`.
        if strip_pdf_extension(&target_name) == document.display_name() {
            debug!("rename to current name, nothing to do");
            return self.describe_path(&source).map_err(ScanshelfError::RenameFailed);
        }

        let target = self.dir.join(&target_name);
        // On a case-insensitive filesystem a case-only change finds the source
        // itself at the target path; anything else there is another document.
        if fs::symlink_metadata(&target).is_ok() && !is_same_file(&source, &target) {
            warn!(to = %target_name, "rename target already exists");
            return Err(ScanshelfError::NameConflict(target_name));
        }

        fs::rename(&source, &target).map_err(ScanshelfError::RenameFailed)?;
        let renamed = self.describe_path(&target).map_err(ScanshelfError::RenameFailed)?;
        info!(to = %renamed.file_name, "document renamed");
        Ok(renamed)
    }

    /// Remove `document` from the store.
    #[instrument(skip_all, fields(file = %document.file_name))]
    pub fn delete(&self, document: &ScannedDocument) -> Result<()> {
        match fs::remove_file(self.dir.join(&document.file_name)) {
            Ok(()) => {
                info!("document deleted");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!("document already gone");
                Err(ScanshelfError::NotFound(document.file_name.clone()))
            }
            Err(err) => Err(ScanshelfError::DeleteFailed(err)),
        }
    }

    /// Read the full contents of `document`.
    pub fn read(&self, document: &ScannedDocument) -> Result<Vec<u8>> {
        fs::read(self.dir.join(&document.file_name)).map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                ScanshelfError::NotFound(document.file_name.clone())
            } else {
                ScanshelfError::Io(err)
            }
        })
    }

    fn describe_path(&self, path: &Path) -> io::Result<ScannedDocument> {
        let metadata = fs::metadata(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(describe(path.to_path_buf(), file_name, &metadata))
    }
}

/// Turn user input into a store file name, or explain why it cannot be one.
pub fn normalize_document_name(input: &str) -> Result<String> {
    let invalid = |reason: &'static str| ScanshelfError::InvalidName {
        name: input.to_string(),
        reason,
    };

    let stem = strip_pdf_extension(input.trim()).trim_end();
    if stem.is_empty() {
        return Err(invalid("is empty"));
    }
    if stem.contains(|c| c == '/' || c == '\\') {
        return Err(invalid("contains a path separator"));
    }
    if stem.contains('\0') {
        return Err(invalid("contains a NUL character"));
    }
    if stem.starts_with('.') {
        return Err(invalid("starts with a dot"));
    }
    if stem.len() + PDF_EXTENSION.len() + 1 > MAX_FILE_NAME_BYTES {
        return Err(invalid("is too long"));
    }
    Ok(format!("{stem}.{PDF_EXTENSION}"))
}

fn generated_name(stamp: i64, attempt: u32) -> String {
    if attempt == 0 {
        format!("scan_{stamp}.{PDF_EXTENSION}")
    } else {
        format!("scan_{stamp}_{attempt}.{PDF_EXTENSION}")
    }
}

fn is_document_name(file_name: &str) -> bool {
    !file_name.starts_with('.')
        && Path::new(file_name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(PDF_EXTENSION))
}

/// Whether both paths lead to the same directory entry. Errors count as
/// different files.
#[cfg(unix)]
fn is_same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (fs::symlink_metadata(a), fs::symlink_metadata(b)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn describe(path: PathBuf, file_name: String, metadata: &Metadata) -> ScannedDocument {
    let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
    ScannedDocument {
        file_name,
        path,
        modified: DateTime::<Utc>::from(modified),
        size_bytes: metadata.len(),
    }
}

/// Newest first; equal timestamps fall back to descending file name, which
/// keeps generated names in capture order.
fn sort_newest_first(documents: &mut DocumentList) {
    documents.sort_by(|a, b| {
        b.modified
            .cmp(&a.modified)
            .then_with(|| b.file_name.cmp(&a.file_name))
    });
}
