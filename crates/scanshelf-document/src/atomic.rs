// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Atomic file placement: stage bytes under a hidden temporary name in the
// target directory, then move the finished file onto its final name.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

/// Prefix of staged files. The leading dot keeps them out of listings.
pub(crate) const STAGING_PREFIX: &str = ".scanshelf-";
const STAGING_SUFFIX: &str = ".part";

/// Whether placement may replace an existing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    NoClobber,
    Replace,
}

/// Write `bytes` into `dir` under the first free name from `candidates`.
///
/// With [`Placement::NoClobber`] each candidate is tried in order until one
/// does not exist yet. With [`Placement::Replace`] the first candidate wins.
/// On any error the staged file is removed, so nothing half-written is
/// ever visible under a final name.
pub(crate) fn place_atomically<I>(
    dir: &Path,
    bytes: &[u8],
    candidates: I,
    placement: Placement,
) -> io::Result<PathBuf>
where
    I: IntoIterator<Item = String>,
{
    let mut staged = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .suffix(STAGING_SUFFIX)
        .tempfile_in(dir)?;
    staged.write_all(bytes)?;
    staged.as_file().sync_all()?;

    let mut last_conflict = None;
    for name in candidates {
        let target = dir.join(&name);
        let placed = match placement {
            Placement::Replace => staged.persist(&target),
            Placement::NoClobber => staged.persist_noclobber(&target),
        };
        match placed {
            Ok(_) => return Ok(target),
            Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                debug!(%name, "name taken, trying next candidate");
                staged = err.file;
                last_conflict = Some(err.error);
            }
            Err(err) => return Err(err.error),
        }
    }

    Err(last_conflict.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "no candidate file name given")
    }))
}
