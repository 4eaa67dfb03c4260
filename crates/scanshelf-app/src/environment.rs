// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ambient platform context handed to the library controller.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use scanshelf_bridge::Notifier;

/// Where documents live and how notices reach the user.
#[derive(Clone)]
pub struct Environment {
    pub store_dir: PathBuf,
    pub notifier: Arc<dyn Notifier>,
}

impl Environment {
    pub fn new(store_dir: impl Into<PathBuf>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store_dir: store_dir.into(),
            notifier,
        }
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("store_dir", &self.store_dir)
            .finish_non_exhaustive()
    }
}
