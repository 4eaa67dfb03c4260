// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Notice board — collects one-shot notices until the UI shows them.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use scanshelf_bridge::Notifier;
use scanshelf_core::types::Notice;

/// Shared queue of notices waiting to be displayed.
///
/// Cheap to clone; clones share the same queue.
#[derive(Debug, Clone, Default)]
pub struct NoticeBoard {
    pending: Arc<Mutex<Vec<Notice>>>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent notice, left in place.
    pub fn latest(&self) -> Option<Notice> {
        self.lock().last().cloned()
    }

    /// Remove and return the most recent notice, discarding older ones.
    /// A toast only ever shows the newest.
    pub fn take_latest(&self) -> Option<Notice> {
        let mut pending = self.lock();
        let latest = pending.pop();
        pending.clear();
        latest
    }

    /// Remove and return every pending notice, oldest first.
    pub fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Notice>> {
        // A panic while holding the lock cannot leave a Vec half-updated.
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Notifier for NoticeBoard {
    fn notify(&self, notice: &Notice) {
        tracing::debug!(text = %notice.message, kind = ?notice.kind, "notice posted");
        self.lock().push(notice.clone());
    }
}
