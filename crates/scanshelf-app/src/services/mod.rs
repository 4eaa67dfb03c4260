// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer — bridges the UI to the scanshelf backend crates.

pub mod app_services;
pub mod data_dir;
#[cfg(feature = "desktop")]
pub mod desktop_scanner;
pub mod notices;
