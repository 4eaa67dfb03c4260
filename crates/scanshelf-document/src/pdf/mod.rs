// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — reading scanned PDFs and pulling page images out of them.

pub mod reader;

pub use reader::PdfReader;
