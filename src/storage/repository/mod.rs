// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Clearline Contributors

//! Repository layer providing typed access to the case store.

pub mod cases;

pub use cases::{CaseRepository, CaseStatus, EncryptedContact, StoredCase};
