// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Clearline Contributors

//! Legacy reversible encoding of contact fields.
//!
//! Early deployments stored contact data as plain Base64 with no key and
//! no IV. That is an encoding, not encryption: anyone holding the stored
//! value can recover the plaintext. No new data is ever written in this
//! form.
//!
//! The codec survives only so that historical records can be migrated:
//! the admin maintenance operation decodes each legacy value and
//! re-encrypts it with the field cipher (see
//! `api::admin::upgrade_legacy_records`). Round-trip semantics of the
//! old scheme are preserved exactly so no historical value is lost in
//! the migration.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

/// Errors decoding a legacy-encoded value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LegacyCodecError {
    /// Input is not valid Base64.
    #[error("legacy value is not valid base64")]
    InvalidBase64,

    /// Decoded bytes are not valid UTF-8.
    #[error("legacy value is not valid utf-8")]
    InvalidUtf8,
}

/// Encode a value in the legacy form.
///
/// Exists only to express the historical scheme for migration tests and
/// importers; the intake path never calls it.
pub fn encode(plaintext: &str) -> String {
    STANDARD.encode(plaintext.as_bytes())
}

/// Decode a legacy-encoded value back to plaintext.
pub fn decode(encoded: &str) -> Result<String, LegacyCodecError> {
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|_| LegacyCodecError::InvalidBase64)?;
    String::from_utf8(bytes).map_err(|_| LegacyCodecError::InvalidUtf8)
}
