// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Clearline Contributors

//! Case tracking codes.
//!
//! A tracking code is the only credential a submitter holds: an opaque,
//! human-shareable identifier of the form `DEN-` followed by eight
//! uppercase base-36 characters (`DEN-AB12CD34`), giving roughly
//! 2.8 × 10^12 combinations. It encodes nothing about the case.
//!
//! The generator is a pure random draw and does NOT guarantee
//! uniqueness on its own: the case repository rejects a duplicate code
//! at creation time and the intake handler retries generation on that
//! collision. Both sides of that contract live in this crate
//! (`CaseRepository::create` and `api::reports::submit_report`).

use rand::{rngs::OsRng, Rng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Constant human-recognizable prefix ("denuncia").
pub const CODE_PREFIX: &str = "DEN-";

/// Number of random characters after the prefix.
pub const CODE_SUFFIX_LEN: usize = 8;

/// Alphabet for the random suffix (base-36, uppercase).
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Malformed tracking code input.
///
/// Raised before the case store is ever queried, so garbage input never
/// turns into a storage lookup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackingCodeError {
    /// Input does not match `DEN-` + 8 uppercase base-36 characters.
    #[error("malformed tracking code")]
    MalformedCode,
}

/// An opaque case tracking code.
///
/// Assigned exactly once at case creation and immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TrackingCode(String);

impl TrackingCode {
    /// Draw a new random code from the OS CSPRNG.
    ///
    /// Fresh randomness per call; no process-wide sequence state.
    pub fn generate() -> Self {
        let mut code = String::with_capacity(CODE_PREFIX.len() + CODE_SUFFIX_LEN);
        code.push_str(CODE_PREFIX);
        for _ in 0..CODE_SUFFIX_LEN {
            let idx = OsRng.gen_range(0..CODE_ALPHABET.len());
            code.push(CODE_ALPHABET[idx] as char);
        }
        Self(code)
    }

    /// Parse user-supplied input into a tracking code.
    ///
    /// Surrounding whitespace is trimmed and the input is uppercased, so
    /// codes survive copy/paste padding and lowercase entry. Anything
    /// that does not then match the documented shape is rejected.
    pub fn parse(input: &str) -> Result<Self, TrackingCodeError> {
        let normalized = input.trim().to_ascii_uppercase();

        let suffix = normalized
            .strip_prefix(CODE_PREFIX)
            .ok_or(TrackingCodeError::MalformedCode)?;

        if suffix.len() != CODE_SUFFIX_LEN
            || !suffix.bytes().all(|b| CODE_ALPHABET.contains(&b))
        {
            return Err(TrackingCodeError::MalformedCode);
        }

        Ok(Self(normalized))
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TrackingCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_codes_match_format() {
        for _ in 0..1000 {
            let code = TrackingCode::generate();
            let s = code.as_str();
            assert!(s.starts_with(CODE_PREFIX));
            let suffix = &s[CODE_PREFIX.len()..];
            assert_eq!(suffix.len(), CODE_SUFFIX_LEN);
            assert!(suffix.bytes().all(|b| CODE_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn no_duplicates_in_large_sample() {
        // Probabilistic: at ~2.8e12 combinations, 100k draws colliding
        // would indicate a broken random source, not bad luck.
        let mut seen = HashSet::with_capacity(100_000);
        for _ in 0..100_000 {
            let code = TrackingCode::generate();
            assert!(TrackingCode::parse(code.as_str()).is_ok());
            assert!(seen.insert(code.0));
        }
    }

    #[test]
    fn parse_normalizes_whitespace_and_case() {
        let parsed = TrackingCode::parse("  den-ab12cd34\t").unwrap();
        assert_eq!(parsed.as_str(), "DEN-AB12CD34");

        let exact = TrackingCode::parse("DEN-AB12CD34").unwrap();
        assert_eq!(parsed, exact);
    }

    #[test]
    fn parse_rejects_malformed_input() {
        for input in [
            "",
            "DEN-",
            "AB12CD34",
            "DEN-AB12CD3",    // too short
            "DEN-AB12CD345",  // too long
            "DEN-AB12CD3!",   // bad character
            "XYZ-AB12CD34",   // wrong prefix
            "DEN AB12CD34",   // missing dash
        ] {
            assert_eq!(
                TrackingCode::parse(input),
                Err(TrackingCodeError::MalformedCode),
                "input {input:?} should be rejected"
            );
        }
    }

    #[test]
    fn round_trips_generated_codes() {
        let code = TrackingCode::generate();
        let parsed = TrackingCode::parse(code.as_str()).unwrap();
        assert_eq!(parsed, code);
    }
}
