// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Clearline Contributors

//! Plaintext/ciphertext newtypes for submitter contact data.
//!
//! [`SensitiveField`] is the transient in-memory plaintext of a contact
//! attribute; it exists only while a submission is being processed or a
//! disclosure is being rendered. [`EncryptedField`] is the opaque stored
//! string produced by the cipher. Keeping them as distinct types makes it
//! impossible to persist plaintext or display ciphertext by accident.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use utoipa::ToSchema;

/// Maximum accepted length (in characters) of a single contact field.
pub const MAX_FIELD_LEN: usize = 512;

/// Validation errors for submitter-supplied field values.
///
/// These are caller-correctable and map to a 400/422 at the API layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldValidationError {
    /// The value exceeds [`MAX_FIELD_LEN`] characters.
    #[error("field value exceeds {MAX_FIELD_LEN} characters")]
    TooLong,

    /// The value contains control characters.
    #[error("field value contains control characters")]
    ControlCharacters,
}

/// A plaintext contact value (email, name, phone, or postal address).
///
/// Never serialized and never written to storage; the only way out of
/// memory is through [`FieldCipher::encrypt`](super::FieldCipher::encrypt).
#[derive(Clone, PartialEq, Eq)]
pub struct SensitiveField(String);

impl SensitiveField {
    /// Validate and normalize a submitter-supplied value.
    ///
    /// Input is NFC-normalized and trimmed. The empty string is a valid
    /// field value (the cipher encrypts it like any other); "field
    /// absent" is modeled as `Option::None` upstream.
    pub fn new(value: impl AsRef<str>) -> Result<Self, FieldValidationError> {
        let normalized: String = value.as_ref().trim().nfc().collect();

        if normalized.chars().count() > MAX_FIELD_LEN {
            return Err(FieldValidationError::TooLong);
        }
        if normalized.chars().any(char::is_control) {
            return Err(FieldValidationError::ControlCharacters);
        }

        Ok(Self(normalized))
    }

    /// Wrap a value that came out of the cipher (already validated at
    /// submission time).
    pub(crate) fn from_trusted(value: String) -> Self {
        Self(value)
    }

    /// The plaintext value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the field, yielding the plaintext.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for SensitiveField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SensitiveField").field(&"[REDACTED]").finish()
    }
}

/// The persisted representation of a sensitive field: Base64 of
/// `iv || ciphertext`, stored as an opaque text value.
///
/// Created once at submission and replaced as a whole value when the
/// underlying data changes; never mutated in place.
#[derive(Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(transparent)]
pub struct EncryptedField(String);

impl EncryptedField {
    /// Wrap an encoded value.
    pub fn new(encoded: String) -> Self {
        Self(encoded)
    }

    /// The encoded storage form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for EncryptedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("EncryptedField").field(&"[ENCRYPTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_normalizes() {
        let field = SensitiveField::new("  user@example.com  ").unwrap();
        assert_eq!(field.as_str(), "user@example.com");

        // Decomposed "é" (e + combining acute) collapses to the composed form.
        let decomposed = "Jose\u{0301}";
        let field = SensitiveField::new(decomposed).unwrap();
        assert_eq!(field.as_str(), "José");
    }

    #[test]
    fn empty_is_valid() {
        let field = SensitiveField::new("   ").unwrap();
        assert_eq!(field.as_str(), "");
    }

    #[test]
    fn oversized_rejected() {
        let long = "a".repeat(MAX_FIELD_LEN + 1);
        assert_eq!(
            SensitiveField::new(&long),
            Err(FieldValidationError::TooLong)
        );

        let exact = "a".repeat(MAX_FIELD_LEN);
        assert!(SensitiveField::new(&exact).is_ok());
    }

    #[test]
    fn control_characters_rejected() {
        assert_eq!(
            SensitiveField::new("line1\nline2"),
            Err(FieldValidationError::ControlCharacters)
        );
        assert_eq!(
            SensitiveField::new("null\u{0}byte"),
            Err(FieldValidationError::ControlCharacters)
        );
    }

    #[test]
    fn debug_never_prints_plaintext() {
        let field = SensitiveField::new("secret@example.com").unwrap();
        let output = format!("{field:?}");
        assert!(output.contains("[REDACTED]"));
        assert!(!output.contains("secret"));
    }

    #[test]
    fn encrypted_field_serializes_transparently() {
        let field = EncryptedField::new("AAECAw==".to_string());
        let json = serde_json::to_string(&field).unwrap();
        assert_eq!(json, r#""AAECAw==""#);

        let back: EncryptedField = serde_json::from_str(&json).unwrap();
        assert_eq!(back, field);
    }
}
