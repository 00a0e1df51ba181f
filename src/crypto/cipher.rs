// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Clearline Contributors

//! AES-256-CBC encryption of individual contact fields.
//!
//! The stored form of a field is `Base64(iv || ciphertext)`: a fresh
//! 16-byte IV is drawn from the OS CSPRNG on every call and prepended to
//! the PKCS#7-padded CBC ciphertext before encoding. Two encryptions of
//! the same plaintext therefore never produce the same stored string.
//!
//! The key is deployment-wide, injected at construction (see
//! `FIELD_ENCRYPTION_KEY` in the config module), and must decode to
//! exactly 32 bytes. Key rotation and per-tenant keys are out of scope;
//! there is one key per deployment.
//!
//! ## Empty input
//!
//! The empty string is encrypted like any other plaintext (it becomes a
//! single padding block), so `decrypt(encrypt(s)) == s` holds for every
//! input including `""`. The empty *encoded* string is consequently
//! never a value `encrypt` produces, and decrypting it fails. "Field
//! absent" is represented by `Option::None` at the model layer, never by
//! an encrypted empty string.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{rngs::OsRng, RngCore};
use thiserror::Error;

use super::fields::{EncryptedField, SensitiveField};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Byte length of the AES-256 key.
pub const KEY_LEN: usize = 32;

/// Byte length of the CBC initialization vector (one AES block).
pub const IV_LEN: usize = 16;

/// Errors produced by the field cipher.
///
/// The first two variants are key-configuration failures: they are not
/// caller-correctable and abort startup. `DecryptionFailure` covers
/// malformed or tampered ciphertext and key mismatch; callers rendering
/// data to a human may map it to a placeholder, but it is never silently
/// converted into plaintext that looks real.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The configured key does not decode to [`KEY_LEN`] bytes.
    #[error("invalid field key length: expected {KEY_LEN} bytes, got {0}")]
    InvalidKeyLength(usize),

    /// The configured key is neither hex nor Base64.
    #[error("invalid field key encoding: {0}")]
    InvalidKeyEncoding(String),

    /// The stored value could not be decrypted.
    #[error("field decryption failed: {0}")]
    DecryptionFailure(&'static str),
}

/// Reversible, confidentiality-preserving transformation of short
/// contact strings to and from the storage-safe encoded form.
///
/// Stateless and `Send + Sync`; one instance is shared across all
/// request handlers via the application state.
#[derive(Clone)]
pub struct FieldCipher {
    key: [u8; KEY_LEN],
}

impl FieldCipher {
    /// Create a cipher from the deployment key string.
    ///
    /// Accepts 64 hex characters or standard Base64; either form must
    /// decode to exactly 32 bytes.
    pub fn new(key_str: &str) -> Result<Self, CipherError> {
        let bytes = decode_key(key_str)?;
        if bytes.len() != KEY_LEN {
            return Err(CipherError::InvalidKeyLength(bytes.len()));
        }
        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(&bytes);
        Ok(Self { key })
    }

    /// Create a cipher from raw key bytes.
    pub fn from_bytes(key: [u8; KEY_LEN]) -> Self {
        Self { key }
    }

    /// Encrypt a plaintext field into its stored form.
    ///
    /// Draws a fresh random IV per call, so repeated encryptions of the
    /// same plaintext yield different encoded strings.
    pub fn encrypt(&self, plaintext: &SensitiveField) -> Result<EncryptedField, CipherError> {
        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut iv);

        let ciphertext = Aes256CbcEnc::new(&self.key.into(), &iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_str().as_bytes());

        let mut combined = Vec::with_capacity(IV_LEN + ciphertext.len());
        combined.extend_from_slice(&iv);
        combined.extend_from_slice(&ciphertext);

        Ok(EncryptedField::new(STANDARD.encode(combined)))
    }

    /// Decrypt a stored field back to plaintext.
    ///
    /// Fails with [`CipherError::DecryptionFailure`] when the input is
    /// not valid Base64, is shorter than one IV plus one cipher block,
    /// fails PKCS#7 padding validation (tampered data or wrong key), or
    /// does not decode to valid UTF-8.
    pub fn decrypt(&self, encoded: &EncryptedField) -> Result<SensitiveField, CipherError> {
        let combined = STANDARD
            .decode(encoded.as_str())
            .map_err(|_| CipherError::DecryptionFailure("invalid base64"))?;

        // Minimum size: one IV plus one cipher block.
        if combined.len() < IV_LEN + 16 {
            return Err(CipherError::DecryptionFailure("ciphertext too short"));
        }

        let (iv_bytes, ciphertext) = combined.split_at(IV_LEN);
        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(iv_bytes);

        let plaintext = Aes256CbcDec::new(&self.key.into(), &iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| CipherError::DecryptionFailure("padding check failed"))?;

        let text = String::from_utf8(plaintext)
            .map_err(|_| CipherError::DecryptionFailure("invalid utf-8"))?;

        Ok(SensitiveField::from_trusted(text))
    }
}

impl std::fmt::Debug for FieldCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldCipher")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Decode the deployment key from hex or Base64.
fn decode_key(key_str: &str) -> Result<Vec<u8>, CipherError> {
    if key_str.len() == KEY_LEN * 2 && key_str.chars().all(|c| c.is_ascii_hexdigit()) {
        return hex::decode(key_str).map_err(|e| CipherError::InvalidKeyEncoding(e.to_string()));
    }

    STANDARD
        .decode(key_str)
        .map_err(|e| CipherError::InvalidKeyEncoding(e.to_string()))
}
