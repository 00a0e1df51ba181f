// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Clearline Contributors

//! # Field Encryption & Tracking Codes
//!
//! This module is the confidentiality core of the service:
//!
//! - [`FieldCipher`] encrypts submitter contact fields (email, name,
//!   phone, address) before they reach the case store and decrypts them
//!   for authorized disclosure.
//! - [`TrackingCode`] is the opaque, unguessable handle a submitter uses
//!   to query their case's public status.
//! - [`SensitiveField`] / [`EncryptedField`] keep plaintext and
//!   ciphertext apart at the type level.
//! - [`legacy`] holds the historical plain-Base64 codec, kept only so
//!   old records can be upgraded to the encrypted form.
//!
//! All components here are stateless and pure with respect to their key
//! and random-source inputs; they may be called concurrently from any
//! request context without coordination. None of them log plaintext or
//! key material.

pub mod cipher;
pub mod fields;
pub mod legacy;
pub mod tracking;

pub use cipher::{CipherError, FieldCipher, IV_LEN, KEY_LEN};
pub use fields::{EncryptedField, FieldValidationError, SensitiveField, MAX_FIELD_LEN};
pub use tracking::{TrackingCode, TrackingCodeError, CODE_PREFIX, CODE_SUFFIX_LEN};
