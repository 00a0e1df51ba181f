// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Clearline Contributors

//! # Runtime Configuration Constants
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for case storage | `/data` |
//! | `FIELD_ENCRYPTION_KEY` | 256-bit field key (hex or Base64) | Required |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `AUTH_JWKS_URL` | Identity platform JWKS endpoint | Required for production |
//! | `AUTH_ISSUER` | Expected JWT issuer claim | Required for production |
//! | `AUTH_AUDIENCE` | Expected JWT audience claim | Optional |
//! | `MAIL_API_URL` | Transactional email API endpoint | Mail disabled if unset |
//! | `MAIL_API_KEY` | Email API key | Mail disabled if unset |
//! | `MAIL_FROM` | Sender address | `no-reply@clearline.example` |
//! | `MAIL_ADMIN_TO` | Admin alert recipient | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

/// Environment variable name for the data directory path.
///
/// All cases and audit logs are stored here; in production the directory
/// should sit on an encrypted volume. Submitter contact fields are
/// field-encrypted before they reach this directory either way.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Environment variable name for the deployment field-encryption key.
///
/// Must decode (hex or Base64) to exactly 32 bytes. Supplied out-of-band
/// via the deployment's secret store; the service refuses to start
/// without a valid key.
pub const FIELD_ENCRYPTION_KEY_ENV: &str = "FIELD_ENCRYPTION_KEY";

/// Environment variable name for the identity platform JWKS endpoint.
/// When unset the service runs backoffice auth in development mode.
pub const AUTH_JWKS_URL_ENV: &str = "AUTH_JWKS_URL";

/// Environment variable name for the expected JWT issuer.
pub const AUTH_ISSUER_ENV: &str = "AUTH_ISSUER";

/// Environment variable name for the expected JWT audience.
pub const AUTH_AUDIENCE_ENV: &str = "AUTH_AUDIENCE";
