// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Clearline Contributors

//! # Authentication Module
//!
//! JWT authentication for the backoffice API. Identity management is
//! delegated to a managed identity platform; this service only verifies
//! the tokens it issues.
//!
//! ## Auth Flow
//!
//! 1. The backoffice frontend authenticates staff against the platform
//! 2. Frontend sends `Authorization: Bearer <JWT>`
//! 3. This service:
//!    - Fetches the platform JWKS via HTTPS
//!    - Verifies JWT signature, expiry, issuer, audience
//!    - Extracts `sub` → canonical `user_id` and the backoffice role
//!
//! ## Security
//!
//! - All `/v1/admin` endpoints require authentication; intake and
//!   tracking-code lookup are anonymous by design
//! - JWT verification uses HTTPS-only JWKS fetching
//! - JWKS is cached with TTL for performance
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod error;
pub mod extractor;
pub mod jwks;
pub mod roles;

pub use claims::{AuthenticatedUser, IdentityClaims};
pub use error::AuthError;
pub use extractor::{AdminOnly, Auth};
pub use jwks::JwksManager;
pub use roles::Role;
