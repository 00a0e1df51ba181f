// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Clearline Contributors

//! Shared application state.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::auth::JwksManager;
use crate::crypto::FieldCipher;
use crate::mailer::Mailer;
use crate::storage::FileStorage;

/// Authentication configuration.
///
/// With `jwks` set the service runs in production mode (full signature
/// verification); without it, development mode (structure checks only).
#[derive(Clone, Default)]
pub struct AuthConfig {
    /// JWKS manager (production mode when present)
    pub jwks: Option<JwksManager>,
    /// Expected token issuer
    pub issuer: Option<String>,
    /// Expected token audience
    pub audience: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    /// Case and audit store.
    pub storage: FileStorage,
    /// Field cipher holding the deployment key.
    pub cipher: Arc<FieldCipher>,
    /// Backoffice auth configuration.
    pub auth_config: Arc<AuthConfig>,
    /// Notification sender; None when mail is not configured.
    pub mailer: Option<Arc<Mailer>>,
    /// Process start time, for uptime reporting.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(storage: FileStorage, cipher: FieldCipher) -> Self {
        Self {
            storage,
            cipher: Arc::new(cipher),
            auth_config: Arc::new(AuthConfig::default()),
            mailer: None,
            started_at: Utc::now(),
        }
    }

    pub fn with_auth_config(mut self, auth_config: AuthConfig) -> Self {
        self.auth_config = Arc::new(auth_config);
        self
    }

    pub fn with_mailer(mut self, mailer: Mailer) -> Self {
        self.mailer = Some(Arc::new(mailer));
        self
    }

    /// The case store.
    pub fn storage(&self) -> FileStorage {
        self.storage.clone()
    }
}
