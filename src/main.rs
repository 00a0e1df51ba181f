// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Clearline Contributors

use std::{env, net::SocketAddr};

use tracing_subscriber::EnvFilter;

use clearline_server::api::router;
use clearline_server::auth::JwksManager;
use clearline_server::config::{
    AUTH_AUDIENCE_ENV, AUTH_ISSUER_ENV, AUTH_JWKS_URL_ENV, DATA_DIR_ENV, FIELD_ENCRYPTION_KEY_ENV,
};
use clearline_server::crypto::FieldCipher;
use clearline_server::mailer::Mailer;
use clearline_server::state::{AppState, AuthConfig};
use clearline_server::storage::{paths::DATA_ROOT, FileStorage, StoragePaths};

#[tokio::main]
async fn main() {
    init_tracing();

    // The field key is mandatory: without it no submission could be
    // stored confidentially, so refuse to start at all.
    let key = env::var(FIELD_ENCRYPTION_KEY_ENV).unwrap_or_else(|_| {
        eprintln!("{FIELD_ENCRYPTION_KEY_ENV} is not set; refusing to start");
        std::process::exit(1);
    });
    let cipher = FieldCipher::new(&key).unwrap_or_else(|e| {
        eprintln!("{FIELD_ENCRYPTION_KEY_ENV} is invalid: {e}");
        std::process::exit(1);
    });

    // Initialize the case store
    let data_dir = env::var(DATA_DIR_ENV).unwrap_or_else(|_| DATA_ROOT.to_string());
    let mut storage = FileStorage::new(StoragePaths::new(&data_dir));
    storage
        .initialize()
        .unwrap_or_else(|e| panic!("Failed to initialize storage at {data_dir}: {e}"));
    storage
        .health_check()
        .unwrap_or_else(|e| panic!("Storage health check failed: {e}"));

    // Backoffice auth: production mode only when a JWKS URL is configured
    let auth_config = match env::var(AUTH_JWKS_URL_ENV) {
        Ok(jwks_url) => {
            tracing::info!("Backoffice auth: production mode (JWKS verification)");
            AuthConfig {
                jwks: Some(JwksManager::new(jwks_url)),
                issuer: env::var(AUTH_ISSUER_ENV).ok(),
                audience: env::var(AUTH_AUDIENCE_ENV).ok(),
            }
        }
        Err(_) => {
            tracing::warn!(
                "Backoffice auth: development mode (no {AUTH_JWKS_URL_ENV}; signatures NOT verified)"
            );
            AuthConfig::default()
        }
    };

    let mut state = AppState::new(storage, cipher).with_auth_config(auth_config);

    if Mailer::is_configured() {
        match Mailer::from_env() {
            Ok(mailer) => {
                tracing::info!("Mail notifications enabled");
                state = state.with_mailer(mailer);
            }
            Err(e) => {
                tracing::error!(error = %e, "Mail configuration invalid; notifications disabled");
            }
        }
    } else {
        tracing::info!("Mail notifications disabled (no MAIL_API_URL/MAIL_API_KEY)");
    }

    let app = router(state);

    // Parse bind address
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    tracing::info!("Clearline server listening on http://{addr} (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");
}

/// Initialize the tracing subscriber.
///
/// `LOG_FORMAT=json` switches to structured output; `RUST_LOG` controls
/// the filter as usual.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let json = env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Resolve when SIGINT or SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
