// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Clearline Contributors

//! Transactional email notifications.
//!
//! Delivery is delegated to an HTTP email API (`MAIL_API_URL` +
//! `MAIL_API_KEY`); when either is unset, notifications are disabled and
//! submissions proceed without them. Emails carry the plaintext tracking
//! code only — never an encrypted field or any other case content beyond
//! the category label.

use std::time::Duration;

use reqwest::Client;
use serde_json::json;
use url::Url;

const DEFAULT_FROM: &str = "no-reply@clearline.example";
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("mail configuration invalid: {0}")]
    InvalidConfig(String),

    #[error("mail request failed: {0}")]
    Request(String),

    #[error("mail API returned an error: {0}")]
    Api(String),
}

/// HTTP email API client.
#[derive(Debug, Clone)]
pub struct Mailer {
    api_url: Url,
    api_key: String,
    from: String,
    admin_to: Option<String>,
    http: Client,
}

impl Mailer {
    /// Whether the environment carries enough configuration for mail.
    pub fn is_configured() -> bool {
        std::env::var("MAIL_API_URL").is_ok() && std::env::var("MAIL_API_KEY").is_ok()
    }

    /// Build a mailer from the environment.
    pub fn from_env() -> Result<Self, MailerError> {
        let api_url = std::env::var("MAIL_API_URL")
            .map_err(|_| MailerError::InvalidConfig("MAIL_API_URL not set".to_string()))?;
        let api_key = std::env::var("MAIL_API_KEY")
            .map_err(|_| MailerError::InvalidConfig("MAIL_API_KEY not set".to_string()))?;
        let from = std::env::var("MAIL_FROM").unwrap_or_else(|_| DEFAULT_FROM.to_string());
        let admin_to = std::env::var("MAIL_ADMIN_TO").ok();

        Self::new(&api_url, api_key, from, admin_to)
    }

    /// Build a mailer from explicit configuration.
    pub fn new(
        api_url: &str,
        api_key: impl Into<String>,
        from: impl Into<String>,
        admin_to: Option<String>,
    ) -> Result<Self, MailerError> {
        let api_url = Url::parse(api_url)
            .map_err(|e| MailerError::InvalidConfig(format!("MAIL_API_URL: {e}")))?;

        Ok(Self {
            api_url,
            api_key: api_key.into(),
            from: from.into(),
            admin_to,
            http: Client::builder()
                .timeout(SEND_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
        })
    }

    /// Send the submitter their tracking code after a successful intake.
    pub async fn send_submission_receipt(
        &self,
        to: &str,
        tracking_code: &str,
    ) -> Result<(), MailerError> {
        let text = format!(
            "Your report has been received.\n\n\
             Tracking code: {tracking_code}\n\n\
             Keep this code safe: it is the only way to check the status \
             of your report, and it cannot be recovered if lost."
        );
        self.send(to, "Your report has been received", &text).await
    }

    /// Alert the configured admin address that a new case arrived.
    ///
    /// No-op when `MAIL_ADMIN_TO` is unset.
    pub async fn notify_admin_new_case(
        &self,
        tracking_code: &str,
        category: &str,
    ) -> Result<(), MailerError> {
        let Some(admin_to) = &self.admin_to else {
            return Ok(());
        };
        let text = format!(
            "A new report has been submitted.\n\n\
             Category: {category}\n\
             Tracking code: {tracking_code}\n\n\
             Review it in the backoffice."
        );
        self.send(admin_to, "New report submitted", &text).await
    }

    async fn send(&self, to: &str, subject: &str, text: &str) -> Result<(), MailerError> {
        let body = json!({
            "from": self.from,
            "to": [to],
            "subject": subject,
            "text": text,
        });

        let response = self
            .http
            .post(self.api_url.clone())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| MailerError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MailerError::Api(format!(
                "HTTP {} from mail API",
                response.status()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_invalid_url() {
        let result = Mailer::new("not a url", "key", "from@example.com", None);
        assert!(matches!(result, Err(MailerError::InvalidConfig(_))));
    }

    #[test]
    fn new_accepts_valid_config() {
        let mailer = Mailer::new(
            "https://mail.example.com/v1/send",
            "key",
            "from@example.com",
            Some("admin@example.com".to_string()),
        )
        .unwrap();
        assert_eq!(mailer.from, "from@example.com");
        assert_eq!(mailer.admin_to.as_deref(), Some("admin@example.com"));
    }

    #[tokio::test]
    async fn admin_notification_without_recipient_is_noop() {
        let mailer = Mailer::new(
            // Unroutable host: the send must never be attempted.
            "https://mail.invalid/v1/send",
            "key",
            "from@example.com",
            None,
        )
        .unwrap();

        mailer
            .notify_admin_new_case("DEN-AB12CD34", "fraud")
            .await
            .expect("no admin recipient means nothing to send");
    }
}
