//! Outbound email delivery

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use crate::config::EmailConfig;
use crate::shared::errors::{InfraError, InfraResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> InfraResult<()>;
}

/// Writes messages to the log instead of delivering them.
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> InfraResult<()> {
        info!(to = %message.to, subject = %message.subject, "Email (log provider)");
        Ok(())
    }
}

/// JSON POST to a transactional email API with a bearer key.
pub struct HttpEmailSender {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
}

#[derive(Serialize)]
struct OutboundEmail<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

impl HttpEmailSender {
    pub fn new(config: &EmailConfig) -> InfraResult<Self> {
        if config.api_url.is_empty() {
            return Err(InfraError::NotConfigured("email.api_url"));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            from: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send(&self, message: &EmailMessage) -> InfraResult<()> {
        let body = OutboundEmail {
            from: &self.from,
            to: &message.to,
            subject: &message.subject,
            text: &message.text,
        };
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InfraError::Upstream {
                service: "email",
                status: status.as_u16(),
                body,
            });
        }
        info!(to = %message.to, subject = %message.subject, "Email sent");
        Ok(())
    }
}

/// Pick the sender named by `email.provider`.
pub fn build_sender(config: &EmailConfig) -> InfraResult<Arc<dyn EmailSender>> {
    match config.provider.as_str() {
        "http" => Ok(Arc::new(HttpEmailSender::new(config)?)),
        _ => Ok(Arc::new(LogEmailSender)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_sender_always_succeeds() {
        let msg = EmailMessage {
            to: "a@b.c".into(),
            subject: "Hi".into(),
            text: "Body".into(),
        };
        assert!(LogEmailSender.send(&msg).await.is_ok());
    }

    #[test]
    fn http_sender_requires_url() {
        let cfg = EmailConfig {
            provider: "http".into(),
            ..EmailConfig::default()
        };
        assert!(build_sender(&cfg).is_err());
        assert!(build_sender(&EmailConfig::default()).is_ok());
    }
}
