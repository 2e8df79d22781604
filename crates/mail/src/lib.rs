//! Outbound email.
//!
//! Handlers talk to the [`Mailer`] trait. The concrete provider is picked at
//! startup from [`MailConfig`]: SMTP through `lettre`, a JSON mail API through
//! `reqwest`, or [`LogMailer`] which only logs.

use std::sync::Arc;

use async_trait::async_trait;

mod config;
mod http;
mod log_mailer;
mod smtp;
pub mod templates;

pub use config::{HttpApiSettings, MailConfig, MailProvider, SmtpSettings};
pub use http::HttpApiMailer;
pub use log_mailer::{LogMailer, RecordingMailer};
pub use smtp::SmtpMailer;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),

    #[error("Mail API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Mail API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Mail configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Message + trait
// ---------------------------------------------------------------------------

/// A plain-text email ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError>;

    /// Provider name for logs.
    fn name(&self) -> &'static str;
}

/// Build the provider selected by `config`.
pub fn build_mailer(config: &MailConfig) -> Result<Arc<dyn Mailer>, MailError> {
    let mailer: Arc<dyn Mailer> = match &config.provider {
        MailProvider::Smtp(settings) => Arc::new(SmtpMailer::new(settings, &config.from_address)?),
        MailProvider::Http(settings) => Arc::new(HttpApiMailer::new(settings, &config.from_address)),
        MailProvider::None => Arc::new(LogMailer),
    };
    tracing::info!(provider = mailer.name(), "Mailer configured");
    Ok(mailer)
}

/// Send `message` on a background task. Failures are logged, never returned.
pub fn send_in_background(mailer: Arc<dyn Mailer>, message: MailMessage) {
    tokio::spawn(async move {
        if let Err(e) = mailer.send(&message).await {
            tracing::warn!(
                error = %e,
                to = %message.to,
                subject = %message.subject,
                provider = mailer.name(),
                "Failed to send email",
            );
        }
    });
}
