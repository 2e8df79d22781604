use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{MailError, MailMessage, Mailer};

/// Logs messages instead of delivering them. Used when no provider is configured.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            body_len = message.body.len(),
            "Email delivery disabled; message logged only",
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// Captures sent messages in memory. Test double for [`Mailer`].
#[derive(Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<MailMessage>>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every send fails.
    pub fn failing() -> Self {
        Self {
            sent: Arc::default(),
            fail: true,
        }
    }

    pub async fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Build("recording mailer set to fail".into()));
        }
        self.sent.lock().await.push(message.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
