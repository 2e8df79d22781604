//! JSON mail API provider (SendGrid v3 payload shape).

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::config::HttpApiSettings;
use crate::{MailError, MailMessage, Mailer};

pub struct HttpApiMailer {
    client: Client,
    url: String,
    api_key: String,
    from_address: String,
}

impl HttpApiMailer {
    pub fn new(settings: &HttpApiSettings, from_address: &str) -> Self {
        Self {
            client: Client::new(),
            url: settings.url.clone(),
            api_key: settings.api_key.clone(),
            from_address: from_address.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Address<'a>,
    subject: &'a str,
    content: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    value: &'a str,
}

fn request_body<'a>(from: &'a str, message: &'a MailMessage) -> SendRequest<'a> {
    SendRequest {
        personalizations: vec![Personalization {
            to: vec![Address { email: &message.to }],
        }],
        from: Address { email: from },
        subject: &message.subject,
        content: vec![Content {
            content_type: "text/plain",
            value: &message.body,
        }],
    }
}

#[async_trait]
impl Mailer for HttpApiMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request_body(&self.from_address, message))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Api {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(to = %message.to, subject = %message.subject, "Email sent via mail API");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
