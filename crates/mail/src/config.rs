use crate::MailError;

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `MAIL_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@storefront.local";

/// SendGrid-compatible endpoint used when `MAIL_API_URL` is not set.
const DEFAULT_API_URL: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Use STARTTLS. Disable only for local catch-all servers.
    pub starttls: bool,
}

#[derive(Debug, Clone)]
pub struct HttpApiSettings {
    pub url: String,
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub enum MailProvider {
    Smtp(SmtpSettings),
    Http(HttpApiSettings),
    /// Log messages instead of sending them.
    None,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub provider: MailProvider,
    pub from_address: String,
    /// Recipient of contact-form notifications. Notifications are skipped when unset.
    pub admin_address: Option<String>,
}

impl MailConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable             | Required          | Default                     |
    /// |----------------------|-------------------|-----------------------------|
    /// | `MAIL_PROVIDER`      | no                | `none` (`smtp`/`http`/`none`) |
    /// | `MAIL_FROM`          | no                | `noreply@storefront.local`  |
    /// | `MAIL_ADMIN_ADDRESS` | no                | none                        |
    /// | `SMTP_HOST`          | for `smtp`        |                             |
    /// | `SMTP_PORT`          | no                | `587`                       |
    /// | `SMTP_USER`          | no                |                             |
    /// | `SMTP_PASSWORD`      | no                |                             |
    /// | `SMTP_STARTTLS`      | no                | `true`                      |
    /// | `MAIL_API_URL`       | no                | SendGrid v3 endpoint        |
    /// | `MAIL_API_KEY`       | for `http`        |                             |
    pub fn from_env() -> Result<Self, MailError> {
        let provider = match std::env::var("MAIL_PROVIDER")
            .unwrap_or_else(|_| "none".into())
            .to_ascii_lowercase()
            .as_str()
        {
            "smtp" => MailProvider::Smtp(SmtpSettings {
                host: std::env::var("SMTP_HOST")
                    .map_err(|_| MailError::Config("SMTP_HOST must be set".into()))?,
                port: std::env::var("SMTP_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(DEFAULT_SMTP_PORT),
                user: std::env::var("SMTP_USER").ok(),
                password: std::env::var("SMTP_PASSWORD").ok(),
                starttls: std::env::var("SMTP_STARTTLS")
                    .map(|v| v != "false" && v != "0")
                    .unwrap_or(true),
            }),
            "http" => MailProvider::Http(HttpApiSettings {
                url: std::env::var("MAIL_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into()),
                api_key: std::env::var("MAIL_API_KEY")
                    .map_err(|_| MailError::Config("MAIL_API_KEY must be set".into()))?,
            }),
            "none" | "" => MailProvider::None,
            other => {
                return Err(MailError::Config(format!(
                    "Unknown MAIL_PROVIDER '{other}'. Must be one of: smtp, http, none"
                )))
            }
        };

        Ok(Self {
            provider,
            from_address: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            admin_address: std::env::var("MAIL_ADMIN_ADDRESS")
                .ok()
                .filter(|a| !a.trim().is_empty()),
        })
    }
}
