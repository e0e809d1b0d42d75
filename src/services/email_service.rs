use async_trait::async_trait;
use lettre::{
    message::MultiPart, transport::smtp::authentication::Credentials, AsyncSmtpTransport,
    AsyncTransport, Message, Tokio1Executor,
};
use serde::Serialize;
use std::{
    env,
    sync::{Arc, Mutex},
};

pub const DEFAULT_SENDGRID_API_URL: &str = "https://api.sendgrid.com";

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Failed to build email message: {0}")]
    MessageBuild(String),
    #[error("Failed to send email: {0}")]
    SendFailed(String),
    #[error("Email provider rejected the message with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// One outbound message with both HTML and plain-text bodies.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send_email(&self, email: &OutgoingEmail) -> Result<(), EmailError>;

    fn provider_name(&self) -> &'static str;
}

/// Logs messages instead of delivering them and keeps a copy of each one.
#[derive(Default)]
pub struct MockEmailService {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl MockEmailService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EmailService for MockEmailService {
    async fn send_email(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        tracing::info!("📧 [MOCK EMAIL] {} -> {}", email.from, email.to);
        tracing::info!("   Subject: {}", email.subject);
        for line in email.text_body.lines() {
            tracing::info!("   {}", line);
        }
        tracing::info!("   ---");

        if let Ok(mut sent) = self.sent.lock() {
            sent.push(email.clone());
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

#[derive(Serialize)]
struct SendGridAddress<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct SendGridPersonalization<'a> {
    to: Vec<SendGridAddress<'a>>,
    subject: &'a str,
}

#[derive(Serialize)]
struct SendGridContent<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
struct SendGridMail<'a> {
    personalizations: Vec<SendGridPersonalization<'a>>,
    from: SendGridAddress<'a>,
    content: Vec<SendGridContent<'a>>,
}

impl<'a> From<&'a OutgoingEmail> for SendGridMail<'a> {
    fn from(email: &'a OutgoingEmail) -> Self {
        SendGridMail {
            personalizations: vec![SendGridPersonalization {
                to: vec![SendGridAddress { email: &email.to }],
                subject: &email.subject,
            }],
            from: SendGridAddress { email: &email.from },
            // SendGrid requires text/plain to precede text/html
            content: vec![
                SendGridContent {
                    content_type: "text/plain",
                    value: &email.text_body,
                },
                SendGridContent {
                    content_type: "text/html",
                    value: &email.html_body,
                },
            ],
        }
    }
}

/// Delivers through the SendGrid v3 mail send API.
pub struct SendGridEmailService {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl SendGridEmailService {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_SENDGRID_API_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_env() -> Result<Self, EmailError> {
        let api_key = env::var("SENDGRID_API_KEY")
            .map_err(|_| EmailError::ConfigError("SENDGRID_API_KEY not set".to_string()))?;
        if api_key.trim().is_empty() {
            return Err(EmailError::ConfigError(
                "SENDGRID_API_KEY is empty".to_string(),
            ));
        }
        let base_url =
            env::var("SENDGRID_API_URL").unwrap_or_else(|_| DEFAULT_SENDGRID_API_URL.to_string());
        Ok(Self::with_base_url(api_key, base_url))
    }
}

#[async_trait]
impl EmailService for SendGridEmailService {
    async fn send_email(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        let response = self
            .client
            .post(format!("{}/v3/mail/send", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&SendGridMail::from(email))
            .send()
            .await
            .map_err(|e| EmailError::SendFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), "SendGrid rejected message: {}", body);
            return Err(EmailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(to = %email.to, status = status.as_u16(), "Email sent via SendGrid");
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "sendgrid"
    }
}

pub struct SmtpEmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_name: String,
}

impl SmtpEmailService {
    pub fn from_env() -> Result<Self, EmailError> {
        let smtp_host = env::var("SMTP_HOST")
            .map_err(|_| EmailError::ConfigError("SMTP_HOST not set".to_string()))?;
        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse::<u16>()
            .map_err(|_| EmailError::ConfigError("Invalid SMTP_PORT".to_string()))?;
        let smtp_username = env::var("SMTP_USERNAME")
            .map_err(|_| EmailError::ConfigError("SMTP_USERNAME not set".to_string()))?;
        let smtp_password = env::var("SMTP_PASSWORD")
            .map_err(|_| EmailError::ConfigError("SMTP_PASSWORD not set".to_string()))?;
        let from_name = env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "RunnerBee".to_string());
        let encryption = env::var("SMTP_ENCRYPTION").unwrap_or_else(|_| "starttls".to_string());

        let credentials = Credentials::new(smtp_username, smtp_password);

        let mailer = match encryption.to_lowercase().as_str() {
            "tls" => AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp_host)
                .map_err(|e| EmailError::ConfigError(format!("SMTP relay error: {}", e)))?
                .port(smtp_port)
                .credentials(credentials)
                .build(),
            "starttls" => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp_host)
                .map_err(|e| EmailError::ConfigError(format!("SMTP starttls error: {}", e)))?
                .port(smtp_port)
                .credentials(credentials)
                .build(),
            "none" => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp_host)
                .port(smtp_port)
                .credentials(credentials)
                .build(),
            _ => {
                return Err(EmailError::ConfigError(format!(
                    "Invalid SMTP_ENCRYPTION value: {}. Use 'tls', 'starttls', or 'none'",
                    encryption
                )))
            }
        };

        Ok(Self { mailer, from_name })
    }
}

#[async_trait]
impl EmailService for SmtpEmailService {
    async fn send_email(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        let message = Message::builder()
            .from(
                format!("{} <{}>", self.from_name, email.from)
                    .parse()
                    .map_err(|e| {
                        EmailError::MessageBuild(format!("Invalid from address: {}", e))
                    })?,
            )
            .to(email
                .to
                .parse()
                .map_err(|e| EmailError::MessageBuild(format!("Invalid to address: {}", e)))?)
            .subject(email.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                email.text_body.clone(),
                email.html_body.clone(),
            ))
            .map_err(|e| EmailError::MessageBuild(e.to_string()))?;

        self.mailer
            .send(message)
            .await
            .map_err(|e| EmailError::SendFailed(e.to_string()))?;

        tracing::info!(to = %email.to, "Email sent via SMTP");
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "smtp"
    }
}

/// Picks SendGrid when `SENDGRID_API_KEY` is set, then SMTP when `SMTP_HOST`
/// is set, and otherwise logs messages to the console.
pub fn create_email_service() -> Arc<dyn EmailService> {
    if env::var("SENDGRID_API_KEY").is_ok() {
        match SendGridEmailService::from_env() {
            Ok(service) => {
                tracing::info!("Using SendGrid email service");
                return Arc::new(service);
            }
            Err(e) => tracing::warn!("Failed to initialize SendGrid email service: {}", e),
        }
    }

    if env::var("SMTP_HOST").is_ok() {
        match SmtpEmailService::from_env() {
            Ok(service) => {
                tracing::info!("Using SMTP email service");
                return Arc::new(service);
            }
            Err(e) => tracing::warn!("Failed to initialize SMTP email service: {}", e),
        }
    }

    tracing::info!("No email provider configured. Using mock email service (emails will be logged to console)");
    Arc::new(MockEmailService::new())
}
