use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::AppConfig;
use crate::errors::{AppError, Result};

/// Plain-text transactional email over SMTP.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl EmailService {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.clone(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| AppError::Email(e.to_string()))?
            .credentials(credentials)
            .build();

        Ok(EmailService {
            mailer,
            from: config.smtp_from.clone(),
        })
    }

    pub async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let message = Message::builder()
            .from(self
                .from
                .parse()
                .map_err(|_| AppError::Email(format!("invalid sender address: {}", self.from)))?)
            .to(to
                .parse()
                .map_err(|_| AppError::Email(format!("invalid recipient address: {}", to)))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::Email(e.to_string()))?;

        self.mailer
            .send(message)
            .await
            .map_err(|e| AppError::Email(e.to_string()))?;

        Ok(())
    }
}
