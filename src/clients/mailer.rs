use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use crate::config::SmtpConfig;

/// Errors from the SMTP relay
#[derive(Debug, Error)]
pub enum MailerError {
    #[error("Invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP submission failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Outbound report mail over the configured SMTP relay
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    config: SmtpConfig,
}

impl Mailer {
    pub fn new(config: SmtpConfig) -> Result<Self, MailerError> {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?.port(config.port);

        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            config,
        })
    }

    /// Send a plain-text report to the configured recipient
    pub async fn send_report(&self, subject: &str, body: String) -> Result<(), MailerError> {
        let message = Message::builder()
            .from(self.config.from_address.parse()?)
            .to(self.config.report_recipient.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)?;

        self.transport.send(message).await?;

        tracing::info!(
            "Report mail '{}' sent to {}",
            subject,
            self.config.report_recipient
        );

        Ok(())
    }
}
