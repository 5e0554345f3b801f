use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::config::MailboxConfig;

/// Errors from the mailbox relay
#[derive(Debug, Error)]
pub enum MailboxError {
    #[error("Mailbox request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Mailbox relay returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("Attachment {0} is not valid base64")]
    BadAttachment(String),
}

/// An unread message in the shared sales inbox
#[derive(Debug, Clone, Deserialize)]
pub struct MailboxMessage {
    pub id: String,
    pub subject: String,
    pub from: String,
    #[serde(default)]
    pub attachments: Vec<MailboxAttachment>,
}

/// A base64-encoded attachment
#[derive(Debug, Clone, Deserialize)]
pub struct MailboxAttachment {
    pub filename: String,
    pub content_base64: String,
}

impl MailboxAttachment {
    /// Decode the attachment body
    pub fn decode(&self) -> Result<Vec<u8>, MailboxError> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.content_base64)
            .map_err(|_| MailboxError::BadAttachment(self.filename.clone()))
    }

    /// CSV attachments are the only ones the importer touches
    pub fn is_csv(&self) -> bool {
        self.filename.to_lowercase().ends_with(".csv")
    }
}

/// Client for the HTTP relay in front of the shared sales inbox
pub struct MailboxClient {
    client: Client,
    config: MailboxConfig,
}

impl MailboxClient {
    pub fn new(config: MailboxConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(config.api.timeout)
                .build()
                .unwrap_or_default(),
            config,
        }
    }

    /// List unread messages with their attachments
    pub async fn fetch_unread(&self) -> Result<Vec<MailboxMessage>, MailboxError> {
        let url = format!("{}/messages/unread", self.config.api.base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.api.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MailboxError::Status(response.status()));
        }

        Ok(response.json().await?)
    }

    /// Mark a message processed so the next poll skips it
    pub async fn mark_processed(&self, message_id: &str) -> Result<(), MailboxError> {
        let url = format!(
            "{}/messages/{}/processed",
            self.config.api.base_url, message_id
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MailboxError::Status(response.status()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_decode() {
        let attachment = MailboxAttachment {
            filename: "rdn_2025-06-12.csv".to_string(),
            content_base64: "ZGF0ZTtob3VyO3ByaWNl".to_string(), // "date;hour;price"
        };

        assert!(attachment.is_csv());
        assert_eq!(attachment.decode().unwrap(), b"date;hour;price");
    }

    #[test]
    fn test_attachment_bad_base64() {
        let attachment = MailboxAttachment {
            filename: "x.csv".to_string(),
            content_base64: "not base64 !!".to_string(),
        };

        assert!(matches!(
            attachment.decode(),
            Err(MailboxError::BadAttachment(_))
        ));
    }

    #[test]
    fn test_non_csv_attachment() {
        let attachment = MailboxAttachment {
            filename: "logo.PNG".to_string(),
            content_base64: String::new(),
        };
        assert!(!attachment.is_csv());
    }
}
