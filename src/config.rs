use std::time::Duration;

/// Auth configuration: session token signing and the cron secret
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC key for session tokens; must be set in production
    pub session_secret: String,

    /// Session token lifetime in seconds
    pub session_ttl_secs: i64,

    /// Shared secret expected by the cron endpoint
    pub cron_secret: String,
}

impl AuthConfig {
    pub fn from_env() -> Option<Self> {
        let session_secret = std::env::var("SESSION_SECRET").ok()?;
        let cron_secret = std::env::var("CRON_SECRET").ok()?;

        let session_ttl_secs = std::env::var("SESSION_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(43_200); // 12 hours

        Some(Self {
            session_secret,
            session_ttl_secs,
            cron_secret,
        })
    }
}

/// Generic vendor API endpoint: base URL plus key
///
/// Every outbound client is configured the same way so tests can point
/// any of them at a local mock server.
#[derive(Debug, Clone)]
pub struct VendorApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl VendorApiConfig {
    fn from_env(prefix: &str, default_url: &str) -> Self {
        let base_url = std::env::var(format!("{}_URL", prefix))
            .unwrap_or_else(|_| default_url.to_string());
        let api_key = std::env::var(format!("{}_API_KEY", prefix)).unwrap_or_default();
        let timeout_secs = std::env::var(format!("{}_TIMEOUT_SECS", prefix))
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        Self {
            base_url,
            api_key,
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

/// Assistant (generative AI) configuration
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub api: VendorApiConfig,

    /// Models tried in order until one answers
    pub model_chain: Vec<String>,

    /// Cap on history messages sent to the vendor per request
    pub max_history: usize,
}

impl AssistantConfig {
    pub fn from_env() -> Self {
        let api = VendorApiConfig::from_env("ASSISTANT", "https://api.openai.com/v1");

        let model_chain = std::env::var("ASSISTANT_MODELS")
            .unwrap_or_else(|_| "gpt-4o,gpt-4o-mini".to_string())
            .split(',')
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();

        let max_history = std::env::var("ASSISTANT_MAX_HISTORY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(20);

        Self {
            api,
            model_chain,
            max_history,
        }
    }
}

/// Maps / geocoding vendor
#[derive(Debug, Clone)]
pub struct GeocodingConfig {
    pub api: VendorApiConfig,
}

impl GeocodingConfig {
    pub fn from_env() -> Self {
        Self {
            api: VendorApiConfig::from_env("GEOCODING", "https://maps.googleapis.com/maps/api"),
        }
    }
}

/// Statistical registry vendor (company master data by tax id)
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub api: VendorApiConfig,
}

impl RegistryConfig {
    pub fn from_env() -> Self {
        Self {
            api: VendorApiConfig::from_env("REGISTRY", "https://wl-api.mf.gov.pl/api"),
        }
    }
}

/// OCR / vision vendor
#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub api: VendorApiConfig,
}

impl VisionConfig {
    pub fn from_env() -> Self {
        Self {
            api: VendorApiConfig::from_env("VISION", "https://vision.googleapis.com/v1"),
        }
    }
}

/// Mailbox relay (shared sales inbox over HTTP)
#[derive(Debug, Clone)]
pub struct MailboxConfig {
    pub api: VendorApiConfig,

    /// Cron expression for the scheduled import
    pub schedule: String,
}

impl MailboxConfig {
    /// None when the relay is not configured; the importer is optional
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("MAILBOX_URL").ok()?;
        let api_key = std::env::var("MAILBOX_API_KEY").unwrap_or_default();
        let timeout_secs = std::env::var("MAILBOX_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        let schedule = std::env::var("MAILBOX_IMPORT_SCHEDULE")
            .unwrap_or_else(|_| "0 */15 * * * *".to_string());

        Some(Self {
            api: VendorApiConfig {
                base_url,
                api_key,
                timeout: Duration::from_secs(timeout_secs),
            },
            schedule,
        })
    }
}

/// SMTP relay for outbound report mail
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
    pub report_recipient: String,
}

impl SmtpConfig {
    /// None when SMTP is not configured; report mail is then skipped
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("SMTP_HOST").ok()?;

        Some(Self {
            host,
            port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(587),
            username: std::env::var("SMTP_USERNAME").unwrap_or_default(),
            password: std::env::var("SMTP_PASSWORD").unwrap_or_default(),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| "noreply@example.com".to_string()),
            report_recipient: std::env::var("REPORT_RECIPIENT")
                .unwrap_or_else(|_| "sales@example.com".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_config_defaults() {
        let config = VendorApiConfig::from_env("NOPE", "https://example.com/api");
        assert_eq!(config.base_url, "https://example.com/api");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_assistant_model_chain_default() {
        // Relies on ASSISTANT_MODELS being unset in the test environment
        if std::env::var("ASSISTANT_MODELS").is_ok() {
            return;
        }
        let config = AssistantConfig::from_env();
        assert_eq!(config.model_chain.len(), 2);
        assert_eq!(config.model_chain[0], "gpt-4o");
    }
}
