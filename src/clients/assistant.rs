use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AssistantConfig;
use crate::database::enums::ChatRole;

/// Errors from the generative-AI vendor
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Assistant request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Assistant API returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("Assistant returned no choices")]
    EmptyResponse,

    #[error("All models in the fallback chain failed, last error: {0}")]
    ChainExhausted(String),
}

/// One message in vendor wire format
#[derive(Debug, Clone, Serialize)]
pub struct WireMessage {
    pub role: &'static str,
    pub content: String,
}

impl WireMessage {
    pub fn new(role: ChatRole, content: String) -> Self {
        Self {
            role: role.as_str(),
            content,
        }
    }
}

/// Assistant answer plus the model that produced it
#[derive(Debug, Clone)]
pub struct AssistantReply {
    pub content: String,
    pub model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [WireMessage],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Chat-completions client with an ordered model-fallback chain
///
/// Each model in the chain is tried once; transport errors, 5xx, and 429
/// move on to the next model, any other status fails immediately (a bad
/// request will not get better on a different model).
pub struct AssistantClient {
    client: Client,
    config: AssistantConfig,
}

impl AssistantClient {
    pub fn new(config: AssistantConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(config.api.timeout)
                .build()
                .unwrap_or_default(),
            config,
        }
    }

    pub async fn chat(&self, messages: &[WireMessage]) -> Result<AssistantReply, AssistantError> {
        let mut last_error = String::from("no models configured");

        for model in &self.config.model_chain {
            match self.chat_with_model(model, messages).await {
                Ok(reply) => return Ok(reply),
                Err(err) if is_retriable(&err) => {
                    tracing::warn!("Model {} failed, trying next in chain: {}", model, err);
                    last_error = err.to_string();
                }
                Err(err) => return Err(err),
            }
        }

        Err(AssistantError::ChainExhausted(last_error))
    }

    async fn chat_with_model(
        &self,
        model: &str,
        messages: &[WireMessage],
    ) -> Result<AssistantReply, AssistantError> {
        let url = format!("{}/chat/completions", self.config.api.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api.api_key)
            .json(&ChatRequest { model, messages })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AssistantError::Status(response.status()));
        }

        let body: ChatResponse = response.json().await?;

        let content = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(AssistantError::EmptyResponse)?;

        Ok(AssistantReply {
            content,
            model: model.to_string(),
        })
    }

    /// Trim conversation history to the configured window, keeping the
    /// leading system message
    pub fn clamp_history(&self, messages: Vec<WireMessage>) -> Vec<WireMessage> {
        let max = self.config.max_history;
        if messages.len() <= max {
            return messages;
        }

        let mut clamped = Vec::with_capacity(max);
        let mut rest_budget = max;

        if let Some(first) = messages.first() {
            if first.role == "system" {
                clamped.push(first.clone());
                rest_budget = max.saturating_sub(1);
            }
        }

        let tail_start = messages.len() - rest_budget;
        clamped.extend(messages[tail_start..].iter().cloned());
        clamped
    }
}

fn is_retriable(err: &AssistantError) -> bool {
    match err {
        AssistantError::Transport(_) => true,
        AssistantError::Status(status) => {
            status.is_server_error() || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VendorApiConfig;
    use std::time::Duration;

    fn client(max_history: usize) -> AssistantClient {
        AssistantClient::new(AssistantConfig {
            api: VendorApiConfig {
                base_url: "http://localhost:9".to_string(),
                api_key: String::new(),
                timeout: Duration::from_secs(1),
            },
            model_chain: vec!["a".to_string(), "b".to_string()],
            max_history,
        })
    }

    fn msg(role: ChatRole, content: &str) -> WireMessage {
        WireMessage::new(role, content.to_string())
    }

    #[test]
    fn test_clamp_history_keeps_system_prompt() {
        let client = client(3);
        let messages = vec![
            msg(ChatRole::System, "ctx"),
            msg(ChatRole::User, "1"),
            msg(ChatRole::Assistant, "2"),
            msg(ChatRole::User, "3"),
            msg(ChatRole::Assistant, "4"),
        ];

        let clamped = client.clamp_history(messages);

        assert_eq!(clamped.len(), 3);
        assert_eq!(clamped[0].role, "system");
        assert_eq!(clamped[1].content, "3");
        assert_eq!(clamped[2].content, "4");
    }

    #[test]
    fn test_clamp_history_noop_when_short() {
        let client = client(10);
        let messages = vec![msg(ChatRole::User, "hi")];
        assert_eq!(client.clamp_history(messages).len(), 1);
    }

    #[test]
    fn test_retriable_classification() {
        assert!(is_retriable(&AssistantError::Status(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR
        )));
        assert!(is_retriable(&AssistantError::Status(
            reqwest::StatusCode::TOO_MANY_REQUESTS
        )));
        assert!(!is_retriable(&AssistantError::Status(
            reqwest::StatusCode::BAD_REQUEST
        )));
        assert!(!is_retriable(&AssistantError::EmptyResponse));
    }
}
