use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::LlmConfig;
use crate::models::chat::ChatMessage;
use crate::services::conversation::CompletionProvider;
use crate::utils::error::ChatError;

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

/// Client for an OpenAI-compatible chat completion endpoint (DeepSeek by default)
#[derive(Clone)]
pub struct LlmService {
    client: Client,
    config: LlmConfig,
}

impl LlmService {
    pub fn new(config: LlmConfig) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ChatError::RemoteService(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Service only when a credential is configured
    pub fn from_config(config: &LlmConfig) -> Result<Option<Self>, ChatError> {
        if !config.is_configured() {
            return Ok(None);
        }
        Self::new(config.clone()).map(Some)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Generate completion without streaming (wait for full response)
    pub async fn generate_chat(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        debug!("Starting chat generation with {} messages", messages.len());

        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
        };

        let mut builder = self.client.post(self.endpoint()).json(&request);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ChatError::RemoteService(format!("Failed to call LLM API: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::RemoteService(format!(
                "LLM API error: {} - {}",
                status, body
            )));
        }

        let chat_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ChatError::RemoteService(format!("Failed to parse LLM response: {}", e)))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ChatError::RemoteService("No content returned from LLM".to_string()))
    }
}

#[async_trait::async_trait]
impl CompletionProvider for LlmService {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.generate_chat(messages)
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: String) -> LlmConfig {
        LlmConfig {
            base_url,
            api_key: Some("sk-test".to_string()),
            model: "deepseek-chat".to_string(),
            timeout_seconds: 5,
        }
    }

    fn completion(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "model": "deepseek-chat",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }]
        })
    }

    #[test]
    fn test_not_configured_without_key() {
        let mut cfg = config("http://localhost".to_string());
        cfg.api_key = None;
        assert!(LlmService::from_config(&cfg).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_generate_chat_sends_model_and_history() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "deepseek-chat",
                "messages": [
                    { "role": "system", "content": "SYS" },
                    { "role": "user", "content": "hello" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("Greetings.")))
            .expect(1)
            .mount(&server)
            .await;

        let service = LlmService::new(config(server.uri())).unwrap();
        let reply = service
            .generate_chat(&[ChatMessage::system("SYS"), ChatMessage::user("hello")])
            .await
            .unwrap();

        assert_eq!(reply, "Greetings.");
    }

    #[tokio::test]
    async fn test_non_success_status_is_remote_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let service = LlmService::new(config(server.uri())).unwrap();
        let err = service
            .generate_chat(&[ChatMessage::user("hello")])
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::RemoteService(msg) if msg.contains("500")));
    }

    #[tokio::test]
    async fn test_malformed_body_is_remote_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let service = LlmService::new(config(server.uri())).unwrap();
        assert!(service.generate_chat(&[ChatMessage::user("hi")]).await.is_err());
    }
}
