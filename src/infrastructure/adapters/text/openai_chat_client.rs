//! OpenAI Chat Client - 通过 Chat Completions 生成冥想脚本
//!
//! POST {base_url}/v1/chat/completions
//! Request: {"model", "messages": [system, user], "max_tokens", "temperature"}
//! Response: choices[0].message.content

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{non_empty_script, ScriptGenerationError, ScriptGeneratorPort};
use crate::domain::meditation::ScriptPrompt;

use super::{read_json, send_error};

/// Chat Completions 单次输出上限
const MAX_COMPLETION_TOKENS: u32 = 4096;

const TEMPERATURE: f32 = 0.5;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI Chat 客户端配置
#[derive(Debug, Clone)]
pub struct OpenAiChatClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl OpenAiChatClientConfig {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: "gpt-4-turbo-preview".to_string(),
            timeout_secs: 120,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// OpenAI Chat 客户端
pub struct OpenAiChatClient {
    client: Client,
    config: OpenAiChatClientConfig,
}

impl OpenAiChatClient {
    pub fn new(config: OpenAiChatClientConfig) -> Result<Self, ScriptGenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ScriptGenerationError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ScriptGeneratorPort for OpenAiChatClient {
    async fn generate_script(&self, prompt: &ScriptPrompt) -> Result<String, ScriptGenerationError> {
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            max_tokens: prompt.max_tokens.min(MAX_COMPLETION_TOKENS),
            temperature: TEMPERATURE,
        };

        tracing::debug!(
            url = %self.completions_url(),
            model = %self.config.model,
            max_tokens = body.max_tokens,
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(send_error)?;

        let parsed: ChatCompletionResponse = read_json(response).await?;
        let script = non_empty_script(
            parsed
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content),
        )?;

        tracing::info!(chars = script.len(), "OpenAI script generated");
        Ok(script)
    }

    fn name(&self) -> &'static str {
        "openai-chat"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn prompt(max_tokens: u32) -> ScriptPrompt {
        ScriptPrompt {
            system: "You are an expert meditation guide.".to_string(),
            user: "Write a script".to_string(),
            max_tokens,
        }
    }

    async fn client_for(server: &MockServer) -> OpenAiChatClient {
        OpenAiChatClient::new(OpenAiChatClientConfig::new("sk-test", server.uri()).with_timeout(5))
            .unwrap()
    }

    #[tokio::test]
    async fn test_generates_script_from_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4-turbo-preview",
                "max_tokens": 1000,
                "temperature": 0.5
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "Breathe in---PAUSE---Breathe out"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let script = client_for(&server).await.generate_script(&prompt(1000)).await.unwrap();
        assert_eq!(script, "Breathe in---PAUSE---Breathe out");
    }

    #[tokio::test]
    async fn test_max_tokens_is_capped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"max_tokens": 4096})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "long script"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        assert!(client_for(&server).await.generate_script(&prompt(6000)).await.is_ok());
    }

    #[tokio::test]
    async fn test_non_success_status_is_service_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.generate_script(&prompt(100)).await.unwrap_err();
        match err {
            ScriptGenerationError::ServiceError(msg) => assert!(msg.contains("429")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_content_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = client_for(&server).await.generate_script(&prompt(100)).await.unwrap_err();
        assert!(matches!(err, ScriptGenerationError::EmptyScript));
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.generate_script(&prompt(100)).await.unwrap_err();
        assert!(matches!(err, ScriptGenerationError::InvalidResponse(_)));
    }
}
