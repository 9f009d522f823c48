//! Anthropic Client - 通过 Messages API 生成冥想脚本
//!
//! POST {base_url}/v1/messages
//! Headers: x-api-key, anthropic-version
//! Response: content[] 中首个 text 块

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{non_empty_script, ScriptGenerationError, ScriptGeneratorPort};
use crate::domain::meditation::ScriptPrompt;

use super::{read_json, send_error};

/// Messages API 固定输出上限
const MAX_TOKENS: u32 = 4000;

const TEMPERATURE: f32 = 0.5;

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    system: &'a str,
    messages: Vec<UserMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Anthropic 客户端配置
#[derive(Debug, Clone)]
pub struct AnthropicClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub api_version: String,
    pub timeout_secs: u64,
}

impl AnthropicClientConfig {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: "claude-3-haiku-20240307".to_string(),
            api_version: "2023-06-01".to_string(),
            timeout_secs: 120,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Anthropic 客户端
pub struct AnthropicClient {
    client: Client,
    config: AnthropicClientConfig,
}

impl AnthropicClient {
    pub fn new(config: AnthropicClientConfig) -> Result<Self, ScriptGenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ScriptGenerationError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ScriptGeneratorPort for AnthropicClient {
    async fn generate_script(&self, prompt: &ScriptPrompt) -> Result<String, ScriptGenerationError> {
        let body = MessagesRequest {
            model: &self.config.model,
            system: &prompt.system,
            messages: vec![UserMessage {
                role: "user",
                content: &prompt.user,
            }],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        tracing::debug!(
            url = %self.messages_url(),
            model = %self.config.model,
            "Sending messages request"
        );

        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", &self.config.api_version)
            .json(&body)
            .send()
            .await
            .map_err(send_error)?;

        let parsed: MessagesResponse = read_json(response).await?;
        let script = non_empty_script(
            parsed
                .content
                .into_iter()
                .find(|block| block.kind == "text")
                .and_then(|block| block.text),
        )?;

        tracing::info!(chars = script.len(), "Anthropic script generated");
        Ok(script)
    }

    fn name(&self) -> &'static str {
        "anthropic-messages"
    }
}
