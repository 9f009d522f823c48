//! Text Adapter - 文本生成后端实现

mod anthropic_client;
mod fake_script_client;
mod job_polling_client;
mod openai_chat_client;

pub use anthropic_client::{AnthropicClient, AnthropicClientConfig};
pub use fake_script_client::{FakeScriptClient, FakeScriptFailure};
pub use job_polling_client::{JobPollingClientConfig, JobPollingScriptClient};
pub use openai_chat_client::{OpenAiChatClient, OpenAiChatClientConfig};

use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::ScriptGenerationError;
use crate::application::registry::ScriptGeneratorRegistry;
use crate::config::TextConfig;
use crate::domain::meditation::TextProvider;

/// reqwest 发送错误映射
pub(crate) fn send_error(e: reqwest::Error) -> ScriptGenerationError {
    if e.is_timeout() {
        ScriptGenerationError::Timeout
    } else if e.is_connect() {
        ScriptGenerationError::NetworkError(format!("Cannot connect to text backend: {}", e))
    } else {
        ScriptGenerationError::NetworkError(e.to_string())
    }
}

/// 检查状态码并解析 JSON 响应体
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ScriptGenerationError> {
    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(ScriptGenerationError::ServiceError(format!(
            "HTTP {}: {}",
            status, error_text
        )));
    }

    let body = response.bytes().await.map_err(|e| {
        if e.is_timeout() {
            ScriptGenerationError::Timeout
        } else {
            ScriptGenerationError::InvalidResponse(format!("Failed to read body: {}", e))
        }
    })?;

    serde_json::from_slice(&body)
        .map_err(|e| ScriptGenerationError::InvalidResponse(format!("Malformed JSON: {}", e)))
}

/// 按配置注册文本后端，未配置密钥的后端不注册
pub fn build_registry(config: &TextConfig) -> Result<ScriptGeneratorRegistry, ScriptGenerationError> {
    let mut registry = ScriptGeneratorRegistry::new();

    if let Some(api_key) = &config.openai.api_key {
        let client = OpenAiChatClient::new(
            OpenAiChatClientConfig::new(api_key, &config.openai.base_url)
                .with_model(&config.openai.model)
                .with_timeout(config.timeout_secs),
        )?;
        registry.register(TextProvider::OpenAi, Arc::new(client));
    }

    if let Some(api_key) = &config.anthropic.api_key {
        let client = AnthropicClient::new(
            AnthropicClientConfig::new(api_key, &config.anthropic.base_url)
                .with_model(&config.anthropic.model)
                .with_api_version(&config.anthropic.api_version)
                .with_timeout(config.timeout_secs),
        )?;
        registry.register(TextProvider::Anthropic, Arc::new(client));
    }

    let hosted = &config.hosted;
    if let Some(base_url) = &hosted.base_url {
        let mut client_config = JobPollingClientConfig::new(base_url, &hosted.model)
            .with_api_key(hosted.api_key.clone())
            .with_backoff(
                Duration::from_millis(hosted.poll_initial_ms),
                Duration::from_millis(hosted.poll_max_interval_ms),
            )
            .with_max_wait(Duration::from_secs(hosted.poll_max_wait_secs));
        client_config.request_timeout = Duration::from_secs(config.timeout_secs);
        registry.register(TextProvider::Hosted, Arc::new(JobPollingScriptClient::new(client_config)?));
    }

    if registry.is_empty() {
        tracing::warn!("No text backend configured, generation requests will be rejected");
    }

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_only_contains_configured_backends() {
        let mut config = TextConfig::default();
        assert!(build_registry(&config).unwrap().is_empty());

        config.anthropic.api_key = Some("key".to_string());
        config.hosted.base_url = Some("http://jobs.local".to_string());
        let registry = build_registry(&config).unwrap();

        assert!(registry.get(TextProvider::Anthropic).is_ok());
        assert!(registry.get(TextProvider::Hosted).is_ok());
        assert!(registry.get(TextProvider::OpenAi).is_err());
    }
}
