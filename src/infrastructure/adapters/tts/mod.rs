//! TTS Adapter - 语音合成后端实现

mod elevenlabs_client;
mod fake_tts_client;
mod openai_tts_client;

pub use elevenlabs_client::{ElevenLabsClient, ElevenLabsClientConfig};
pub use fake_tts_client::FakeTtsClient;
pub use openai_tts_client::{OpenAiTtsClient, OpenAiTtsClientConfig, OPENAI_VOICES};

use std::sync::Arc;

use crate::application::ports::VoiceSynthesisError;
use crate::application::registry::VoiceSynthesizerRegistry;
use crate::config::VoiceConfig;
use crate::domain::meditation::VoiceProvider;

pub(crate) fn send_error(e: reqwest::Error) -> VoiceSynthesisError {
    if e.is_timeout() {
        VoiceSynthesisError::Timeout
    } else if e.is_connect() {
        VoiceSynthesisError::NetworkError(format!("Cannot connect to TTS service: {}", e))
    } else {
        VoiceSynthesisError::NetworkError(e.to_string())
    }
}

/// 检查状态码并读取音频字节
pub(crate) async fn read_audio(response: reqwest::Response) -> Result<Vec<u8>, VoiceSynthesisError> {
    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(VoiceSynthesisError::ServiceError(format!(
            "HTTP {}: {}",
            status, error_text
        )));
    }

    let audio = response.bytes().await.map_err(|e| {
        if e.is_timeout() {
            VoiceSynthesisError::Timeout
        } else {
            VoiceSynthesisError::InvalidResponse(format!("Failed to read audio: {}", e))
        }
    })?;

    if audio.is_empty() {
        return Err(VoiceSynthesisError::InvalidResponse(
            "Empty audio body".to_string(),
        ));
    }

    Ok(audio.to_vec())
}

/// 按配置注册语音后端，未配置密钥的后端不注册
pub fn build_registry(config: &VoiceConfig) -> Result<VoiceSynthesizerRegistry, VoiceSynthesisError> {
    let mut registry = VoiceSynthesizerRegistry::new();

    if let Some(api_key) = &config.openai.api_key {
        let client = OpenAiTtsClient::new(
            OpenAiTtsClientConfig::new(api_key, &config.openai.base_url)
                .with_model(&config.openai.model)
                .with_timeout(config.timeout_secs),
        )?;
        registry.register(VoiceProvider::OpenAi, Arc::new(client));
    }

    let elevenlabs = &config.elevenlabs;
    if let Some(api_key) = &elevenlabs.api_key {
        let client = ElevenLabsClient::new(
            ElevenLabsClientConfig::new(api_key, &elevenlabs.base_url, elevenlabs.voices.clone())
                .with_model(&elevenlabs.model_id)
                .with_timeout(config.timeout_secs),
        )?;
        registry.register(VoiceProvider::ElevenLabs, Arc::new(client));
    }

    if registry.is_empty() {
        tracing::warn!("No voice backend configured, generation requests will be rejected");
    }

    Ok(registry)
}
