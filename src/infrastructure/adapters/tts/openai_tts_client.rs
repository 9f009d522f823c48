//! OpenAI TTS Client - 调用 OpenAI Speech API
//!
//! POST {base_url}/v1/audio/speech
//! Request: {"model": "tts-1", "input": "...", "voice": "alloy", "response_format": "mp3"}
//! Response: audio/mpeg binary

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::application::ports::{SynthesisRequest, VoiceSynthesisError, VoiceSynthesizerPort};

use super::{read_audio, send_error};

/// OpenAI 支持的音色
pub const OPENAI_VOICES: &[&str] = &["alloy", "echo", "fable", "onyx", "nova", "shimmer"];

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'static str,
}

/// OpenAI TTS 客户端配置
#[derive(Debug, Clone)]
pub struct OpenAiTtsClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl OpenAiTtsClientConfig {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: "tts-1".to_string(),
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

/// OpenAI TTS 客户端
pub struct OpenAiTtsClient {
    client: Client,
    config: OpenAiTtsClientConfig,
}

impl OpenAiTtsClient {
    pub fn new(config: OpenAiTtsClientConfig) -> Result<Self, VoiceSynthesisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VoiceSynthesisError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn speech_url(&self) -> String {
        format!("{}/v1/audio/speech", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl VoiceSynthesizerPort for OpenAiTtsClient {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, VoiceSynthesisError> {
        if !self.supports_voice(&request.voice_id) {
            return Err(VoiceSynthesisError::UnsupportedVoice(request.voice_id.clone()));
        }

        let body = SpeechRequest {
            model: &self.config.model,
            input: &request.text,
            voice: &request.voice_id,
            response_format: "mp3",
        };

        tracing::debug!(
            url = %self.speech_url(),
            text_len = request.text.len(),
            voice = %request.voice_id,
            "Sending speech request"
        );

        let response = self
            .client
            .post(self.speech_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(send_error)?;

        let audio = read_audio(response).await?;
        tracing::debug!(audio_size = audio.len(), "OpenAI speech synthesized");
        Ok(audio)
    }

    fn supports_voice(&self, voice_id: &str) -> bool {
        OPENAI_VOICES.contains(&voice_id)
    }

    fn name(&self) -> &'static str {
        "openai-tts"
    }
}
