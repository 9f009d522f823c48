//! ElevenLabs Client - 调用 ElevenLabs Text-to-Speech API
//!
//! POST {base_url}/v1/text-to-speech/{voice_id}?output_format=mp3_44100_128
//! Headers: xi-api-key
//! Request: {"text": "...", "model_id": "eleven_monolingual_v1"}

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::application::ports::{SynthesisRequest, VoiceSynthesisError, VoiceSynthesizerPort};

use super::{read_audio, send_error};

const OUTPUT_FORMAT: &str = "mp3_44100_128";

#[derive(Debug, Serialize)]
struct TextToSpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

/// ElevenLabs 客户端配置
#[derive(Debug, Clone)]
pub struct ElevenLabsClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub model_id: String,
    /// 允许的音色 ID
    pub voices: Vec<String>,
    pub timeout_secs: u64,
}

impl ElevenLabsClientConfig {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, voices: Vec<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            model_id: "eleven_monolingual_v1".to_string(),
            voices,
            timeout_secs: 120,
        }
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// ElevenLabs 客户端
pub struct ElevenLabsClient {
    client: Client,
    config: ElevenLabsClientConfig,
}

impl ElevenLabsClient {
    pub fn new(config: ElevenLabsClientConfig) -> Result<Self, VoiceSynthesisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VoiceSynthesisError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn speech_url(&self, voice_id: &str) -> String {
        format!(
            "{}/v1/text-to-speech/{}",
            self.config.base_url.trim_end_matches('/'),
            voice_id
        )
    }
}

#[async_trait]
impl VoiceSynthesizerPort for ElevenLabsClient {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, VoiceSynthesisError> {
        if !self.supports_voice(&request.voice_id) {
            return Err(VoiceSynthesisError::UnsupportedVoice(request.voice_id.clone()));
        }

        let body = TextToSpeechRequest {
            text: &request.text,
            model_id: &self.config.model_id,
        };

        tracing::debug!(
            voice = %request.voice_id,
            text_len = request.text.len(),
            "Sending ElevenLabs request"
        );

        let response = self
            .client
            .post(self.speech_url(&request.voice_id))
            .query(&[("output_format", OUTPUT_FORMAT)])
            .header("xi-api-key", &self.config.api_key)
            .header("accept", "audio/mpeg")
            .json(&body)
            .send()
            .await
            .map_err(send_error)?;

        let audio = read_audio(response).await?;
        tracing::debug!(audio_size = audio.len(), "ElevenLabs speech synthesized");
        Ok(audio)
    }

    fn supports_voice(&self, voice_id: &str) -> bool {
        self.config.voices.iter().any(|v| v == voice_id)
    }

    fn name(&self) -> &'static str {
        "elevenlabs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VOICE: &str = "Qe9WSybioZxssVEwlBSo";

    fn client(server: &MockServer) -> ElevenLabsClient {
        ElevenLabsClient::new(ElevenLabsClientConfig::new(
            "xi-key",
            server.uri(),
            vec![VOICE.to_string()],
        ))
        .unwrap()
    }

    #[tokio::test]
    async fn test_posts_to_voice_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/v1/text-to-speech/{}", VOICE)))
            .and(query_param("output_format", "mp3_44100_128"))
            .and(header("xi-api-key", "xi-key"))
            .and(body_json(json!({"text": "Breathe.", "model_id": "eleven_monolingual_v1"})))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3audio".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let audio = client(&server)
            .synthesize(&SynthesisRequest {
                text: "Breathe.".to_string(),
                voice_id: VOICE.to_string(),
            })
            .await
            .unwrap();
        assert_eq!(audio, b"ID3audio".to_vec());
    }

    #[tokio::test]
    async fn test_voice_outside_allow_list() {
        let server = MockServer::start().await;
        let client = client(&server);

        assert!(!client.supports_voice("alloy"));
        let err = client
            .synthesize(&SynthesisRequest {
                text: "Breathe.".to_string(),
                voice_id: "alloy".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, VoiceSynthesisError::UnsupportedVoice(_)));
    }

    #[tokio::test]
    async fn test_empty_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let err = client(&server)
            .synthesize(&SynthesisRequest {
                text: "Breathe.".to_string(),
                voice_id: VOICE.to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, VoiceSynthesisError::InvalidResponse(_)));
    }
}
