//! Fake TTS Client - 用于测试的语音合成后端
//!
//! 为每个段落生成一段短正弦音 WAV，不调用任何外部服务

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::application::ports::{SynthesisRequest, VoiceSynthesisError, VoiceSynthesizerPort};
use crate::infrastructure::adapters::audio::encode_wav;

const SAMPLE_RATE: u32 = 24000;
const TONE_HZ: f32 = 440.0;

/// Fake TTS Client
pub struct FakeTtsClient {
    /// None 表示接受任何非空音色
    voices: Option<Vec<String>>,
    tone_secs: f32,
    /// 按段落文本设置的模拟延迟
    delays: HashMap<String, Duration>,
    /// 第 n 次调用失败（从 1 开始）
    fail_on_call: Option<usize>,
    calls: AtomicUsize,
    started: Mutex<Vec<String>>,
    completed: Mutex<Vec<String>>,
}

impl FakeTtsClient {
    pub fn new() -> Self {
        Self {
            voices: None,
            tone_secs: 0.25,
            delays: HashMap::new(),
            fail_on_call: None,
            calls: AtomicUsize::new(0),
            started: Mutex::new(Vec::new()),
            completed: Mutex::new(Vec::new()),
        }
    }

    /// 只接受给定音色
    pub fn with_voices(voices: Vec<String>) -> Self {
        Self {
            voices: Some(voices),
            ..Self::new()
        }
    }

    pub fn with_delay(mut self, text: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(text.into(), delay);
        self
    }

    pub fn fail_on_call(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// 调用开始顺序
    pub fn started(&self) -> Vec<String> {
        Self::snapshot(&self.started)
    }

    /// 调用完成顺序
    pub fn completed(&self) -> Vec<String> {
        Self::snapshot(&self.completed)
    }

    fn snapshot(log: &Mutex<Vec<String>>) -> Vec<String> {
        log.lock().map(|entries| entries.clone()).unwrap_or_default()
    }

    fn record(log: &Mutex<Vec<String>>, text: &str) {
        if let Ok(mut entries) = log.lock() {
            entries.push(text.to_string());
        }
    }

    fn tone(&self) -> Result<Vec<u8>, VoiceSynthesisError> {
        let frames = (self.tone_secs * SAMPLE_RATE as f32) as usize;
        let samples: Vec<i16> = (0..frames)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                ((t * TONE_HZ * std::f32::consts::TAU).sin() * 8000.0) as i16
            })
            .collect();
        encode_wav(&samples, SAMPLE_RATE, 1)
            .map_err(|e| VoiceSynthesisError::InvalidResponse(e.to_string()))
    }
}

impl Default for FakeTtsClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VoiceSynthesizerPort for FakeTtsClient {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, VoiceSynthesisError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Self::record(&self.started, &request.text);

        tracing::debug!(
            call = call,
            text_len = request.text.len(),
            voice_id = %request.voice_id,
            "FakeTtsClient: synthesizing tone"
        );

        if let Some(delay) = self.delays.get(&request.text) {
            tokio::time::sleep(*delay).await;
        }

        if self.fail_on_call == Some(call) {
            return Err(VoiceSynthesisError::ServiceError(
                "HTTP 500 Internal Server Error: fake failure".to_string(),
            ));
        }

        let audio = self.tone()?;
        Self::record(&self.completed, &request.text);
        Ok(audio)
    }

    fn supports_voice(&self, voice_id: &str) -> bool {
        match &self.voices {
            Some(voices) => voices.iter().any(|v| v == voice_id),
            None => !voice_id.trim().is_empty(),
        }
    }

    fn name(&self) -> &'static str {
        "fake-tts"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::audio::pcm::decode;

    fn request(text: &str) -> SynthesisRequest {
        SynthesisRequest {
            text: text.to_string(),
            voice_id: "alloy".to_string(),
        }
    }

    #[tokio::test]
    async fn test_returns_decodable_audio() {
        let client = FakeTtsClient::new();
        let audio = client.synthesize(&request("hello")).await.unwrap();

        let pcm = decode(&audio).unwrap();
        assert_eq!(pcm.sample_rate, SAMPLE_RATE);
        assert_eq!(pcm.frames(), 6000);
        assert_eq!(client.call_count(), 1);
        assert_eq!(client.completed(), vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn test_fails_on_configured_call() {
        let client = FakeTtsClient::new().fail_on_call(2);
        assert!(client.synthesize(&request("a")).await.is_ok());
        assert!(client.synthesize(&request("b")).await.is_err());
        assert!(client.synthesize(&request("c")).await.is_ok());
        assert_eq!(client.started().len(), 3);
        assert_eq!(client.completed(), vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_voice_allow_list() {
        let client = FakeTtsClient::with_voices(vec!["nova".to_string()]);
        assert!(client.supports_voice("nova"));
        assert!(!client.supports_voice("alloy"));
        assert!(FakeTtsClient::new().supports_voice("anything"));
        assert!(!FakeTtsClient::new().supports_voice("  "));
    }
}
