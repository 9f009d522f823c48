//! Voice Synthesizer Port - 语音合成抽象
//!
//! 每次调用合成一个脚本段落，返回编码后的音频字节（通常为 MP3）

use async_trait::async_trait;
use thiserror::Error;

/// 语音合成错误
#[derive(Debug, Error)]
pub enum VoiceSynthesisError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Voice not supported: {0}")]
    UnsupportedVoice(String),
}

/// 语音合成请求
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    /// 要朗读的段落文本
    pub text: String,
    /// 后端相关的音色标识
    pub voice_id: String,
}

/// Voice Synthesizer Port
#[async_trait]
pub trait VoiceSynthesizerPort: Send + Sync {
    /// 合成一段语音
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, VoiceSynthesisError>;

    /// 是否支持该音色
    fn supports_voice(&self, voice_id: &str) -> bool {
        !voice_id.trim().is_empty()
    }

    /// 后端名称（用于日志）
    fn name(&self) -> &'static str;
}
