//! Audio Ports - 静音生成与音频拼接抽象

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::domain::meditation::format_duration;

/// 音频处理错误
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Task error: {0}")]
    TaskError(String),
}

/// 音频输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// 16-bit PCM WAV
    #[default]
    Wav,
    /// Ogg/Opus，固定码率
    Opus,
}

impl AudioFormat {
    /// 文件扩展名
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Opus => "ogg",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Opus => "audio/ogg",
        }
    }

    /// 根据扩展名推断格式
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "wav" => Some(AudioFormat::Wav),
            "ogg" | "opus" => Some(AudioFormat::Opus),
            _ => None,
        }
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioFormat::Wav => write!(f, "wav"),
            AudioFormat::Opus => write!(f, "opus"),
        }
    }
}

impl std::str::FromStr for AudioFormat {
    type Err = AudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "wav" => Ok(AudioFormat::Wav),
            "opus" | "ogg" => Ok(AudioFormat::Opus),
            _ => Err(AudioError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// 统一输出规格
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSpec {
    pub format: AudioFormat,
    pub sample_rate: u32,
    pub channels: u16,
    /// 目标比特率（bps），仅用于 Opus
    pub bitrate: u32,
}

impl Default for OutputSpec {
    fn default() -> Self {
        Self {
            format: AudioFormat::Wav,
            sample_rate: 44100,
            channels: 2,
            bitrate: 192_000,
        }
    }
}

/// 合成后的语音段
#[derive(Debug, Clone)]
pub struct AudioSegment {
    /// 对应脚本段落的位置
    pub index: usize,
    /// 编码后的音频字节
    pub data: Vec<u8>,
}

/// 静音片段
#[derive(Debug, Clone)]
pub struct SilenceClip {
    pub data: Vec<u8>,
    pub duration_secs: f64,
}

/// 最终冥想音频
#[derive(Debug, Clone)]
pub struct MeditationArtifact {
    pub data: Vec<u8>,
    pub format: AudioFormat,
    pub duration_ms: u64,
    pub sample_rate: u32,
    pub channels: u16,
}

impl MeditationArtifact {
    /// `m:ss` 形式的时长
    pub fn duration_string(&self) -> String {
        format_duration(self.duration_ms)
    }
}

/// Silence Synthesizer Port
pub trait SilenceSynthesizerPort: Send + Sync {
    /// 生成指定时长的静音
    fn generate_silence(&self, duration_secs: f64) -> Result<SilenceClip, AudioError>;
}

/// Audio Assembler Port
#[async_trait]
pub trait AudioAssemblerPort: Send + Sync {
    /// 按 index 排序后交错拼接语音段与静音
    async fn assemble(
        &self,
        segments: Vec<AudioSegment>,
        silence: Arc<SilenceClip>,
    ) -> Result<MeditationArtifact, AudioError>;

    /// 输出格式
    fn output_format(&self) -> AudioFormat;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("WAV".parse::<AudioFormat>().unwrap(), AudioFormat::Wav);
        assert_eq!("opus".parse::<AudioFormat>().unwrap(), AudioFormat::Opus);
        assert!("flac".parse::<AudioFormat>().is_err());
    }

    #[test]
    fn test_extensions() {
        assert_eq!(AudioFormat::Wav.extension(), "wav");
        assert_eq!(AudioFormat::Opus.extension(), "ogg");
        assert_eq!(AudioFormat::from_extension("ogg"), Some(AudioFormat::Opus));
        assert_eq!(AudioFormat::from_extension("mp4"), None);
    }

    #[test]
    fn test_artifact_duration_string() {
        let artifact = MeditationArtifact {
            data: Vec::new(),
            format: AudioFormat::Wav,
            duration_ms: 245_900,
            sample_rate: 44100,
            channels: 2,
        };
        assert_eq!(artifact.duration_string(), "4:05");
    }
}
