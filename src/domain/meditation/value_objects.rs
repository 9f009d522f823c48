//! Meditation Value Objects - 冥想生成请求的值对象

use std::fmt;

use crate::domain::script_segmenter::PAUSE_DELIMITER;

/// 冥想时长档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DurationBucket {
    /// 2-5 分钟
    Short,
    /// 5-10 分钟
    Medium,
    /// 10 分钟以上
    Long,
}

impl DurationBucket {
    pub const ALL: [DurationBucket; 3] = [
        DurationBucket::Short,
        DurationBucket::Medium,
        DurationBucket::Long,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DurationBucket::Short => "2-5min",
            DurationBucket::Medium => "5-10min",
            DurationBucket::Long => "10+min",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "2-5min" => Some(DurationBucket::Short),
            "5-10min" => Some(DurationBucket::Medium),
            "10+min" => Some(DurationBucket::Long),
            _ => None,
        }
    }

    /// 档位的平均分钟数（用于提示词中的目标时长）
    pub fn average_minutes(&self) -> u32 {
        match self {
            DurationBucket::Short => 4,
            DurationBucket::Medium => 7,
            DurationBucket::Long => 10,
        }
    }
}

impl fmt::Display for DurationBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 引导强度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuidanceLevel {
    Low,
    Medium,
    High,
}

impl GuidanceLevel {
    pub const ALL: [GuidanceLevel; 3] = [
        GuidanceLevel::Low,
        GuidanceLevel::Medium,
        GuidanceLevel::High,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GuidanceLevel::Low => "low",
            GuidanceLevel::Medium => "medium",
            GuidanceLevel::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Some(GuidanceLevel::Low),
            "medium" => Some(GuidanceLevel::Medium),
            "high" => Some(GuidanceLevel::High),
            _ => None,
        }
    }
}

impl fmt::Display for GuidanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 文本生成后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextProvider {
    OpenAi,
    Anthropic,
    /// 异步任务式托管推理服务（提交后轮询结果）
    Hosted,
}

impl TextProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextProvider::OpenAi => "openai",
            TextProvider::Anthropic => "anthropic",
            TextProvider::Hosted => "hosted",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Some(TextProvider::OpenAi),
            "anthropic" => Some(TextProvider::Anthropic),
            "hosted" => Some(TextProvider::Hosted),
            _ => None,
        }
    }
}

impl fmt::Display for TextProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 语音合成后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoiceProvider {
    OpenAi,
    ElevenLabs,
}

impl VoiceProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceProvider::OpenAi => "openai",
            VoiceProvider::ElevenLabs => "elevenlabs",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Some(VoiceProvider::OpenAi),
            "elevenlabs" => Some(VoiceProvider::ElevenLabs),
            _ => None,
        }
    }
}

impl fmt::Display for VoiceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 冥想主题
///
/// 用户输入的自由文本，进入提示词前会被规整：
/// 去除控制字符、折叠空白、截断到 [`MeditationFocus::MAX_CHARS`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeditationFocus(String);

impl MeditationFocus {
    pub const MAX_CHARS: usize = 200;
    pub const DEFAULT: &'static str = "mindfulness and breath control";

    pub fn new(raw: &str) -> Self {
        let cleaned: String = raw
            .replace(PAUSE_DELIMITER, " ")
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .chars()
            .take(Self::MAX_CHARS)
            .collect();

        if cleaned.is_empty() {
            Self(Self::DEFAULT.to_string())
        } else {
            Self(cleaned)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MeditationFocus {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

/// 冥想生成请求
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub text_provider: TextProvider,
    pub duration: DurationBucket,
    pub guidance: GuidanceLevel,
    pub voice_provider: VoiceProvider,
    /// 后端相关的音色标识
    pub voice_id: String,
    pub focus: MeditationFocus,
}
