//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use crate::application::ports::{AudioFormat, OutputSpec};
use crate::domain::CreditPolicy;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 文本生成后端配置
    #[serde(default)]
    pub text: TextConfig,

    /// 语音合成后端配置
    #[serde(default)]
    pub voice: VoiceConfig,

    /// 音频输出配置
    #[serde(default)]
    pub audio: AudioConfig,

    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,

    /// 对象存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 认证配置
    #[serde(default)]
    pub auth: AuthConfig,

    /// 额度配置
    #[serde(default)]
    pub credits: CreditsConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 公开访问的 Base URL（签名链接使用）
    /// 如果未设置，则使用 http://{host}:{port}
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5060
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: None,
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// 获取公开的 Base URL
    pub fn public_base_url(&self) -> String {
        self.base_url.clone().unwrap_or_else(|| {
            let host = if self.host == "0.0.0.0" {
                "localhost"
            } else {
                &self.host
            };
            format!("http://{}:{}", host, self.port)
        })
    }
}

/// 文本生成后端配置
#[derive(Debug, Clone, Deserialize)]
pub struct TextConfig {
    /// 单次请求超时（秒）
    #[serde(default = "default_text_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub openai: OpenAiTextConfig,

    #[serde(default)]
    pub anthropic: AnthropicTextConfig,

    #[serde(default)]
    pub hosted: HostedTextConfig,
}

fn default_text_timeout() -> u64 {
    120
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_text_timeout(),
            openai: OpenAiTextConfig::default(),
            anthropic: AnthropicTextConfig::default(),
            hosted: HostedTextConfig::default(),
        }
    }
}

/// OpenAI Chat Completions
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiTextConfig {
    /// 未配置则不注册该后端
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    #[serde(default = "default_openai_text_model")]
    pub model: String,
}

fn default_openai_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_openai_text_model() -> String {
    "gpt-4-turbo-preview".to_string()
}

impl Default for OpenAiTextConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_base_url(),
            model: default_openai_text_model(),
        }
    }
}

/// Anthropic Messages
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicTextConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_anthropic_base_url")]
    pub base_url: String,

    #[serde(default = "default_anthropic_model")]
    pub model: String,

    #[serde(default = "default_anthropic_version")]
    pub api_version: String,
}

fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-haiku-20240307".to_string()
}

fn default_anthropic_version() -> String {
    "2023-06-01".to_string()
}

impl Default for AnthropicTextConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_anthropic_base_url(),
            model: default_anthropic_model(),
            api_version: default_anthropic_version(),
        }
    }
}

/// 异步作业式文本后端（提交后轮询）
#[derive(Debug, Clone, Deserialize)]
pub struct HostedTextConfig {
    /// 未配置则不注册该后端
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_hosted_model")]
    pub model: String,

    /// 首次轮询间隔（毫秒）
    #[serde(default = "default_poll_initial_ms")]
    pub poll_initial_ms: u64,

    /// 轮询间隔上限（毫秒）
    #[serde(default = "default_poll_max_interval_ms")]
    pub poll_max_interval_ms: u64,

    /// 最长等待时间（秒）
    #[serde(default = "default_poll_max_wait_secs")]
    pub poll_max_wait_secs: u64,
}

fn default_hosted_model() -> String {
    "meta/meta-llama-3-70b-instruct".to_string()
}

fn default_poll_initial_ms() -> u64 {
    500
}

fn default_poll_max_interval_ms() -> u64 {
    8000
}

fn default_poll_max_wait_secs() -> u64 {
    300
}

impl Default for HostedTextConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            model: default_hosted_model(),
            poll_initial_ms: default_poll_initial_ms(),
            poll_max_interval_ms: default_poll_max_interval_ms(),
            poll_max_wait_secs: default_poll_max_wait_secs(),
        }
    }
}

/// 语音合成后端配置
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceConfig {
    /// 单次请求超时（秒）
    #[serde(default = "default_voice_timeout")]
    pub timeout_secs: u64,

    /// 段落合成最大并发数
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    #[serde(default)]
    pub openai: OpenAiVoiceConfig,

    #[serde(default)]
    pub elevenlabs: ElevenLabsVoiceConfig,
}

fn default_voice_timeout() -> u64 {
    120
}

fn default_max_concurrent() -> usize {
    4
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_voice_timeout(),
            max_concurrent: default_max_concurrent(),
            openai: OpenAiVoiceConfig::default(),
            elevenlabs: ElevenLabsVoiceConfig::default(),
        }
    }
}

/// OpenAI Speech
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiVoiceConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    #[serde(default = "default_openai_tts_model")]
    pub model: String,
}

fn default_openai_tts_model() -> String {
    "tts-1".to_string()
}

impl Default for OpenAiVoiceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_base_url(),
            model: default_openai_tts_model(),
        }
    }
}

/// ElevenLabs Text-to-Speech
#[derive(Debug, Clone, Deserialize)]
pub struct ElevenLabsVoiceConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_elevenlabs_base_url")]
    pub base_url: String,

    #[serde(default = "default_elevenlabs_model")]
    pub model_id: String,

    /// 允许使用的音色 ID
    #[serde(default = "default_elevenlabs_voices")]
    pub voices: Vec<String>,
}

fn default_elevenlabs_base_url() -> String {
    "https://api.elevenlabs.io".to_string()
}

fn default_elevenlabs_model() -> String {
    "eleven_monolingual_v1".to_string()
}

fn default_elevenlabs_voices() -> Vec<String> {
    [
        "Qe9WSybioZxssVEwlBSo",
        "RrkF2QZOPA1PyW4EamJj",
        "h9wTb50iJC9oQuw5A37H",
        "h415g7h7bSwQrn1qw4ar",
        "fqQpqTuOIBHOwbVaVZP3",
        "XPzm47Wm41jCR5gentJy",
    ]
    .iter()
    .map(|id| id.to_string())
    .collect()
}

impl Default for ElevenLabsVoiceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_elevenlabs_base_url(),
            model_id: default_elevenlabs_model(),
            voices: default_elevenlabs_voices(),
        }
    }
}

/// 音频输出配置
#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// 输出格式
    /// 可选: wav, opus
    #[serde(default)]
    pub output_format: AudioFormat,

    /// 目标采样率（Hz）
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// 声道数
    #[serde(default = "default_channels")]
    pub channels: u16,

    /// 目标比特率（bps），仅 Opus 使用
    #[serde(default = "default_bitrate")]
    pub bitrate: u32,
}

fn default_sample_rate() -> u32 {
    44100
}

fn default_channels() -> u16 {
    2
}

fn default_bitrate() -> u32 {
    192_000
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            output_format: AudioFormat::Wav,
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            bitrate: default_bitrate(),
        }
    }
}

impl AudioConfig {
    pub fn output_spec(&self) -> OutputSpec {
        OutputSpec {
            format: self.output_format,
            sample_rate: self.sample_rate,
            channels: self.channels,
            bitrate: self.bitrate,
        }
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/dora.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// 获取数据库 URL
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.path)
    }
}

/// 对象存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 冥想音频根目录
    #[serde(default = "default_storage_root")]
    pub root_dir: PathBuf,

    /// 签名链接密钥
    #[serde(default)]
    pub signing_secret: String,

    /// 签名链接有效期（秒）
    #[serde(default = "default_signed_url_ttl")]
    pub signed_url_ttl_secs: u64,

    /// 签名链接的 Base URL，未设置时使用 server.public_base_url()
    #[serde(default)]
    pub public_base_url: Option<String>,
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("data/meditations")
}

fn default_signed_url_ttl() -> u64 {
    3600
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_dir: default_storage_root(),
            signing_secret: String::new(),
            signed_url_ttl_secs: default_signed_url_ttl(),
            public_base_url: None,
        }
    }
}

/// 认证配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// 会话令牌签名密钥
    #[serde(default)]
    pub token_secret: String,

    /// 管理接口密钥（X-Admin-Secret），为空则禁用管理接口
    #[serde(default)]
    pub admin_secret: Option<String>,
}

/// 额度配置
#[derive(Debug, Clone, Deserialize)]
pub struct CreditsConfig {
    #[serde(default = "default_free_ceiling")]
    pub free_ceiling: i64,

    #[serde(default = "default_pro_ceiling")]
    pub pro_ceiling: i64,

    /// 重置周期（天）
    #[serde(default = "default_reset_interval_days")]
    pub reset_interval_days: i64,

    /// 是否启用定时重置
    #[serde(default = "default_sweep_enabled")]
    pub enabled: bool,

    /// 重置检查间隔（秒）
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

fn default_free_ceiling() -> i64 {
    3
}

fn default_pro_ceiling() -> i64 {
    30
}

fn default_reset_interval_days() -> i64 {
    30
}

fn default_sweep_enabled() -> bool {
    true
}

fn default_sweep_interval() -> u64 {
    86400 // 1 天
}

impl Default for CreditsConfig {
    fn default() -> Self {
        Self {
            free_ceiling: default_free_ceiling(),
            pro_ceiling: default_pro_ceiling(),
            reset_interval_days: default_reset_interval_days(),
            enabled: default_sweep_enabled(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

impl CreditsConfig {
    pub fn policy(&self) -> CreditPolicy {
        CreditPolicy {
            free_ceiling: self.free_ceiling,
            pro_ceiling: self.pro_ceiling,
            reset_interval_days: self.reset_interval_days,
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
