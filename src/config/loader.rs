//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `DORA_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `DORA_SERVER__PORT=8080`
/// - `DORA_TEXT__OPENAI__API_KEY=sk-...`
/// - `DORA_VOICE__ELEVENLABS__API_KEY=...`
/// - `DORA_AUTH__TOKEN_SECRET=...`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5060)?
        .set_default("text.timeout_secs", 120)?
        .set_default("voice.timeout_secs", 120)?
        .set_default("voice.max_concurrent", 4)?
        .set_default("audio.output_format", "wav")?
        .set_default("audio.sample_rate", 44100)?
        .set_default("audio.channels", 2)?
        .set_default("audio.bitrate", 192_000)?
        .set_default("database.path", "data/dora.db")?
        .set_default("database.max_connections", 5)?
        .set_default("storage.root_dir", "data/meditations")?
        .set_default("storage.signed_url_ttl_secs", 3600)?
        .set_default("credits.free_ceiling", 3)?
        .set_default("credits.pro_ceiling", 30)?
        .set_default("credits.reset_interval_days", 30)?
        .set_default("credits.enabled", true)?
        .set_default("credits.sweep_interval_secs", 86400)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: DORA_STORAGE__SIGNING_SECRET=...
    // 注意: 环境变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix("DORA")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.database.path.is_empty() {
        return Err(ConfigError::ValidationError(
            "Database path cannot be empty".to_string(),
        ));
    }

    if config.voice.max_concurrent == 0 {
        return Err(ConfigError::ValidationError(
            "voice.max_concurrent must be at least 1".to_string(),
        ));
    }

    if config.audio.sample_rate == 0 || config.audio.channels == 0 {
        return Err(ConfigError::ValidationError(
            "Audio sample rate and channels must be positive".to_string(),
        ));
    }

    if config.storage.signing_secret.is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.signing_secret must be set".to_string(),
        ));
    }

    if config.auth.token_secret.is_empty() {
        return Err(ConfigError::ValidationError(
            "auth.token_secret must be set".to_string(),
        ));
    }

    let hosted = &config.text.hosted;
    if hosted.base_url.is_some()
        && (hosted.poll_initial_ms == 0 || hosted.poll_max_interval_ms < hosted.poll_initial_ms)
    {
        return Err(ConfigError::ValidationError(
            "Invalid polling intervals for hosted text backend".to_string(),
        ));
    }

    let credits = &config.credits;
    if credits.free_ceiling < 0 || credits.pro_ceiling < 0 || credits.reset_interval_days <= 0 {
        return Err(ConfigError::ValidationError(
            "Credit ceilings and reset interval must be non-negative".to_string(),
        ));
    }

    if credits.enabled && credits.sweep_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Credit sweep interval cannot be 0 when the sweep is enabled".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志，不输出任何密钥）
pub fn print_config(config: &AppConfig) {
    let configured = |key: &Option<String>| key.as_ref().map_or("no", |_| "yes");

    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Public Base URL: {}", config.server.public_base_url());
    tracing::info!("Text Timeout: {}s", config.text.timeout_secs);
    tracing::info!("OpenAI Text: {} ({})", configured(&config.text.openai.api_key), config.text.openai.model);
    tracing::info!("Anthropic Text: {} ({})", configured(&config.text.anthropic.api_key), config.text.anthropic.model);
    tracing::info!("Hosted Text: {}", configured(&config.text.hosted.base_url));
    tracing::info!("Voice Timeout: {}s", config.voice.timeout_secs);
    tracing::info!("Voice Max Concurrent: {}", config.voice.max_concurrent);
    tracing::info!("OpenAI Voice: {}", configured(&config.voice.openai.api_key));
    tracing::info!("ElevenLabs Voice: {}", configured(&config.voice.elevenlabs.api_key));
    tracing::info!(
        "Audio Output: {} {}Hz {}ch",
        config.audio.output_format,
        config.audio.sample_rate,
        config.audio.channels
    );
    tracing::info!("Database: {}", config.database.path);
    tracing::info!("Storage Root: {:?}", config.storage.root_dir);
    tracing::info!("Signed URL TTL: {}s", config.storage.signed_url_ttl_secs);
    tracing::info!("Admin Endpoint: {}", configured(&config.auth.admin_secret));
    tracing::info!("Credit Sweep Enabled: {}", config.credits.enabled);
    if config.credits.enabled {
        tracing::info!("Credit Sweep Interval: {}s", config.credits.sweep_interval_secs);
    }
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn valid_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.storage.signing_secret = "signing".to_string();
        config.auth.token_secret = "token".to_string();
        config
    }

    #[test]
    fn test_validation_passes_for_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validation_requires_secrets() {
        assert!(validate_config(&AppConfig::default()).is_err());

        let mut config = valid_config();
        config.auth.token_secret = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = valid_config();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_concurrency() {
        let mut config = valid_config();
        config.voice.max_concurrent = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_bad_polling() {
        let mut config = valid_config();
        config.text.hosted.base_url = Some("http://jobs.local".to_string());
        config.text.hosted.poll_initial_ms = 1000;
        config.text.hosted.poll_max_interval_ms = 10;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9090

[storage]
signing_secret = "abc"

[auth]
token_secret = "def"

[audio]
output_format = "opus"

[voice.elevenlabs]
voices = ["voice-a"]
"#
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.audio.output_format, crate::application::ports::AudioFormat::Opus);
        assert_eq!(config.audio.sample_rate, 44100);
        assert_eq!(config.voice.elevenlabs.voices, vec!["voice-a".to_string()]);
        assert_eq!(config.credits.free_ceiling, 3);
    }
}
