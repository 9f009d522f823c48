//! 应用层错误定义
//!
//! 统一的命令/查询错误类型，每个变体对应一个稳定的 reason 字符串

use thiserror::Error;

use crate::application::ports::{RepositoryError, ScriptGenerationError};
use crate::domain::meditation::MeditationError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 配置错误（参数表缺失等）
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// 未注册的后端或不支持的音色
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// 额度耗尽
    #[error("No credits remaining for user {user_id}")]
    QuotaExceeded { user_id: String },

    /// 文本生成失败
    #[error("Script generation failed: {0}")]
    UpstreamGeneration(String),

    /// 文本生成等待超时
    #[error("Script generation timed out: {0}")]
    UpstreamTimeout(String),

    /// 语音合成失败
    #[error("Voice synthesis failed: {0}")]
    UpstreamSynthesis(String),

    /// 静音生成失败
    #[error("Silence synthesis failed: {0}")]
    Synthesis(String),

    /// 音频拼接失败
    #[error("Audio assembly failed: {0}")]
    Assembly(String),

    /// 对象存储错误
    #[error("Storage error: {0}")]
    Storage(String),

    /// 元数据持久化错误
    #[error("Metadata error: {0}")]
    Metadata(String),

    /// 额度扣减失败
    #[error("Credit update failed: {0}")]
    CreditUpdate(String),

    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    Validation(String),

    /// 未认证
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// 创建不支持的后端错误
    pub fn unsupported_provider(message: impl Into<String>) -> Self {
        Self::UnsupportedProvider(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// 机器可读的错误原因
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::UnsupportedProvider(_) => "unsupported_provider",
            Self::QuotaExceeded { .. } => "quota_exceeded",
            Self::UpstreamGeneration(_) => "upstream_generation",
            Self::UpstreamTimeout(_) => "upstream_timeout",
            Self::UpstreamSynthesis(_) => "upstream_synthesis",
            Self::Synthesis(_) => "synthesis",
            Self::Assembly(_) => "assembly",
            Self::Storage(_) => "storage",
            Self::Metadata(_) => "metadata",
            Self::CreditUpdate(_) => "credit_update",
            Self::NotFound { .. } => "not_found",
            Self::Validation(_) => "validation",
            Self::Unauthorized(_) => "unauthorized",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        Self::Metadata(err.to_string())
    }
}

impl From<MeditationError> for ApplicationError {
    fn from(err: MeditationError) -> Self {
        Self::Configuration(err.to_string())
    }
}

impl From<ScriptGenerationError> for ApplicationError {
    fn from(err: ScriptGenerationError) -> Self {
        match err {
            ScriptGenerationError::PollTimeout { .. } => Self::UpstreamTimeout(err.to_string()),
            _ => Self::UpstreamGeneration(err.to_string()),
        }
    }
}
