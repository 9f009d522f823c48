//! Script Generator Port - 冥想脚本文本生成抽象
//!
//! 具体实现在 infrastructure/adapters/text

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::meditation::ScriptPrompt;

/// 文本生成错误
#[derive(Debug, Error)]
pub enum ScriptGenerationError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Backend returned an empty script")]
    EmptyScript,

    #[error("Generation job failed: {0}")]
    JobFailed(String),

    /// 轮询式后端超过最长等待时间
    #[error("Generation job {job_id} did not finish within {waited_secs}s")]
    PollTimeout { job_id: String, waited_secs: u64 },
}

/// Script Generator Port
#[async_trait]
pub trait ScriptGeneratorPort: Send + Sync {
    /// 根据提示词生成完整脚本
    async fn generate_script(&self, prompt: &ScriptPrompt) -> Result<String, ScriptGenerationError>;

    /// 后端名称（用于日志）
    fn name(&self) -> &'static str;
}

/// 校验后端返回的脚本文本
pub fn non_empty_script(script: Option<String>) -> Result<String, ScriptGenerationError> {
    match script {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ScriptGenerationError::EmptyScript),
    }
}
