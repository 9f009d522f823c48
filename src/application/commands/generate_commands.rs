//! Generate Commands - 冥想生成命令与进度事件

use uuid::Uuid;

use crate::domain::meditation::GenerationRequest;

/// 生成冥想命令
#[derive(Debug, Clone)]
pub struct GenerateMeditationCommand {
    pub user_id: String,
    pub request: GenerationRequest,
}

/// 生成冥想响应
#[derive(Debug, Clone)]
pub struct GenerateMeditationResponse {
    pub meditation_id: Uuid,
    pub message: String,
    /// `m:ss`
    pub duration: String,
}

/// 生成流程状态
///
/// QuotaChecked → ScriptRequested → ScriptReceived → SegmentsSynthesizing
/// → SilenceReady → Assembling → Persisting → Completed；
/// QuotaChecked 之后任一状态都可能进入 Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    QuotaChecked,
    ScriptRequested,
    ScriptReceived,
    SegmentsSynthesizing,
    SilenceReady,
    Assembling,
    Persisting,
    Completed,
    Failed,
}

impl GenerationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationState::QuotaChecked => "quota_checked",
            GenerationState::ScriptRequested => "script_requested",
            GenerationState::ScriptReceived => "script_received",
            GenerationState::SegmentsSynthesizing => "segments_synthesizing",
            GenerationState::SilenceReady => "silence_ready",
            GenerationState::Assembling => "assembling",
            GenerationState::Persisting => "persisting",
            GenerationState::Completed => "completed",
            GenerationState::Failed => "failed",
        }
    }

    /// 面向用户的进度描述
    pub fn describe(&self) -> &'static str {
        match self {
            GenerationState::QuotaChecked => "Credits verified.",
            GenerationState::ScriptRequested => "Writing your meditation script...",
            GenerationState::ScriptReceived => "Script ready.",
            GenerationState::SegmentsSynthesizing => "Recording narration...",
            GenerationState::SilenceReady => "Preparing pauses...",
            GenerationState::Assembling => "Assembling audio...",
            GenerationState::Persisting => "Saving your meditation...",
            GenerationState::Completed => "Meditation generated successfully.",
            GenerationState::Failed => "Generation failed.",
        }
    }
}

/// 生成进度事件
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationProgress {
    /// 状态迁移
    State(GenerationState),
    /// 已完成的语音段数量
    SegmentSynthesized { completed: usize, total: usize },
    /// 成功结束
    Completed { meditation_id: Uuid, duration: String },
    /// 失败结束
    Failed { reason: &'static str, message: String },
}

impl GenerationProgress {
    /// 流式响应中的一行文本
    pub fn to_line(&self) -> String {
        match self {
            GenerationProgress::State(state) => state.describe().to_string(),
            GenerationProgress::SegmentSynthesized { completed, total } => {
                format!("Recorded segment {} of {}", completed, total)
            }
            GenerationProgress::Completed { meditation_id, .. } => {
                format!("meditationId: {}", meditation_id)
            }
            GenerationProgress::Failed { reason, message } => {
                format!("error: {}: {}", reason, message)
            }
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GenerationProgress::Completed { .. } | GenerationProgress::Failed { .. }
        )
    }
}
