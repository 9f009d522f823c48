//! Meditation Context - 冥想生成上下文
//!
//! 包含：
//! - 请求值对象（时长档位、引导强度、后端选择、主题）
//! - 启发式参数表
//! - 提示词构造
//! - 播放交错序列

mod errors;
mod heuristics;
mod playback;
mod prompt;
mod value_objects;

pub use errors::MeditationError;
pub use heuristics::{HeuristicParameters, HeuristicTable};
pub use playback::{format_duration, interleave, PlaybackItem};
pub use prompt::{ScriptPrompt, ScriptPromptBuilder, SYSTEM_INSTRUCTION};
pub use value_objects::{
    DurationBucket, GenerationRequest, GuidanceLevel, MeditationFocus, TextProvider, VoiceProvider,
};
