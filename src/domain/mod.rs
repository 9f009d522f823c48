//! Domain Layer - 领域层
//!
//! 包含:
//! - Meditation Context: 冥想生成参数、提示词、播放序列
//! - Credits: 生成额度
//! - Script Segmenter: 停顿标记切分

pub mod credits;
pub mod meditation;
pub mod script_segmenter;

pub use credits::{CreditBalance, CreditPolicy, PlanTier};
pub use script_segmenter::{split_script, ScriptSegment, PAUSE_DELIMITER};
