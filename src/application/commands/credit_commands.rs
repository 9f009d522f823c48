//! Credit Commands

use chrono::{DateTime, Utc};

/// 重置到期额度命令
#[derive(Debug, Clone)]
pub struct ResetCredits {
    /// 判断是否到期的参考时间
    pub now: DateTime<Utc>,
}

impl ResetCredits {
    pub fn now() -> Self {
        Self { now: Utc::now() }
    }
}

/// 重置结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetCreditsResponse {
    /// 检查的用户数
    pub checked: usize,
    /// 实际重置的用户数
    pub reset: usize,
    /// 重置失败的用户数
    pub failed: usize,
}
