//! Credits - 生成额度与订阅档位

use chrono::{DateTime, Duration, Utc};

/// 订阅档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanTier {
    #[default]
    Free,
    Pro,
}

impl PlanTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "Free Plan",
            PlanTier::Pro => "Pro Plan",
        }
    }

    /// 解析档位名称，未知名称按免费档处理
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "pro plan" | "pro" => PlanTier::Pro,
            _ => PlanTier::Free,
        }
    }
}

/// 额度策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreditPolicy {
    pub free_ceiling: i64,
    pub pro_ceiling: i64,
    pub reset_interval_days: i64,
}

impl Default for CreditPolicy {
    fn default() -> Self {
        Self {
            free_ceiling: 3,
            pro_ceiling: 30,
            reset_interval_days: 30,
        }
    }
}

impl CreditPolicy {
    /// 档位对应的额度上限
    pub fn ceiling_for(&self, plan: PlanTier) -> i64 {
        match plan {
            PlanTier::Free => self.free_ceiling,
            PlanTier::Pro => self.pro_ceiling,
        }
    }

    fn reset_interval(&self) -> Duration {
        Duration::days(self.reset_interval_days)
    }
}

/// 用户额度
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditBalance {
    pub user_id: String,
    pub count: i64,
    pub plan: PlanTier,
    pub last_reset_at: Option<DateTime<Utc>>,
}

impl CreditBalance {
    /// 新用户的初始额度
    pub fn provisioned(user_id: impl Into<String>, policy: &CreditPolicy, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            count: policy.ceiling_for(PlanTier::Free),
            plan: PlanTier::Free,
            last_reset_at: Some(now),
        }
    }

    pub fn has_credit(&self) -> bool {
        self.count > 0
    }

    /// 是否到达重置周期（从未重置过也视为到期）
    pub fn is_reset_due(&self, now: DateTime<Utc>, policy: &CreditPolicy) -> bool {
        match self.last_reset_at {
            None => true,
            Some(last) => now - last >= policy.reset_interval(),
        }
    }
}
