//! Quota Gate - 生成额度检查与扣减
//!
//! 检查与扣减是两个独立步骤：生成开始前只检查，
//! 持久化成功后才扣减。两步之间没有跨请求的锁。

use chrono::Utc;
use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::CreditRepositoryPort;
use crate::domain::credits::{CreditBalance, CreditPolicy};

/// 额度检查结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaDecision {
    pub allowed: bool,
    pub remaining_before: i64,
}

/// Quota Gate
pub struct QuotaGate {
    credit_repo: Arc<dyn CreditRepositoryPort>,
    policy: CreditPolicy,
}

impl QuotaGate {
    pub fn new(credit_repo: Arc<dyn CreditRepositoryPort>, policy: CreditPolicy) -> Self {
        Self {
            credit_repo,
            policy,
        }
    }

    /// 读取用户额度，没有记录时按免费档初始化
    pub async fn balance(&self, user_id: &str) -> Result<CreditBalance, ApplicationError> {
        if let Some(balance) = self.credit_repo.get(user_id).await? {
            return Ok(balance);
        }

        let initial = CreditBalance::provisioned(user_id, &self.policy, Utc::now());
        let balance = self.credit_repo.ensure(&initial).await?;
        tracing::info!(
            user_id = %user_id,
            credits = balance.count,
            "Credit balance provisioned"
        );
        Ok(balance)
    }

    /// 检查是否还有额度（不扣减）
    pub async fn check_and_reserve(&self, user_id: &str) -> Result<QuotaDecision, ApplicationError> {
        let balance = self.balance(user_id).await?;
        let decision = QuotaDecision {
            allowed: balance.has_credit(),
            remaining_before: balance.count,
        };

        tracing::debug!(
            user_id = %user_id,
            allowed = decision.allowed,
            remaining = decision.remaining_before,
            "Quota checked"
        );

        Ok(decision)
    }

    /// 扣减一次额度，返回剩余额度
    pub async fn commit(&self, user_id: &str) -> Result<i64, ApplicationError> {
        self.credit_repo
            .decrement(user_id)
            .await
            .map_err(|e| ApplicationError::CreditUpdate(e.to_string()))
    }
}
