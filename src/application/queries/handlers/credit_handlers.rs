//! Credit Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::queries::GetCredits;
use crate::application::quota::QuotaGate;
use crate::domain::credits::PlanTier;

/// 额度视图
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditsView {
    pub credits: i64,
    pub plan: PlanTier,
}

/// GetCredits Handler
pub struct GetCreditsHandler {
    quota_gate: Arc<QuotaGate>,
}

impl GetCreditsHandler {
    pub fn new(quota_gate: Arc<QuotaGate>) -> Self {
        Self { quota_gate }
    }

    pub async fn handle(&self, query: GetCredits) -> Result<CreditsView, ApplicationError> {
        let balance = self.quota_gate.balance(&query.user_id).await?;
        Ok(CreditsView {
            credits: balance.count,
            plan: balance.plan,
        })
    }
}
