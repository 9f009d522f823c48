//! Credit Command Handlers

use std::sync::Arc;

use crate::application::commands::{ResetCredits, ResetCreditsResponse};
use crate::application::error::ApplicationError;
use crate::application::ports::CreditRepositoryPort;
use crate::domain::credits::CreditPolicy;

/// ResetCredits Handler
///
/// 将到期用户的额度重置为档位上限
pub struct ResetCreditsHandler {
    credit_repo: Arc<dyn CreditRepositoryPort>,
    policy: CreditPolicy,
}

impl ResetCreditsHandler {
    pub fn new(credit_repo: Arc<dyn CreditRepositoryPort>, policy: CreditPolicy) -> Self {
        Self {
            credit_repo,
            policy,
        }
    }

    pub async fn handle(&self, command: ResetCredits) -> Result<ResetCreditsResponse, ApplicationError> {
        let balances = self.credit_repo.find_all().await?;
        let mut response = ResetCreditsResponse {
            checked: balances.len(),
            ..Default::default()
        };

        for balance in balances {
            if !balance.is_reset_due(command.now, &self.policy) {
                continue;
            }

            let ceiling = self.policy.ceiling_for(balance.plan);
            match self
                .credit_repo
                .reset(&balance.user_id, ceiling, command.now)
                .await
            {
                Ok(()) => {
                    response.reset += 1;
                    tracing::info!(
                        user_id = %balance.user_id,
                        plan = balance.plan.as_str(),
                        credits = ceiling,
                        "Credits reset"
                    );
                }
                Err(e) => {
                    response.failed += 1;
                    tracing::error!(
                        user_id = %balance.user_id,
                        error = %e,
                        "Failed to reset credits"
                    );
                }
            }
        }

        Ok(response)
    }
}
