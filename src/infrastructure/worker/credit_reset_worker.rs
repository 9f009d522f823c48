//! Credit Reset Worker - 周期性额度重置

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};

use crate::application::{ResetCredits, ResetCreditsHandler};

/// Worker 配置
#[derive(Debug, Clone)]
pub struct CreditResetWorkerConfig {
    /// 两次重置之间的间隔
    pub sweep_interval: Duration,
}

impl Default for CreditResetWorkerConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(86_400),
        }
    }
}

/// 额度重置 Worker
///
/// 启动时立即执行一次，之后按固定间隔执行
pub struct CreditResetWorker {
    config: CreditResetWorkerConfig,
    handler: Arc<ResetCreditsHandler>,
}

impl CreditResetWorker {
    pub fn new(config: CreditResetWorkerConfig, handler: Arc<ResetCreditsHandler>) -> Self {
        Self { config, handler }
    }

    /// 启动 Worker（不会返回）
    pub async fn run(self) {
        tracing::info!(
            interval_secs = self.config.sweep_interval.as_secs(),
            "CreditResetWorker started"
        );

        let mut ticker = interval(self.config.sweep_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.sweep().await;
        }
    }

    async fn sweep(&self) {
        match self.handler.handle(ResetCredits::now()).await {
            Ok(result) => tracing::info!(
                checked = result.checked,
                reset = result.reset,
                failed = result.failed,
                "Credit reset sweep finished"
            ),
            Err(e) => tracing::error!(error = %e, "Credit reset sweep failed"),
        }
    }
}
