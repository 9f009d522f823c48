//! Worker Layer - Background Task Processing
//!
//! 实现 CreditResetWorker，周期性重置到期额度

mod credit_reset_worker;

pub use credit_reset_worker::{CreditResetWorker, CreditResetWorkerConfig};
