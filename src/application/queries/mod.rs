//! 应用层 - 查询（读操作）
//!
//! CQRS 查询侧：处理所有读操作

mod credit_queries;
mod meditation_queries;

pub mod handlers;

pub use credit_queries::*;
pub use meditation_queries::*;
