//! Query Handlers 实现
//!
//! 所有 QueryHandler 的具体实现

mod credit_handlers;
mod meditation_handlers;

pub use credit_handlers::*;
pub use meditation_handlers::*;
