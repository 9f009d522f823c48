//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod credit_handlers;
mod generate_handler;
mod meditation_handlers;

pub use credit_handlers::*;
pub use generate_handler::*;
pub use meditation_handlers::*;
