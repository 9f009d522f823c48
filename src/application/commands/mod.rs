//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：处理所有写操作

mod credit_commands;
mod generate_commands;
mod meditation_commands;

pub mod handlers;

pub use credit_commands::*;
pub use generate_commands::*;
pub use meditation_commands::*;
