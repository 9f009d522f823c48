//! SQLite Persistence - SQLite 数据库持久化实现

mod credit_repo;
mod database;
mod meditation_repo;

pub use credit_repo::SqliteCreditRepository;
pub use database::*;
pub use meditation_repo::SqliteMeditationRepository;
