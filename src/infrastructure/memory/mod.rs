//! Memory Layer - 内存实现
//!
//! 仓储与对象存储的内存版本，供测试和本地演示使用

mod credit_repo;
mod meditation_repo;
mod object_storage;

pub use credit_repo::InMemoryCreditRepository;
pub use meditation_repo::InMemoryMeditationRepository;
pub use object_storage::InMemoryObjectStorage;
