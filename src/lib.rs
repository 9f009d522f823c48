//! Dora - 引导冥想音频生成服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Meditation Context: 请求值对象、启发式参数、提示词、播放序列
//! - Credits: 生成额度与重置周期
//! - Script Segmenter: 停顿标记切分
//!
//! 应用层 (application/):
//! - Ports: 文本生成、语音合成、音频、对象存储、仓储、身份
//! - Commands: 生成编排、冥想库维护、额度重置
//! - Queries: 冥想列表、签名音频链接、额度查询
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + 流式进度
//! - Adapters: 文本/语音后端客户端、PCM 音频拼接、文件存储、令牌认证
//! - Persistence: SQLite 存储
//! - Memory: 内存仓储与对象存储
//! - Worker: CreditResetWorker 后台额度重置

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
