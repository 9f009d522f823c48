//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（文本生成、语音合成、音频、对象存储、仓储、身份）
//! - registry: 后端注册表
//! - quota: 额度检查与扣减
//! - commands: CQRS 命令及处理器（生成编排、冥想库、额度重置）
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;
pub mod quota;
pub mod registry;

// Re-exports
pub use commands::{
    handlers::{
        DeleteMeditationHandler, GenerateMeditationHandler, GenerationConfig, ProgressSender,
        RenameMeditationHandler, ResetCreditsHandler,
    },
    DeleteMeditation, GenerateMeditationCommand, GenerateMeditationResponse, GenerationProgress,
    GenerationState, RenameMeditation, ResetCredits, ResetCreditsResponse,
};

pub use error::ApplicationError;

pub use ports::{
    AudioAssemblerPort, AudioError, AudioFormat, AudioSegment, CreditRepositoryPort, IdentityPort,
    MeditationArtifact, MeditationRecord, MeditationRepositoryPort, ObjectStoragePort,
    OutputSpec, RepositoryError, ScriptGenerationError, ScriptGeneratorPort, SilenceClip,
    SilenceSynthesizerPort, StorageError, SynthesisRequest, VoiceSynthesisError,
    VoiceSynthesizerPort,
};

pub use queries::{
    handlers::{
        CreditsView, GetCreditsHandler, GetMeditationAudioHandler, ListMeditationsHandler,
        MeditationSummary, SignedAudioUrl,
    },
    GetCredits, GetMeditationAudio, ListMeditations,
};

pub use quota::{QuotaDecision, QuotaGate};
pub use registry::{ScriptGeneratorRegistry, VoiceSynthesizerRegistry};
