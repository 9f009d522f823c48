//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio;
mod identity;
mod object_storage;
mod repositories;
mod script_generator;
mod voice_synthesizer;

pub use audio::{
    AudioAssemblerPort, AudioError, AudioFormat, AudioSegment, MeditationArtifact, OutputSpec,
    SilenceClip, SilenceSynthesizerPort,
};
pub use identity::IdentityPort;
pub use object_storage::{user_object_path, ObjectStoragePort, StorageError};
pub use repositories::{
    CreditRepositoryPort, MeditationRecord, MeditationRepositoryPort, RepositoryError,
};
pub use script_generator::{non_empty_script, ScriptGenerationError, ScriptGeneratorPort};
pub use voice_synthesizer::{SynthesisRequest, VoiceSynthesisError, VoiceSynthesizerPort};
