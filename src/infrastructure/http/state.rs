//! Application State
//!
//! 持有所有 Command/Query Handlers 以及 HTTP 层直接使用的端口

use std::sync::Arc;

use crate::application::{
    // Command handlers
    DeleteMeditationHandler, GenerateMeditationHandler, GenerationConfig,
    RenameMeditationHandler, ResetCreditsHandler,
    // Query handlers
    GetCreditsHandler, GetMeditationAudioHandler, ListMeditationsHandler,
    // Ports
    AudioAssemblerPort, CreditRepositoryPort, IdentityPort, MeditationRepositoryPort,
    ObjectStoragePort, QuotaGate, ScriptGeneratorRegistry, SilenceSynthesizerPort,
    VoiceSynthesizerRegistry,
};
use crate::domain::credits::CreditPolicy;
use crate::domain::meditation::HeuristicTable;
use crate::infrastructure::adapters::storage::UrlSigner;

/// 状态所需的端口实现
pub struct AppPorts {
    pub identity: Arc<dyn IdentityPort>,
    pub credit_repo: Arc<dyn CreditRepositoryPort>,
    pub meditation_repo: Arc<dyn MeditationRepositoryPort>,
    pub object_storage: Arc<dyn ObjectStoragePort>,
    pub script_generators: Arc<ScriptGeneratorRegistry>,
    pub voice_synthesizers: Arc<VoiceSynthesizerRegistry>,
    pub silence_synthesizer: Arc<dyn SilenceSynthesizerPort>,
    pub audio_assembler: Arc<dyn AudioAssemblerPort>,
}

/// 状态所需的配置项
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub generation: GenerationConfig,
    pub credit_policy: CreditPolicy,
    pub signed_url_ttl_secs: u64,
    /// 媒体链接签名密钥，需与对象存储一致
    pub signing_secret: String,
    /// 额度重置接口的管理密钥，未配置时接口关闭
    pub admin_secret: Option<String>,
}

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub identity: Arc<dyn IdentityPort>,
    pub object_storage: Arc<dyn ObjectStoragePort>,
    pub url_signer: UrlSigner,
    pub admin_secret: Option<String>,

    // ========== Command Handlers ==========
    pub generate_handler: Arc<GenerateMeditationHandler>,
    pub rename_meditation_handler: RenameMeditationHandler,
    pub delete_meditation_handler: DeleteMeditationHandler,
    pub reset_credits_handler: Arc<ResetCreditsHandler>,

    // ========== Query Handlers ==========
    pub list_meditations_handler: ListMeditationsHandler,
    pub get_meditation_audio_handler: GetMeditationAudioHandler,
    pub get_credits_handler: GetCreditsHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(ports: AppPorts, settings: AppSettings) -> Self {
        let quota_gate = Arc::new(QuotaGate::new(
            ports.credit_repo.clone(),
            settings.credit_policy,
        ));

        let generate_handler = GenerateMeditationHandler::new(
            settings.generation,
            quota_gate.clone(),
            Arc::new(HeuristicTable::standard()),
            ports.script_generators,
            ports.voice_synthesizers,
            ports.silence_synthesizer,
            ports.audio_assembler,
            ports.object_storage.clone(),
            ports.meditation_repo.clone(),
        );

        Self {
            // Ports
            identity: ports.identity,
            object_storage: ports.object_storage.clone(),
            url_signer: UrlSigner::new(&settings.signing_secret),
            admin_secret: settings.admin_secret,

            // Command handlers
            generate_handler: Arc::new(generate_handler),
            rename_meditation_handler: RenameMeditationHandler::new(ports.meditation_repo.clone()),
            delete_meditation_handler: DeleteMeditationHandler::new(
                ports.meditation_repo.clone(),
                ports.object_storage.clone(),
            ),
            reset_credits_handler: Arc::new(ResetCreditsHandler::new(
                ports.credit_repo,
                settings.credit_policy,
            )),

            // Query handlers
            list_meditations_handler: ListMeditationsHandler::new(ports.meditation_repo.clone()),
            get_meditation_audio_handler: GetMeditationAudioHandler::new(
                ports.meditation_repo,
                ports.object_storage,
                settings.signed_url_ttl_secs,
            ),
            get_credits_handler: GetCreditsHandler::new(quota_gate),
        }
    }
}
