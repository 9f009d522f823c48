//! Generate Meditation Handler - 冥想生成编排
//!
//! 流程：校验后端 → 额度检查 → 参数 → 提示词 → 脚本 → 切分
//! → 并发合成 → 静音 → 拼接 → 上传 → 写入记录 → 扣减额度

use chrono::Utc;
use futures_util::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use uuid::Uuid;

use crate::application::commands::{
    GenerateMeditationCommand, GenerateMeditationResponse, GenerationProgress, GenerationState,
};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    user_object_path, AudioAssemblerPort, AudioSegment, MeditationArtifact, MeditationRecord,
    MeditationRepositoryPort, ObjectStoragePort, ScriptGeneratorPort, SilenceSynthesizerPort,
    SynthesisRequest, VoiceSynthesizerPort,
};
use crate::application::quota::QuotaGate;
use crate::application::registry::{ScriptGeneratorRegistry, VoiceSynthesizerRegistry};
use crate::domain::meditation::{GenerationRequest, HeuristicTable, ScriptPromptBuilder};
use crate::domain::script_segmenter::{split_script, ScriptSegment, PAUSE_DELIMITER};

/// 进度事件发送端
pub type ProgressSender = mpsc::UnboundedSender<GenerationProgress>;

/// 生成配置
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// 同时进行的语音合成请求数
    pub max_concurrent_synthesis: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_concurrent_synthesis: 4,
        }
    }
}

/// 进度上报（记录状态迁移并转发给可选的订阅者）
struct ProgressReporter {
    sender: Option<ProgressSender>,
    user_id: String,
}

impl ProgressReporter {
    fn new(sender: Option<ProgressSender>, user_id: &str) -> Self {
        Self {
            sender,
            user_id: user_id.to_string(),
        }
    }

    fn send(&self, event: GenerationProgress) {
        if let Some(sender) = &self.sender {
            // 订阅者断开时忽略
            let _ = sender.send(event);
        }
    }

    fn transition(&self, state: GenerationState) {
        tracing::debug!(user_id = %self.user_id, state = state.as_str(), "Generation state changed");
        self.send(GenerationProgress::State(state));
    }

    fn segment_done(&self, completed: usize, total: usize) {
        self.send(GenerationProgress::SegmentSynthesized { completed, total });
    }

    fn completed(&self, response: &GenerateMeditationResponse) {
        self.transition(GenerationState::Completed);
        self.send(GenerationProgress::Completed {
            meditation_id: response.meditation_id,
            duration: response.duration.clone(),
        });
    }

    fn failed(&self, error: &ApplicationError) {
        tracing::debug!(
            user_id = %self.user_id,
            state = GenerationState::Failed.as_str(),
            reason = error.reason(),
            "Generation state changed"
        );
        self.send(GenerationProgress::Failed {
            reason: error.reason(),
            message: error.to_string(),
        });
    }
}

/// GenerateMeditation Handler
pub struct GenerateMeditationHandler {
    config: GenerationConfig,
    quota_gate: Arc<QuotaGate>,
    heuristics: Arc<HeuristicTable>,
    script_generators: Arc<ScriptGeneratorRegistry>,
    voice_synthesizers: Arc<VoiceSynthesizerRegistry>,
    silence_synthesizer: Arc<dyn SilenceSynthesizerPort>,
    audio_assembler: Arc<dyn AudioAssemblerPort>,
    object_storage: Arc<dyn ObjectStoragePort>,
    meditation_repo: Arc<dyn MeditationRepositoryPort>,
}

impl GenerateMeditationHandler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: GenerationConfig,
        quota_gate: Arc<QuotaGate>,
        heuristics: Arc<HeuristicTable>,
        script_generators: Arc<ScriptGeneratorRegistry>,
        voice_synthesizers: Arc<VoiceSynthesizerRegistry>,
        silence_synthesizer: Arc<dyn SilenceSynthesizerPort>,
        audio_assembler: Arc<dyn AudioAssemblerPort>,
        object_storage: Arc<dyn ObjectStoragePort>,
        meditation_repo: Arc<dyn MeditationRepositoryPort>,
    ) -> Self {
        Self {
            config,
            quota_gate,
            heuristics,
            script_generators,
            voice_synthesizers,
            silence_synthesizer,
            audio_assembler,
            object_storage,
            meditation_repo,
        }
    }

    pub async fn handle(
        &self,
        command: GenerateMeditationCommand,
        progress: Option<ProgressSender>,
    ) -> Result<GenerateMeditationResponse, ApplicationError> {
        let reporter = ProgressReporter::new(progress, &command.user_id);
        let result = self.run(&command, &reporter).await;

        match &result {
            Ok(response) => {
                tracing::info!(
                    user_id = %command.user_id,
                    meditation_id = %response.meditation_id,
                    duration = %response.duration,
                    "Meditation generated"
                );
                reporter.completed(response);
            }
            Err(e) => {
                tracing::warn!(
                    user_id = %command.user_id,
                    reason = e.reason(),
                    error = %e,
                    "Meditation generation failed"
                );
                reporter.failed(e);
            }
        }

        result
    }

    async fn run(
        &self,
        command: &GenerateMeditationCommand,
        reporter: &ProgressReporter,
    ) -> Result<GenerateMeditationResponse, ApplicationError> {
        let request = &command.request;
        let user_id = command.user_id.as_str();

        // 1. 先校验后端选择，不产生任何费用
        let script_generator = self.script_generators.get(request.text_provider)?;
        let voice_synthesizer = self
            .voice_synthesizers
            .resolve(request.voice_provider, &request.voice_id)?;

        // 2. 额度检查
        let decision = self.quota_gate.check_and_reserve(user_id).await?;
        if !decision.allowed {
            return Err(ApplicationError::QuotaExceeded {
                user_id: user_id.to_string(),
            });
        }
        reporter.transition(GenerationState::QuotaChecked);

        // 3-5. 参数、提示词、脚本
        let params = self.heuristics.resolve(request.duration, request.guidance)?;
        let prompt = ScriptPromptBuilder::build(request, &params);

        tracing::info!(
            user_id = %user_id,
            text_provider = %request.text_provider,
            duration = %request.duration,
            guidance = %request.guidance,
            target_chars = params.target_character_count,
            pauses = params.pause_count,
            "Requesting meditation script"
        );
        reporter.transition(GenerationState::ScriptRequested);

        let script = script_generator.generate_script(&prompt).await?;
        reporter.transition(GenerationState::ScriptReceived);

        // 6. 切分
        let segments = self.speakable_segments(&script, params.section_count() as usize, user_id)?;

        // 7. 并发合成
        reporter.transition(GenerationState::SegmentsSynthesizing);
        let audio_segments = self
            .synthesize_segments(voice_synthesizer, &request.voice_id, segments, reporter)
            .await?;

        // 8. 静音（整个生成只生成一次）
        let silence = self
            .silence_synthesizer
            .generate_silence(params.pause_length_secs as f64)
            .map_err(|e| ApplicationError::Synthesis(e.to_string()))?;
        reporter.transition(GenerationState::SilenceReady);

        // 9. 拼接
        reporter.transition(GenerationState::Assembling);
        let artifact = self
            .audio_assembler
            .assemble(audio_segments, Arc::new(silence))
            .await
            .map_err(|e| ApplicationError::Assembly(e.to_string()))?;

        // 10-12. 持久化与扣减
        reporter.transition(GenerationState::Persisting);
        let record = self.persist(user_id, request, &artifact).await?;

        match self.quota_gate.commit(user_id).await {
            Ok(remaining) => {
                tracing::info!(user_id = %user_id, remaining = remaining, "Credit consumed");
            }
            Err(e) => {
                tracing::error!(
                    user_id = %user_id,
                    meditation_id = %record.id,
                    error = %e,
                    "Failed to decrement credits, keeping generated meditation"
                );
            }
        }

        Ok(GenerateMeditationResponse {
            meditation_id: record.id,
            message: GenerationState::Completed.describe().to_string(),
            duration: record.duration,
        })
    }

    fn speakable_segments(
        &self,
        script: &str,
        expected_sections: usize,
        user_id: &str,
    ) -> Result<Vec<ScriptSegment>, ApplicationError> {
        let segments = split_script(script, PAUSE_DELIMITER);
        if segments.len() != expected_sections {
            tracing::warn!(
                user_id = %user_id,
                expected = expected_sections,
                actual = segments.len(),
                "Script section count differs from requested pause layout"
            );
        }

        let total = segments.len();
        let speakable: Vec<ScriptSegment> =
            segments.into_iter().filter(ScriptSegment::is_speakable).collect();

        if speakable.len() != total {
            tracing::debug!(
                user_id = %user_id,
                dropped = total - speakable.len(),
                "Dropped empty script sections"
            );
        }

        if speakable.is_empty() {
            return Err(ApplicationError::UpstreamGeneration(
                "script contained no speakable text".to_string(),
            ));
        }

        Ok(speakable)
    }

    async fn synthesize_segments(
        &self,
        synthesizer: Arc<dyn VoiceSynthesizerPort>,
        voice_id: &str,
        segments: Vec<ScriptSegment>,
        reporter: &ProgressReporter,
    ) -> Result<Vec<AudioSegment>, ApplicationError> {
        let total = segments.len();
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_synthesis.max(1)));

        let mut pending: FuturesUnordered<_> = segments
            .into_iter()
            .map(|segment| {
                let synthesizer = synthesizer.clone();
                let semaphore = semaphore.clone();
                let voice_id = voice_id.to_string();

                async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|e| ApplicationError::internal(e.to_string()))?;

                    let request = SynthesisRequest {
                        text: segment.text,
                        voice_id,
                    };
                    let data = synthesizer.synthesize(&request).await.map_err(|e| {
                        ApplicationError::UpstreamSynthesis(format!(
                            "segment {}: {}",
                            segment.index, e
                        ))
                    })?;

                    tracing::debug!(
                        segment_index = segment.index,
                        audio_size = data.len(),
                        "Segment synthesized"
                    );

                    Ok::<_, ApplicationError>(AudioSegment {
                        index: segment.index,
                        data,
                    })
                }
            })
            .collect();

        let mut completed = Vec::with_capacity(total);
        while let Some(result) = pending.next().await {
            // 任一段失败即放弃整批，剩余请求随 pending 一起丢弃
            completed.push(result?);
            reporter.segment_done(completed.len(), total);
        }

        completed.sort_by_key(|segment| segment.index);
        Ok(completed)
    }

    async fn persist(
        &self,
        user_id: &str,
        request: &GenerationRequest,
        artifact: &MeditationArtifact,
    ) -> Result<MeditationRecord, ApplicationError> {
        let meditation_id = Uuid::new_v4();
        let file_name = format!(
            "meditation-{}.{}",
            meditation_id,
            artifact.format.extension()
        );
        let audio_path = user_object_path(user_id, &file_name);

        self.object_storage
            .upload(&audio_path, &artifact.data)
            .await
            .map_err(|e| ApplicationError::Storage(e.to_string()))?;

        let created_at = Utc::now();
        let record = MeditationRecord {
            id: meditation_id,
            user_id: user_id.to_string(),
            audio_path: audio_path.clone(),
            display_name: format!(
                "{} meditation ({}, {} guidance)",
                request.focus.as_str(),
                request.duration,
                request.guidance
            ),
            duration: artifact.duration_string(),
            created_at,
        };

        if let Err(e) = self.meditation_repo.insert(&record).await {
            match self.object_storage.delete(&audio_path).await {
                Ok(()) => tracing::warn!(
                    audio_path = %audio_path,
                    "Removed uploaded audio after metadata failure"
                ),
                Err(cleanup) => tracing::error!(
                    audio_path = %audio_path,
                    error = %cleanup,
                    "Failed to remove orphaned audio"
                ),
            }
            return Err(ApplicationError::Metadata(e.to_string()));
        }

        tracing::info!(
            user_id = %user_id,
            meditation_id = %meditation_id,
            audio_path = %audio_path,
            size = artifact.data.len(),
            "Meditation stored"
        );

        Ok(record)
    }
}
