//! Provider Registry - 后端选择
//!
//! 文本生成与语音合成后端在启动时注册，请求按枚举选择后端

use std::collections::HashMap;
use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{ScriptGeneratorPort, VoiceSynthesizerPort};
use crate::domain::meditation::{TextProvider, VoiceProvider};

/// 文本生成后端注册表
#[derive(Default, Clone)]
pub struct ScriptGeneratorRegistry {
    backends: HashMap<TextProvider, Arc<dyn ScriptGeneratorPort>>,
}

impl ScriptGeneratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册后端（同一 provider 重复注册时覆盖）
    pub fn register(&mut self, provider: TextProvider, backend: Arc<dyn ScriptGeneratorPort>) {
        tracing::info!(provider = %provider, backend = backend.name(), "Text backend registered");
        self.backends.insert(provider, backend);
    }

    pub fn with(mut self, provider: TextProvider, backend: Arc<dyn ScriptGeneratorPort>) -> Self {
        self.register(provider, backend);
        self
    }

    pub fn get(&self, provider: TextProvider) -> Result<Arc<dyn ScriptGeneratorPort>, ApplicationError> {
        self.backends.get(&provider).cloned().ok_or_else(|| {
            ApplicationError::unsupported_provider(format!(
                "text provider '{}' is not configured",
                provider
            ))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

/// 语音合成后端注册表
#[derive(Default, Clone)]
pub struct VoiceSynthesizerRegistry {
    backends: HashMap<VoiceProvider, Arc<dyn VoiceSynthesizerPort>>,
}

impl VoiceSynthesizerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: VoiceProvider, backend: Arc<dyn VoiceSynthesizerPort>) {
        tracing::info!(provider = %provider, backend = backend.name(), "Voice backend registered");
        self.backends.insert(provider, backend);
    }

    pub fn with(mut self, provider: VoiceProvider, backend: Arc<dyn VoiceSynthesizerPort>) -> Self {
        self.register(provider, backend);
        self
    }

    /// 选择后端并校验音色
    pub fn resolve(
        &self,
        provider: VoiceProvider,
        voice_id: &str,
    ) -> Result<Arc<dyn VoiceSynthesizerPort>, ApplicationError> {
        let backend = self.backends.get(&provider).cloned().ok_or_else(|| {
            ApplicationError::unsupported_provider(format!(
                "voice provider '{}' is not configured",
                provider
            ))
        })?;

        if !backend.supports_voice(voice_id) {
            return Err(ApplicationError::unsupported_provider(format!(
                "voice '{}' is not supported by '{}'",
                voice_id, provider
            )));
        }

        Ok(backend)
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::text::FakeScriptClient;
    use crate::infrastructure::adapters::tts::FakeTtsClient;

    #[test]
    fn test_unregistered_text_provider_is_rejected() {
        let registry = ScriptGeneratorRegistry::new()
            .with(TextProvider::OpenAi, Arc::new(FakeScriptClient::new("script")));

        assert!(registry.get(TextProvider::OpenAi).is_ok());
        let err = registry.get(TextProvider::Anthropic).err().unwrap();
        assert_eq!(err.reason(), "unsupported_provider");
    }

    #[test]
    fn test_voice_resolution_checks_voice_support() {
        let fake = FakeTtsClient::with_voices(vec!["alloy".to_string()]);
        let registry = VoiceSynthesizerRegistry::new().with(VoiceProvider::OpenAi, Arc::new(fake));

        assert!(registry.resolve(VoiceProvider::OpenAi, "alloy").is_ok());
        assert_eq!(
            registry
                .resolve(VoiceProvider::OpenAi, "robot")
                .err()
                .unwrap()
                .reason(),
            "unsupported_provider"
        );
        assert_eq!(
            registry
                .resolve(VoiceProvider::ElevenLabs, "alloy")
                .err()
                .unwrap()
                .reason(),
            "unsupported_provider"
        );
    }
}
