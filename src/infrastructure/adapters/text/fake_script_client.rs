//! Fake Script Client - 用于测试的文本生成后端
//!
//! 始终返回固定脚本，不调用任何外部服务

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::application::ports::{ScriptGenerationError, ScriptGeneratorPort};
use crate::domain::meditation::ScriptPrompt;

/// 失败模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeScriptFailure {
    /// 模拟后端非 2xx
    Service,
    /// 模拟轮询超时
    PollTimeout,
}

/// Fake Script Client
pub struct FakeScriptClient {
    script: String,
    failure: Option<FakeScriptFailure>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<ScriptPrompt>>,
}

impl FakeScriptClient {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            failure: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// 每次调用都失败
    pub fn failing(failure: FakeScriptFailure) -> Self {
        Self {
            failure: Some(failure),
            ..Self::new("")
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// 收到的提示词（按调用顺序）
    pub fn prompts(&self) -> Vec<ScriptPrompt> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ScriptGeneratorPort for FakeScriptClient {
    async fn generate_script(&self, prompt: &ScriptPrompt) -> Result<String, ScriptGenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.clone());
        }

        tracing::debug!(max_tokens = prompt.max_tokens, "FakeScriptClient: returning fixed script");

        match self.failure {
            Some(FakeScriptFailure::Service) => Err(ScriptGenerationError::ServiceError(
                "HTTP 503 Service Unavailable: fake outage".to_string(),
            )),
            Some(FakeScriptFailure::PollTimeout) => Err(ScriptGenerationError::PollTimeout {
                job_id: "fake-job".to_string(),
                waited_secs: 0,
            }),
            None => Ok(self.script.clone()),
        }
    }

    fn name(&self) -> &'static str {
        "fake-script"
    }
}
