//! Job Polling Script Client - 提交异步生成作业并轮询结果
//!
//! 外部作业 API:
//! POST {base_url}/jobs        → {"id": "...", "status": "queued"}
//! GET  {base_url}/jobs/{id}   → {"id", "status", "output", "error"}
//!
//! 轮询间隔从 initial_interval 开始指数翻倍，上限 max_interval，
//! 总等待超过 max_wait 返回 PollTimeout

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

use crate::application::ports::{non_empty_script, ScriptGenerationError, ScriptGeneratorPort};
use crate::domain::meditation::ScriptPrompt;

use super::{read_json, send_error};

#[derive(Debug, Serialize)]
struct JobInput<'a> {
    system_prompt: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct SubmitJobRequest<'a> {
    model: &'a str,
    input: JobInput<'a>,
}

/// 作业输出，可能是完整字符串或分片数组
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JobOutput {
    Text(String),
    Chunks(Vec<String>),
}

impl JobOutput {
    fn into_text(self) -> String {
        match self {
            JobOutput::Text(text) => text,
            JobOutput::Chunks(chunks) => chunks.concat(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct JobStatusResponse {
    id: String,
    status: String,
    #[serde(default)]
    output: Option<JobOutput>,
    #[serde(default)]
    error: Option<String>,
}

enum JobState {
    Pending,
    Succeeded(Option<String>),
    Failed(String),
}

impl JobStatusResponse {
    fn state(self) -> Result<JobState, ScriptGenerationError> {
        match self.status.to_ascii_lowercase().as_str() {
            "queued" | "starting" | "processing" | "running" => Ok(JobState::Pending),
            "succeeded" | "completed" => Ok(JobState::Succeeded(self.output.map(JobOutput::into_text))),
            "failed" | "canceled" | "cancelled" => Ok(JobState::Failed(
                self.error.unwrap_or_else(|| self.status.clone()),
            )),
            other => Err(ScriptGenerationError::InvalidResponse(format!(
                "Unknown job status '{}'",
                other
            ))),
        }
    }
}

/// 轮询客户端配置
#[derive(Debug, Clone)]
pub struct JobPollingClientConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    /// 单次 HTTP 请求超时
    pub request_timeout: Duration,
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub max_wait: Duration,
}

impl JobPollingClientConfig {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            model: model.into(),
            request_timeout: Duration::from_secs(30),
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(8),
            max_wait: Duration::from_secs(300),
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_interval = initial;
        self.max_interval = max;
        self
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }
}

/// 作业轮询客户端
pub struct JobPollingScriptClient {
    client: Client,
    config: JobPollingClientConfig,
}

impl JobPollingScriptClient {
    pub fn new(config: JobPollingClientConfig) -> Result<Self, ScriptGenerationError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ScriptGenerationError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn jobs_url(&self) -> String {
        format!("{}/jobs", self.config.base_url.trim_end_matches('/'))
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    async fn submit(&self, prompt: &ScriptPrompt) -> Result<JobStatusResponse, ScriptGenerationError> {
        let body = SubmitJobRequest {
            model: &self.config.model,
            input: JobInput {
                system_prompt: &prompt.system,
                prompt: &prompt.user,
                max_tokens: prompt.max_tokens,
                temperature: 0.5,
            },
        };

        let response = self
            .authorized(self.client.post(self.jobs_url()))
            .json(&body)
            .send()
            .await
            .map_err(send_error)?;

        read_json(response).await
    }

    async fn fetch(&self, job_id: &str) -> Result<JobStatusResponse, ScriptGenerationError> {
        let response = self
            .authorized(self.client.get(format!("{}/{}", self.jobs_url(), job_id)))
            .send()
            .await
            .map_err(send_error)?;

        read_json(response).await
    }
}

#[async_trait]
impl ScriptGeneratorPort for JobPollingScriptClient {
    async fn generate_script(&self, prompt: &ScriptPrompt) -> Result<String, ScriptGenerationError> {
        let started = Instant::now();
        let mut status = self.submit(prompt).await?;
        let job_id = status.id.clone();
        let mut interval = self.config.initial_interval;
        let mut polls: u32 = 0;

        tracing::info!(job_id = %job_id, "Generation job submitted");

        loop {
            match status.state()? {
                JobState::Succeeded(output) => {
                    let script = non_empty_script(output)?;
                    tracing::info!(
                        job_id = %job_id,
                        polls = polls,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        chars = script.len(),
                        "Generation job completed"
                    );
                    return Ok(script);
                }
                JobState::Failed(reason) => {
                    tracing::warn!(job_id = %job_id, reason = %reason, "Generation job failed");
                    return Err(ScriptGenerationError::JobFailed(reason));
                }
                JobState::Pending => {}
            }

            let elapsed = started.elapsed();
            if elapsed + interval > self.config.max_wait {
                return Err(ScriptGenerationError::PollTimeout {
                    job_id,
                    waited_secs: elapsed.as_secs(),
                });
            }

            tokio::time::sleep(interval).await;
            interval = (interval * 2).min(self.config.max_interval);
            polls += 1;

            tracing::debug!(job_id = %job_id, polls = polls, "Polling generation job");
            status = self.fetch(&job_id).await?;
        }
    }

    fn name(&self) -> &'static str {
        "job-polling"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn prompt() -> ScriptPrompt {
        ScriptPrompt {
            system: "system".to_string(),
            user: "user".to_string(),
            max_tokens: 500,
        }
    }

    fn client(server: &MockServer, max_wait: Duration) -> JobPollingScriptClient {
        JobPollingScriptClient::new(
            JobPollingClientConfig::new(server.uri(), "llama")
                .with_backoff(Duration::from_millis(10), Duration::from_millis(40))
                .with_max_wait(max_wait),
        )
        .unwrap()
    }

    async fn mount_submit(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/jobs"))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({"id": "job-1", "status": "queued"})),
            )
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_polls_until_succeeded() {
        let server = MockServer::start().await;
        mount_submit(&server).await;

        Mock::given(method("GET"))
            .and(path("/jobs/job-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "job-1", "status": "running"})))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/jobs/job-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "job-1",
                "status": "succeeded",
                "output": ["Breathe ", "deeply---PAUSE---", "Rest"]
            })))
            .mount(&server)
            .await;

        let script = client(&server, Duration::from_secs(5))
            .generate_script(&prompt())
            .await
            .unwrap();
        assert_eq!(script, "Breathe deeply---PAUSE---Rest");
    }

    #[tokio::test]
    async fn test_failed_job_is_reported() {
        let server = MockServer::start().await;
        mount_submit(&server).await;
        Mock::given(method("GET"))
            .and(path("/jobs/job-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "job-1",
                "status": "failed",
                "error": "model crashed"
            })))
            .mount(&server)
            .await;

        let err = client(&server, Duration::from_secs(5))
            .generate_script(&prompt())
            .await
            .unwrap_err();
        match err {
            ScriptGenerationError::JobFailed(reason) => assert_eq!(reason, "model crashed"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_deadline_yields_poll_timeout() {
        let server = MockServer::start().await;
        mount_submit(&server).await;
        Mock::given(method("GET"))
            .and(path("/jobs/job-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "job-1", "status": "processing"})))
            .mount(&server)
            .await;

        let err = client(&server, Duration::from_millis(150))
            .generate_script(&prompt())
            .await
            .unwrap_err();
        match err {
            ScriptGenerationError::PollTimeout { job_id, .. } => assert_eq!(job_id, "job-1"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_status_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/jobs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "job-2", "status": "exploded"})))
            .mount(&server)
            .await;

        let err = client(&server, Duration::from_secs(1))
            .generate_script(&prompt())
            .await
            .unwrap_err();
        assert!(matches!(err, ScriptGenerationError::InvalidResponse(_)));
    }
}
