//! HTTP 接口测试（oneshot 请求，内存实现）

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use dora::application::{
    AudioFormat, GenerationConfig, OutputSpec, ScriptGeneratorRegistry, VoiceSynthesizerRegistry,
};
use dora::domain::credits::{CreditBalance, CreditPolicy, PlanTier};
use dora::domain::meditation::{TextProvider, VoiceProvider};
use dora::infrastructure::adapters::audio::{PcmAudioAssembler, PcmSilenceSynthesizer};
use dora::infrastructure::adapters::identity::HmacTokenIdentity;
use dora::infrastructure::adapters::{FakeScriptClient, FakeTtsClient};
use dora::infrastructure::http::{build_router, AppPorts, AppSettings, AppState};
use dora::infrastructure::memory::{
    InMemoryCreditRepository, InMemoryMeditationRepository, InMemoryObjectStorage,
};

const TOKEN_SECRET: &str = "token-secret";
const SIGNING_SECRET: &str = "signing-secret";
const ADMIN_SECRET: &str = "admin-secret";
const BASE_URL: &str = "http://localhost:5060";

struct TestApp {
    router: Router,
    identity: HmacTokenIdentity,
    credits: Arc<InMemoryCreditRepository>,
}

impl TestApp {
    fn new() -> Self {
        let spec = OutputSpec {
            format: AudioFormat::Wav,
            sample_rate: 8000,
            channels: 1,
            bitrate: 64_000,
        };
        let credits = Arc::new(InMemoryCreditRepository::new());

        let ports = AppPorts {
            identity: Arc::new(HmacTokenIdentity::new(TOKEN_SECRET)),
            credit_repo: credits.clone(),
            meditation_repo: Arc::new(InMemoryMeditationRepository::new()),
            object_storage: Arc::new(InMemoryObjectStorage::new(SIGNING_SECRET, BASE_URL)),
            script_generators: Arc::new(ScriptGeneratorRegistry::new().with(
                TextProvider::OpenAi,
                Arc::new(FakeScriptClient::new("Breathe in---PAUSE---Breathe out")),
            )),
            voice_synthesizers: Arc::new(VoiceSynthesizerRegistry::new().with(
                VoiceProvider::OpenAi,
                Arc::new(FakeTtsClient::with_voices(vec!["alloy".to_string()])),
            )),
            silence_synthesizer: Arc::new(PcmSilenceSynthesizer::for_output(&spec)),
            audio_assembler: Arc::new(PcmAudioAssembler::new(spec)),
        };
        let settings = AppSettings {
            generation: GenerationConfig::default(),
            credit_policy: CreditPolicy::default(),
            signed_url_ttl_secs: 3600,
            signing_secret: SIGNING_SECRET.to_string(),
            admin_secret: Some(ADMIN_SECRET.to_string()),
        };

        Self {
            router: build_router(Arc::new(AppState::new(ports, settings))),
            identity: HmacTokenIdentity::new(TOKEN_SECRET),
            credits,
        }
    }

    fn token(&self, user_id: &str) -> String {
        self.identity.issue_token(user_id)
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        user_id: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user_id) = user_id {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", self.token(user_id)));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let (status, bytes) = self.send(request).await;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn generate(&self, user_id: &str) -> (StatusCode, Value) {
        self.call(Method::POST, "/api/generate", Some(user_id), Some(generate_body()))
            .await
    }
}

fn generate_body() -> Value {
    json!({
        "aiProvider": "openai",
        "duration": "2-5min",
        "guidanceLevel": "high",
        "ttsProvider": "openai",
        "voice": "alloy",
        "meditationFocus": "evening calm"
    })
}

#[tokio::test]
async fn test_ping() {
    let app = TestApp::new();
    let (status, body) = app.call(Method::GET, "/api/ping", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_missing_or_invalid_token_is_unauthorized() {
    let app = TestApp::new();

    let (status, body) = app.call(Method::GET, "/api/meditations", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errno"], 401);
    assert_eq!(body["reason"], "unauthorized");

    let request = Request::builder()
        .uri("/api/credits")
        .header(header::AUTHORIZATION, "Bearer u1.deadbeef")
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_generate_rejects_bad_requests() {
    let app = TestApp::new();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/generate")
        .header(header::AUTHORIZATION, format!("Bearer {}", app.token("u1")))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut body = generate_body();
    body["aiProvider"] = json!("gemini");
    let (status, json) = app
        .call(Method::POST, "/api/generate", Some("u1"), Some(body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["reason"], "unsupported_provider");

    let mut body = generate_body();
    body["voice"] = json!("nova");
    let (status, json) = app
        .call(Method::POST, "/api/generate", Some("u1"), Some(body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["reason"], "unsupported_provider");

    let mut body = generate_body();
    body.as_object_mut().unwrap().remove("duration");
    let (status, _) = app
        .call(Method::POST, "/api/generate", Some("u1"), Some(body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_without_credits_is_forbidden() {
    let app = TestApp::new();
    app.credits.insert(CreditBalance {
        user_id: "broke".to_string(),
        count: 0,
        plan: PlanTier::Free,
        last_reset_at: Some(Utc::now()),
    });

    let (status, body) = app.generate("broke").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["reason"], "quota_exceeded");
}

#[tokio::test]
async fn test_meditation_library_lifecycle() {
    let app = TestApp::new();

    let (status, body) = app.generate("u1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["errno"], 0);
    let id = body["data"]["meditationId"].as_str().unwrap().to_string();
    assert!(!body["data"]["duration"].as_str().unwrap().is_empty());

    let (status, body) = app.call(Method::GET, "/api/meditations", Some("u1"), None).await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], id.as_str());

    // 其他用户看不到
    let (status, body) = app.call(Method::GET, "/api/meditations", Some("u2"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
    let audio_uri = format!("/api/meditations/{}/audio", id);
    let (status, _) = app.call(Method::GET, &audio_uri, Some("u2"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // 签名链接可下载
    let (status, body) = app.call(Method::GET, &audio_uri, Some("u1"), None).await;
    assert_eq!(status, StatusCode::OK);
    let signed_url = body["data"]["signedUrl"].as_str().unwrap().to_string();
    let media_uri = signed_url.strip_prefix(BASE_URL).unwrap();
    let request = Request::builder().uri(media_uri).body(Body::empty()).unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/wav");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..4], b"RIFF");

    // 重命名幂等
    let item_uri = format!("/api/meditations/{}", id);
    for _ in 0..2 {
        let (status, _) = app
            .call(Method::PUT, &item_uri, Some("u1"), Some(json!({"newName": "Morning"})))
            .await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, _) = app
        .call(Method::PUT, &item_uri, Some("u1"), Some(json!({"newName": "  "})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, body) = app.call(Method::GET, "/api/meditations", Some("u1"), None).await;
    assert_eq!(body["data"][0]["displayName"], "Morning");

    // 删除后签名链接不可再获取
    let (status, _) = app.call(Method::DELETE, &item_uri, Some("u1"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app.call(Method::GET, &audio_uri, Some("u1"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["reason"], "not_found");
    let (status, _) = app.call(Method::DELETE, &item_uri, Some("u1"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let request = Request::builder().uri(media_uri).body(Body::empty()).unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_media_rejects_tampered_signature() {
    let app = TestApp::new();
    let uri = "/media/user_u1/meditation-x.wav?expires=9999999999&signature=00ff";
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let request = Request::builder()
        .uri("/media/user_u1/meditation-x.wav")
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_meditation_id_is_bad_request() {
    let app = TestApp::new();
    let (status, _) = app
        .call(Method::GET, "/api/meditations/not-a-uuid/audio", Some("u1"), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_credits_are_provisioned_and_consumed() {
    let app = TestApp::new();

    let (status, body) = app.call(Method::GET, "/api/credits", Some("u1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["credits"], 3);
    assert_eq!(body["data"]["subscriptionPlan"], "Free Plan");

    let (status, _) = app.generate("u1").await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.call(Method::GET, "/api/credits", Some("u1"), None).await;
    assert_eq!(body["data"]["credits"], 2);
}

#[tokio::test]
async fn test_credit_reset_requires_admin_secret() {
    let app = TestApp::new();
    app.credits.insert(CreditBalance {
        user_id: "pro".to_string(),
        count: 0,
        plan: PlanTier::Pro,
        last_reset_at: None,
    });

    let (status, _) = app.call(Method::POST, "/api/credits/reset", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/credits/reset")
        .header("x-admin-secret", ADMIN_SECRET)
        .body(Body::empty())
        .unwrap();
    let (status, bytes) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["data"]["reset"], 1);

    let (_, body) = app.call(Method::GET, "/api/credits", Some("pro"), None).await;
    assert_eq!(body["data"]["credits"], 30);
    assert_eq!(body["data"]["subscriptionPlan"], "Pro Plan");
}

#[tokio::test]
async fn test_stream_ends_with_meditation_id() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/generate/stream")
        .header(header::AUTHORIZATION, format!("Bearer {}", app.token("u1")))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(generate_body().to_string()))
        .unwrap();

    let (status, bytes) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);

    let text = String::from_utf8(bytes).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines.contains(&"Credits verified."));
    assert!(lines.last().unwrap().starts_with("meditationId: "));
}
