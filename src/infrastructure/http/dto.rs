//! Data Transfer Objects
//!
//! 请求/响应字段均为 camelCase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::{
    ApplicationError, CreditsView, GenerateMeditationResponse, MeditationSummary,
    ResetCreditsResponse,
};
use crate::domain::meditation::{
    DurationBucket, GenerationRequest, GuidanceLevel, MeditationFocus, TextProvider, VoiceProvider,
};

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 空数据响应
#[derive(Debug, Serialize)]
pub struct Empty {}

impl ApiResponse<Empty> {
    /// 成功但无数据
    pub fn ok() -> Self {
        Self::success(Empty {})
    }
}

// ============================================================================
// Generate DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateMeditationRequest {
    pub ai_provider: String,
    pub duration: String,
    pub guidance_level: String,
    pub tts_provider: String,
    pub voice: String,
    #[serde(default)]
    pub meditation_focus: Option<String>,
}

impl GenerateMeditationRequest {
    /// 转换为领域请求；未知的后端名称视为不支持的后端，其余未知取值视为验证错误
    pub fn into_domain(self) -> Result<GenerationRequest, ApplicationError> {
        let text_provider = TextProvider::from_str(&self.ai_provider).ok_or_else(|| {
            ApplicationError::unsupported_provider(format!("aiProvider '{}'", self.ai_provider))
        })?;
        let voice_provider = VoiceProvider::from_str(&self.tts_provider).ok_or_else(|| {
            ApplicationError::unsupported_provider(format!("ttsProvider '{}'", self.tts_provider))
        })?;
        let duration = DurationBucket::from_str(&self.duration).ok_or_else(|| {
            ApplicationError::validation(format!("Unknown duration '{}'", self.duration))
        })?;
        let guidance = GuidanceLevel::from_str(&self.guidance_level).ok_or_else(|| {
            ApplicationError::validation(format!("Unknown guidanceLevel '{}'", self.guidance_level))
        })?;

        let voice_id = self.voice.trim().to_string();
        if voice_id.is_empty() {
            return Err(ApplicationError::validation("voice is required"));
        }

        let focus = self
            .meditation_focus
            .as_deref()
            .map(MeditationFocus::new)
            .unwrap_or_default();

        Ok(GenerationRequest {
            text_provider,
            duration,
            guidance,
            voice_provider,
            voice_id,
            focus,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedMeditationResponse {
    pub message: String,
    pub meditation_id: Uuid,
    pub duration: String,
}

impl From<GenerateMeditationResponse> for GeneratedMeditationResponse {
    fn from(response: GenerateMeditationResponse) -> Self {
        Self {
            message: response.message,
            meditation_id: response.meditation_id,
            duration: response.duration,
        }
    }
}

// ============================================================================
// Meditation Library DTOs
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeditationItem {
    pub id: Uuid,
    pub display_name: String,
    pub audio_path: String,
    pub duration: String,
    pub created_at: String,
}

impl From<MeditationSummary> for MeditationItem {
    fn from(summary: MeditationSummary) -> Self {
        Self {
            id: summary.id,
            display_name: summary.display_name,
            audio_path: summary.audio_path,
            duration: summary.duration,
            created_at: summary.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrlResponse {
    pub signed_url: String,
    pub expires_in: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameMeditationRequest {
    pub new_name: String,
}

// ============================================================================
// Credit DTOs
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditsResponse {
    pub credits: i64,
    pub subscription_plan: String,
}

impl From<CreditsView> for CreditsResponse {
    fn from(view: CreditsView) -> Self {
        Self {
            credits: view.credits,
            subscription_plan: view.plan.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResetSweepResponse {
    pub checked: usize,
    pub reset: usize,
    pub failed: usize,
}

impl From<ResetCreditsResponse> for ResetSweepResponse {
    fn from(response: ResetCreditsResponse) -> Self {
        Self {
            checked: response.checked,
            reset: response.reset,
            failed: response.failed,
        }
    }
}

// ============================================================================
// Media DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct MediaQuery {
    pub expires: i64,
    pub signature: String,
}
