//! Credit Handlers

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::application::{GetCredits, ResetCredits};
use crate::infrastructure::http::dto::{ApiResponse, CreditsResponse, ResetSweepResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::middleware::AuthenticatedUser;
use crate::infrastructure::http::state::AppState;

type HmacSha256 = Hmac<Sha256>;

/// 管理密钥请求头
pub const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

/// 常数时间比较管理密钥（比较两侧的 HMAC 标签）
fn secrets_match(provided: &str, expected: &str) -> bool {
    let tag = |secret: &str| {
        HmacSha256::new_from_slice(ADMIN_SECRET_HEADER.as_bytes()).map(|mut mac| {
            mac.update(secret.as_bytes());
            mac
        })
    };
    let (Ok(provided_mac), Ok(expected_mac)) = (tag(provided), tag(expected)) else {
        return false;
    };
    provided_mac
        .verify_slice(&expected_mac.finalize().into_bytes())
        .is_ok()
}

/// 查询当前用户额度
pub async fn get_credits(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Result<Json<ApiResponse<CreditsResponse>>, ApiError> {
    let view = state.get_credits_handler.handle(GetCredits { user_id }).await?;
    Ok(Json(ApiResponse::success(view.into())))
}

/// 立即执行一次额度重置
pub async fn reset_credits(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<ResetSweepResponse>>, ApiError> {
    let Some(expected) = state.admin_secret.as_deref() else {
        return Err(ApiError::Forbidden("Admin endpoint is disabled".to_string()));
    };

    let provided = headers
        .get(ADMIN_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing admin secret".to_string()))?;
    if !secrets_match(provided, expected) {
        return Err(ApiError::Unauthorized("Invalid admin secret".to_string()));
    }

    let response = state
        .reset_credits_handler
        .handle(ResetCredits::now())
        .await?;

    Ok(Json(ApiResponse::success(response.into())))
}
