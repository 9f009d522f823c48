//! Meditation Library Handlers

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use uuid::Uuid;

use crate::application::{DeleteMeditation, GetMeditationAudio, ListMeditations, RenameMeditation};
use crate::infrastructure::http::dto::{
    ApiResponse, Empty, MeditationItem, RenameMeditationRequest, SignedUrlResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::middleware::AuthenticatedUser;
use crate::infrastructure::http::state::AppState;

/// 列出当前用户的冥想
pub async fn list_meditations(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Result<Json<ApiResponse<Vec<MeditationItem>>>, ApiError> {
    let summaries = state
        .list_meditations_handler
        .handle(ListMeditations { user_id })
        .await?;

    Ok(Json(ApiResponse::success(
        summaries.into_iter().map(MeditationItem::from).collect(),
    )))
}

/// 获取冥想音频的签名链接
pub async fn get_meditation_audio(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ApiResponse<SignedUrlResponse>>, ApiError> {
    let Path(meditation_id) = path?;
    let signed = state
        .get_meditation_audio_handler
        .handle(GetMeditationAudio {
            user_id,
            meditation_id,
        })
        .await?;

    Ok(Json(ApiResponse::success(SignedUrlResponse {
        signed_url: signed.signed_url,
        expires_in: signed.expires_in_secs,
    })))
}

/// 重命名冥想
pub async fn rename_meditation(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<RenameMeditationRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    let Path(meditation_id) = path?;
    let Json(req) = payload?;

    state
        .rename_meditation_handler
        .handle(RenameMeditation {
            user_id,
            meditation_id,
            new_name: req.new_name,
        })
        .await?;

    Ok(Json(ApiResponse::ok()))
}

/// 删除冥想（音频对象与记录）
pub async fn delete_meditation(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    let Path(meditation_id) = path?;

    state
        .delete_meditation_handler
        .handle(DeleteMeditation {
            user_id,
            meditation_id,
        })
        .await?;

    Ok(Json(ApiResponse::ok()))
}
