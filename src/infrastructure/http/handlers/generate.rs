//! Generate Handlers - 冥想生成（一次性响应 / 流式进度）

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use futures_util::stream;
use tokio::sync::mpsc;

use crate::application::{GenerateMeditationCommand, GenerationProgress};
use crate::infrastructure::http::dto::{
    ApiResponse, GenerateMeditationRequest, GeneratedMeditationResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::middleware::AuthenticatedUser;
use crate::infrastructure::http::state::AppState;

fn command_from(
    user_id: String,
    payload: Result<Json<GenerateMeditationRequest>, JsonRejection>,
) -> Result<GenerateMeditationCommand, ApiError> {
    let Json(req) = payload?;
    Ok(GenerateMeditationCommand {
        user_id,
        request: req.into_domain()?,
    })
}

/// 生成冥想，完成后一次性返回
pub async fn generate_meditation(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    payload: Result<Json<GenerateMeditationRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<GeneratedMeditationResponse>>, ApiError> {
    let command = command_from(user_id, payload)?;
    let response = state.generate_handler.handle(command, None).await?;
    Ok(Json(ApiResponse::success(response.into())))
}

/// 生成冥想，以 text/plain 逐行推送进度
///
/// 生成在独立任务中运行，客户端断开不会中断生成
pub async fn generate_meditation_stream(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    payload: Result<Json<GenerateMeditationRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let command = command_from(user_id, payload)?;

    let (tx, rx) = mpsc::unbounded_channel::<GenerationProgress>();
    let handler = state.generate_handler.clone();
    tokio::spawn(async move {
        // 结果已经通过进度事件上报
        let _ = handler.handle(command, Some(tx)).await;
    });

    let lines = stream::unfold(rx, |mut rx| async move {
        let event = rx.recv().await?;
        Some((Ok::<_, Infallible>(format!("{}\n", event.to_line())), rx))
    });

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(lines),
    )
        .into_response())
}
