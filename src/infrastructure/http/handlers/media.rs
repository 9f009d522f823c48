//! Media Handler - 签名链接的音频下载

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::application::{AudioFormat, StorageError};
use crate::infrastructure::http::dto::MediaQuery;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

fn content_type_for(path: &str) -> &'static str {
    path.rsplit_once('.')
        .and_then(|(_, ext)| AudioFormat::from_extension(ext))
        .map(|format| format.content_type())
        .unwrap_or("application/octet-stream")
}

/// 校验签名后返回对象内容
pub async fn serve_media(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<MediaQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Path(object_path) = path?;
    let Query(query) = query?;

    if !state.url_signer.verify(
        &object_path,
        query.expires,
        &query.signature,
        Utc::now().timestamp(),
    ) {
        return Err(ApiError::Forbidden("Invalid or expired signature".to_string()));
    }

    let data = state
        .object_storage
        .read(&object_path)
        .await
        .map_err(|e| match e {
            StorageError::NotFound(path) => ApiError::NotFound(format!("Object not found: {}", path)),
            other => ApiError::Internal(other.to_string()),
        })?;

    tracing::debug!(path = %object_path, bytes = data.len(), "Serving media object");

    Ok((
        [(header::CONTENT_TYPE, content_type_for(&object_path))],
        data,
    )
        .into_response())
}
