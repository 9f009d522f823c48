//! HTTP Error Handling
//!
//! 错误响应使用真实的 HTTP 状态码，响应体保持统一的 errno 结构

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::ApplicationError;

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errno: i32,
    pub error: String,
    /// 机器可读的错误原因
    pub reason: &'static str,
    pub data: Option<()>,
}

impl ErrorResponse {
    pub fn new(errno: i32, reason: &'static str, error: impl Into<String>) -> Self {
        Self {
            errno,
            error: error.into(),
            reason,
            data: None,
        }
    }
}

/// 错误码定义
pub mod errno {
    pub const BAD_REQUEST: i32 = 400;
    pub const UNAUTHORIZED: i32 = 401;
    pub const FORBIDDEN: i32 = 403;
    pub const NOT_FOUND: i32 = 404;
    pub const INTERNAL_ERROR: i32 = 500;
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Internal(String),
    /// 应用层错误，保留其 reason
    Application(ApplicationError),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "validation"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
            ApiError::Application(e) => (status_for(e), e.reason()),
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Internal(msg) => msg.clone(),
            ApiError::Application(e) => e.to_string(),
        }
    }
}

/// 应用层错误对应的 HTTP 状态码
pub fn status_for(error: &ApplicationError) -> StatusCode {
    match error {
        ApplicationError::UnsupportedProvider(_) | ApplicationError::Validation(_) => {
            StatusCode::BAD_REQUEST
        }
        ApplicationError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        ApplicationError::QuotaExceeded { .. } => StatusCode::FORBIDDEN,
        ApplicationError::NotFound { .. } => StatusCode::NOT_FOUND,
        ApplicationError::Configuration(_)
        | ApplicationError::UpstreamGeneration(_)
        | ApplicationError::UpstreamTimeout(_)
        | ApplicationError::UpstreamSynthesis(_)
        | ApplicationError::Synthesis(_)
        | ApplicationError::Assembly(_)
        | ApplicationError::Storage(_)
        | ApplicationError::Metadata(_)
        | ApplicationError::CreditUpdate(_)
        | ApplicationError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, reason) = self.parts();
        let message = self.message();
        let errno = i32::from(status.as_u16());

        if status.is_server_error() {
            tracing::error!(errno, reason, error = %message, "Request failed");
        } else {
            tracing::warn!(errno, reason, error = %message, "Request rejected");
        }

        (status, Json(ErrorResponse::new(errno, reason, message))).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        ApiError::Application(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
