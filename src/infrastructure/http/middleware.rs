//! HTTP Middleware
//!
//! - 状态码错误日志中间件
//! - Bearer 令牌认证提取器

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use super::error::ApiError;
use super::state::AppState;

/// HTTP 状态码错误日志中间件
///
/// 当状态码为 4xx 或 5xx 时记录一条请求级日志
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().path().to_string();

    let response = next.run(request).await;
    let status = response.status();

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %uri,
            status = status.as_u16(),
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            path = %uri,
            status = status.as_u16(),
            "HTTP client error"
        );
    }

    response
}

/// 已认证用户
///
/// 从 `Authorization: Bearer <token>` 解析，失败时返回 401
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub String);

/// 提取 Bearer 令牌
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

        state
            .identity
            .authenticate(token)
            .map(AuthenticatedUser)
            .ok_or_else(|| ApiError::Unauthorized("Invalid session token".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        routing::get,
        Router,
    };
    use tower::util::ServiceExt;

    async fn ok_handler() -> &'static str {
        "OK"
    }

    async fn not_found_handler() -> StatusCode {
        StatusCode::NOT_FOUND
    }

    fn create_test_router() -> Router {
        Router::new()
            .route("/ok", get(ok_handler))
            .route("/not-found", get(not_found_handler))
            .layer(axum::middleware::from_fn(error_logging_middleware))
    }

    #[tokio::test]
    async fn test_middleware_passes_responses_through() {
        let app = create_test_router();

        let response = app
            .clone()
            .oneshot(HttpRequest::builder().uri("/ok").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(HttpRequest::builder().uri("/not-found").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = HttpRequest::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&parts_with(Some("Bearer abc.def"))), Some("abc.def"));
        assert_eq!(bearer_token(&parts_with(Some("Bearer   "))), None);
        assert_eq!(bearer_token(&parts_with(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&parts_with(None)), None);
    }
}
