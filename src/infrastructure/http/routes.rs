//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                      GET     健康检查
//! - /api/generate                  POST    生成冥想（完成后返回）
//! - /api/generate/stream           POST    生成冥想（逐行推送进度）
//! - /api/meditations               GET     列出冥想
//! - /api/meditations/:id           PUT     重命名
//! - /api/meditations/:id           DELETE  删除
//! - /api/meditations/:id/audio     GET     获取签名音频链接
//! - /api/credits                   GET     查询额度
//! - /api/credits/reset             POST    执行额度重置（管理接口）
//! - /media/*path                   GET     签名链接下载

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route("/media/*path", get(handlers::serve_media))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/generate", post(handlers::generate_meditation))
        .route("/generate/stream", post(handlers::generate_meditation_stream))
        .merge(meditation_routes())
        .merge(credit_routes())
}

/// Meditation 路由
fn meditation_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/meditations", get(handlers::list_meditations))
        .route(
            "/meditations/:id",
            put(handlers::rename_meditation).delete(handlers::delete_meditation),
        )
        .route("/meditations/:id/audio", get(handlers::get_meditation_audio))
}

/// Credit 路由
fn credit_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/credits", get(handlers::get_credits))
        .route("/credits/reset", post(handlers::reset_credits))
}
