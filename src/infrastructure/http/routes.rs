//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                       GET    健康检查
//! - /api/keys                       GET    列出 API Key（脱敏）
//! - /api/keys                       POST   新增 API Key
//! - /api/keys/:id                   DELETE 删除 API Key
//! - /api/keys/:id/default           PUT    设为默认 Key
//! - /api/synthesis                  GET    合成历史
//! - /api/synthesis                  POST   提交合成（async / sync）
//! - /api/synthesis/upload           POST   上传长文本文件
//! - /api/synthesis/:id              GET    任务详情
//! - /api/synthesis/:id              DELETE 删除任务
//! - /api/synthesis/:id/status       GET    检查状态（可能触发下载）
//! - /api/synthesis/:id/audio        GET    下载音频

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/keys", key_routes())
        .nest("/synthesis", synthesis_routes())
}

/// API Key 路由
fn key_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::list_keys).post(handlers::add_key))
        .route("/:key_id", delete(handlers::delete_key))
        .route("/:key_id/default", put(handlers::set_default_key))
}

/// Synthesis 路由
fn synthesis_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            get(handlers::list_synthesis).post(handlers::submit_synthesis),
        )
        .route("/upload", post(handlers::upload_text_file))
        .route(
            "/:job_id",
            get(handlers::get_synthesis).delete(handlers::delete_synthesis),
        )
        .route("/:job_id/status", get(handlers::check_synthesis_status))
        .route("/:job_id/audio", get(handlers::download_synthesis_audio))
}
