//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                GET   健康检查
//! - /api/novel/create        POST  创建小说
//! - /api/novel/get           POST  获取小说目录
//! - /api/module/create       POST  创建模块
//! - /api/chapter/create      POST  创建章节
//! - /api/funding/contribute  POST  贡献（触发解锁）
//! - /api/funding/gift        POST  礼物（只增加余额）
//! - /api/funding/history     POST  账本历史
//! - /api/funding/movements   POST  资金流水
//! - /api/admin/unlock        POST  手动解锁
//! - /api/admin/budget        POST  修正预算
//! - /api/admin/withdraw      POST  提取余额
//! - /api/events              GET   SSE 事件流

use axum::{
    routing::{get, post},
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
        .route("/events", get(handlers::event_stream))
        .nest("/novel", novel_routes())
        .route("/module/create", post(handlers::create_module))
        .route("/chapter/create", post(handlers::create_chapter))
        .nest("/funding", funding_routes())
        .nest("/admin", admin_routes())
}

/// Novel 路由
fn novel_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create", post(handlers::create_novel))
        .route("/get", post(handlers::get_novel))
}

/// Funding 路由
fn funding_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/contribute", post(handlers::contribute))
        .route("/gift", post(handlers::send_gift))
        .route("/history", post(handlers::ledger_history))
        .route("/movements", post(handlers::funds_movements))
}

/// Admin 路由
fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/unlock", post(handlers::manual_unlock))
        .route("/budget", post(handlers::adjust_budget))
        .route("/withdraw", post(handlers::withdraw))
}
