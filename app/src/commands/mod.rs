// HTTP Commands
//
// axum 路由：页面、登录、对话与健康检查

pub mod chat;
pub mod session;
pub mod view;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

use crate::infrastructure::AppState;

pub use session::{BrowserSession, SESSION_COOKIE};

/// 构建应用路由
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(session::index))
        .route("/login", post(session::login))
        .route("/chat", post(chat::send_message))
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}
