// Chat Commands

use axum::extract::{Form, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use super::session::BrowserSession;
use crate::infrastructure::{AppState, ServiceStatus};

#[derive(Debug, Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub prompt: String,
}

/// POST /chat
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<ChatForm>,
) -> Response {
    let browser = BrowserSession::from_headers(&headers);

    if let ServiceStatus::Ready(controller) = state.status() {
        // 未登录的浏览器没有会话可写，直接回到首页
        if let Some(session) = state.existing_session(browser.id).await {
            debug!("Chat submission from browser {}", browser.id);
            let mut session = session.lock().await;
            controller.submit(&mut session, &form.prompt).await;
        }
    }

    Redirect::to("/").into_response()
}
