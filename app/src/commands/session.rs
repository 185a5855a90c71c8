// Session Commands
//
// 浏览器会话 Cookie、页面渲染与登录表单

use axum::extract::{Form, Query, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::view;
use crate::infrastructure::{AppState, ServiceStatus};
use crate::modules::session::{LoginChoice, SessionState};

/// 浏览器会话 Cookie 名
pub const SESSION_COOKIE: &str = "datasci_chat_sid";

/// 当前请求对应的浏览器会话
#[derive(Debug, Clone, Copy)]
pub struct BrowserSession {
    pub id: Uuid,
    /// Cookie 缺失或无效时新分配，需要在响应里下发
    pub is_new: bool,
}

impl BrowserSession {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        match read_cookie(headers) {
            Some(id) => Self { id, is_new: false },
            None => Self {
                id: Uuid::new_v4(),
                is_new: true,
            },
        }
    }

    /// 新会话时附带 Set-Cookie
    pub fn response_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if self.is_new {
            let cookie = format!(
                "{}={}; HttpOnly; Path=/; SameSite=Lax",
                SESSION_COOKIE, self.id
            );
            match HeaderValue::from_str(&cookie) {
                Ok(value) => {
                    headers.insert(header::SET_COOKIE, value);
                }
                Err(e) => warn!("Invalid session cookie value: {}", e),
            }
        }
        headers
    }
}

fn read_cookie(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

#[derive(Debug, Default, Deserialize)]
pub struct IndexParams {
    pub choice: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub choice: String,
    #[serde(default)]
    pub name: String,
}

/// GET /
pub async fn index(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<IndexParams>,
) -> Response {
    let controller = match state.status() {
        ServiceStatus::Ready(controller) => controller.clone(),
        ServiceStatus::Unavailable(message) => {
            return Html(view::render_unavailable(message)).into_response();
        }
    };

    let browser = BrowserSession::from_headers(&headers);

    // 只有切换登录方式才登记新会话
    if let Some(choice) = params.choice.as_deref().and_then(LoginChoice::parse) {
        let session = state.session(browser.id).await;
        let mut session = session.lock().await;
        controller.choose(&mut session, choice);
        let page = render_session(&mut session);
        return (browser.response_headers(), Html(page)).into_response();
    }

    let page = match state.existing_session(browser.id).await {
        Some(session) => render_session(&mut *session.lock().await),
        None => view::render_page(&SessionState::new(), &[]),
    };
    Html(page).into_response()
}

fn render_session(session: &mut SessionState) -> String {
    let notices = session.take_notices();
    view::render_page(session, &notices)
}

/// POST /login
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    let browser = BrowserSession::from_headers(&headers);

    if let ServiceStatus::Ready(controller) = state.status() {
        let choice = LoginChoice::parse(&form.choice).unwrap_or_default();
        debug!("Login attempt ({}) for browser {}", choice.as_str(), browser.id);

        let session = state.session(browser.id).await;
        let mut session = session.lock().await;
        controller.login(&mut session, choice, &form.name).await;
    }

    (browser.response_headers(), Redirect::to("/")).into_response()
}
