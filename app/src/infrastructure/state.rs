use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::modules::session::{SessionController, SessionState};

/// 服务状态
///
/// 启动配置失败时整个界面只显示错误信息
pub enum ServiceStatus {
    Ready(Arc<SessionController>),
    Unavailable(String),
}

/// 应用全局状态
///
/// 浏览器会话状态只保存在内存中，进程退出即丢弃
pub struct AppState {
    status: ServiceStatus,
    /// 浏览器会话 ID → 会话状态（每个会话同一时间只处理一个请求）
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<SessionState>>>>,
}

impl AppState {
    pub fn ready(controller: Arc<SessionController>) -> Self {
        Self::with_status(ServiceStatus::Ready(controller))
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::with_status(ServiceStatus::Unavailable(message.into()))
    }

    fn with_status(status: ServiceStatus) -> Self {
        Self {
            status,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn status(&self) -> &ServiceStatus {
        &self.status
    }

    /// 查询已有的浏览器会话状态，不创建新条目
    pub async fn existing_session(&self, browser_id: Uuid) -> Option<Arc<Mutex<SessionState>>> {
        self.sessions.read().await.get(&browser_id).cloned()
    }

    /// 获取或创建浏览器会话状态，仅在会改变状态的请求中调用
    pub async fn session(&self, browser_id: Uuid) -> Arc<Mutex<SessionState>> {
        {
            let sessions = self.sessions.read().await;
            if let Some(state) = sessions.get(&browser_id) {
                return state.clone();
            }
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(browser_id)
            .or_insert_with(|| Arc::new(Mutex::new(SessionState::new())))
            .clone()
    }

    /// 当前浏览器会话数
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
