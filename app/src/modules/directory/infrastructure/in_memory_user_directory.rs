use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::modules::chat::domain::SessionId;
use crate::modules::directory::domain::{DuplicateNamePolicy, UserRecord};
use crate::modules::directory::ports::{DirectoryError, UserDirectory};

/// 内存用户目录
///
/// 用于开发和测试
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<String, SessionId>>,
    policy: DuplicateNamePolicy,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            policy: DuplicateNamePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: DuplicateNamePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// 当前全部记录（按显示名排序）
    pub async fn records(&self) -> Vec<UserRecord> {
        let users = self.users.read().await;
        let mut records: Vec<UserRecord> = users
            .iter()
            .map(|(name, id)| UserRecord::new(name.clone(), *id))
            .collect();
        records.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        records
    }
}

impl Default for InMemoryUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn register(&self, display_name: &str) -> Result<SessionId, DirectoryError> {
        let mut users = self.users.write().await;

        if self.policy == DuplicateNamePolicy::Reject && users.contains_key(display_name) {
            return Err(DirectoryError::NameTaken(display_name.to_string()));
        }

        let session_id = SessionId::new();
        users.insert(display_name.to_string(), session_id);
        Ok(session_id)
    }

    async fn lookup(&self, display_name: &str) -> Result<Option<SessionId>, DirectoryError> {
        let users = self.users.read().await;
        Ok(users.get(display_name).copied())
    }
}
