use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::modules::chat::domain::{ChatMessage, ChatTurn, SessionId};
use crate::modules::chat::ports::{MessageRepository, StorageError};

/// 内存消息仓储
///
/// 用于开发和测试
pub struct InMemoryMessageRepository {
    /// 消息存储（按会话分组）
    messages: RwLock<HashMap<SessionId, Vec<ChatMessage>>>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self {
            messages: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryMessageRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn ensure_schema(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn history(&self, session_id: SessionId) -> Result<Vec<ChatTurn>, StorageError> {
        let messages = self.messages.read().await;

        Ok(messages
            .get(&session_id)
            .map(|msgs| {
                msgs.iter()
                    .cloned()
                    .map(|m| ChatTurn::new(session_id, m))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn append(
        &self,
        session_id: SessionId,
        message: &ChatMessage,
    ) -> Result<(), StorageError> {
        let mut messages = self.messages.write().await;
        messages
            .entry(session_id)
            .or_default()
            .push(message.clone());
        Ok(())
    }
}
