use async_trait::async_trait;
use std::sync::Arc;

use super::super::{ApplicationError, QueryHandler};
use crate::modules::chat::domain::{ChatMessage, SessionId};
use crate::modules::chat::ports::MessageRepository;

/// 列出消息查询
#[derive(Debug, Clone)]
pub struct ListMessagesQuery {
    pub session_id: SessionId,
}

impl ListMessagesQuery {
    pub fn for_session(session_id: SessionId) -> Self {
        Self { session_id }
    }
}

/// 列出消息响应（按插入顺序）
#[derive(Debug, Clone)]
pub struct ListMessagesResponse {
    pub messages: Vec<ChatMessage>,
    pub total: usize,
}

/// 列出消息查询处理器
pub struct ListMessagesHandler {
    message_repository: Arc<dyn MessageRepository>,
}

impl ListMessagesHandler {
    pub fn new(message_repository: Arc<dyn MessageRepository>) -> Self {
        Self { message_repository }
    }
}

#[async_trait]
impl QueryHandler<ListMessagesQuery, ListMessagesResponse> for ListMessagesHandler {
    async fn handle(
        &self,
        query: ListMessagesQuery,
    ) -> Result<ListMessagesResponse, ApplicationError> {
        let messages: Vec<ChatMessage> = self
            .message_repository
            .history(query.session_id)
            .await?
            .into_iter()
            .map(|turn| turn.into_message())
            .collect();

        Ok(ListMessagesResponse {
            total: messages.len(),
            messages,
        })
    }
}
