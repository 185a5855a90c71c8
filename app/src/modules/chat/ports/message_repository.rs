use async_trait::async_trait;
use thiserror::Error;

use super::super::domain::{ChatMessage, ChatTurn, SessionId};

/// 存储错误类型
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// 会话存储端口
///
/// 以会话 ID 为隔离键的只追加消息存储
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// 创建表（幂等，可在启动时并发调用）
    async fn ensure_schema(&self) -> Result<(), StorageError>;

    /// 获取会话的全部消息，按插入顺序
    async fn history(&self, session_id: SessionId) -> Result<Vec<ChatTurn>, StorageError>;

    /// 追加一条消息
    async fn append(&self, session_id: SessionId, message: &ChatMessage)
        -> Result<(), StorageError>;
}
