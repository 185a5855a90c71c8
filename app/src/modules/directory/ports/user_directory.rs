use async_trait::async_trait;
use thiserror::Error;

use crate::modules::chat::domain::SessionId;

/// 用户目录错误
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Error loading user data: {0}")]
    ReadError(String),

    #[error("Error saving user data: {0}")]
    WriteError(String),

    #[error("Error loading user data: malformed user file ({0})")]
    Corrupt(String),

    #[error("The name \"{0}\" is already registered. Choose another name.")]
    NameTaken(String),
}

/// 用户目录端口
///
/// 显示名按原样比较，不做大小写或空白处理
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// 注册显示名，生成并返回新的会话 ID
    async fn register(&self, display_name: &str) -> Result<SessionId, DirectoryError>;

    /// 查找显示名对应的会话 ID；未注册返回 None
    async fn lookup(&self, display_name: &str) -> Result<Option<SessionId>, DirectoryError>;
}
