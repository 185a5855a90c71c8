use thiserror::Error;

use crate::modules::chat::{ApplicationError, LLMError, StorageError};
use crate::modules::config::ConfigError;
use crate::modules::directory::DirectoryError;

/// 应用级错误分类
///
/// 所有错误都在页面内联展示，不会让进程崩溃，也不会自动重试
#[derive(Error, Debug)]
pub enum AppError {
    /// 启动配置错误（如缺少 API Key），页面将只显示此错误
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// 用户目录文件无法读写或格式错误
    #[error("{0}")]
    DirectoryError(String),

    /// 模型调用失败或超时
    #[error("Model error: {0}")]
    ModelError(String),

    /// 会话存储不可用
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::ConfigError(e.to_string())
    }
}

impl From<DirectoryError> for AppError {
    fn from(e: DirectoryError) -> Self {
        AppError::DirectoryError(e.to_string())
    }
}

impl From<LLMError> for AppError {
    fn from(e: LLMError) -> Self {
        AppError::ModelError(e.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        AppError::StorageError(e.to_string())
    }
}

impl From<ApplicationError> for AppError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::LLMError(e) => e.into(),
            ApplicationError::StorageError(e) => e.into(),
            ApplicationError::ValidationError(msg) => AppError::ValidationError(msg),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_error_mapping() {
        let err: AppError = ApplicationError::LLMError(LLMError::RateLimitError {
            retry_after_secs: 60,
        })
        .into();
        assert!(matches!(err, AppError::ModelError(_)));

        let err: AppError =
            ApplicationError::StorageError(StorageError::Unavailable("locked".into())).into();
        assert!(matches!(err, AppError::StorageError(_)));

        let err: AppError = ApplicationError::ValidationError("Please enter a message.".into()).into();
        assert_eq!(err.to_string(), "Please enter a message.");
    }
}
