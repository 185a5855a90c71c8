use serde::Serialize;

use super::AppError;

/// 提示级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

impl NoticeLevel {
    /// 页面使用的 CSS 类名
    pub fn css_class(&self) -> &'static str {
        match self {
            NoticeLevel::Success => "notice-success",
            NoticeLevel::Info => "notice-info",
            NoticeLevel::Error => "notice-error",
        }
    }
}

/// 页面内联提示（只显示一次）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

impl From<&AppError> for Notice {
    fn from(e: &AppError) -> Self {
        Notice::error(e.to_string())
    }
}
