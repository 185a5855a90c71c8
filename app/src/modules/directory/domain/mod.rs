// Directory Domain Layer
//
// 用户目录：显示名 → 会话 ID

use serde::{Deserialize, Serialize};

use crate::modules::chat::domain::SessionId;

/// 用户记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub display_name: String,
    pub session_id: SessionId,
}

impl UserRecord {
    pub fn new(display_name: impl Into<String>, session_id: SessionId) -> Self {
        Self {
            display_name: display_name.into(),
            session_id,
        }
    }
}

/// 重名注册策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateNamePolicy {
    /// 覆盖旧映射（改名语义，旧会话仍保留在存储中但无法再通过该名字找回）
    #[default]
    Overwrite,
    /// 拒绝重复注册
    Reject,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_serde() {
        let policy: DuplicateNamePolicy = serde_json::from_str("\"reject\"").unwrap();
        assert_eq!(policy, DuplicateNamePolicy::Reject);
        assert_eq!(DuplicateNamePolicy::default(), DuplicateNamePolicy::Overwrite);
    }
}
