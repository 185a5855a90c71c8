use serde::{Deserialize, Serialize};

use super::super::value_objects::SessionId;

/// 消息角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// 用户消息
    Human,
    /// AI 助手消息
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::Human => "human",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// 一条对话消息
///
/// 用标签变体区分用户与助手，渲染时按变体匹配而不做运行时类型判断
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "content", rename_all = "lowercase")]
pub enum ChatMessage {
    Human(String),
    Assistant(String),
}

impl ChatMessage {
    pub fn human(content: impl Into<String>) -> Self {
        ChatMessage::Human(content.into())
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage::Assistant(content.into())
    }

    pub fn role(&self) -> MessageRole {
        match self {
            ChatMessage::Human(_) => MessageRole::Human,
            ChatMessage::Assistant(_) => MessageRole::Assistant,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            ChatMessage::Human(content) | ChatMessage::Assistant(content) => content,
        }
    }

    pub fn is_human(&self) -> bool {
        matches!(self, ChatMessage::Human(_))
    }
}

/// 对话轮次实体
///
/// 只追加，不更新也不删除；顺序即插入顺序
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    session_id: SessionId,
    message: ChatMessage,
}

impl ChatTurn {
    pub fn new(session_id: SessionId, message: ChatMessage) -> Self {
        Self {
            session_id,
            message,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn message(&self) -> &ChatMessage {
        &self.message
    }

    pub fn role(&self) -> MessageRole {
        self.message.role()
    }

    pub fn content(&self) -> &str {
        self.message.content()
    }

    pub fn into_message(self) -> ChatMessage {
        self.message
    }
}
