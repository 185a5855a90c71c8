use serde::{Deserialize, Serialize};

use super::super::entities::ChatMessage;

/// 默认系统提示词，`{user_name}` 会被替换为显示名
pub const DEFAULT_SYSTEM_TEMPLATE: &str = "You are a helpful AI assistant specializing in Data Science. Answer when user asks about my name {user_name} is their name!.";

const USER_NAME_PLACEHOLDER: &str = "{user_name}";

/// 提示片段角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    System,
    Human,
    Assistant,
}

/// 带角色标签的提示片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSegment {
    pub role: PromptRole,
    pub content: String,
}

impl PromptSegment {
    pub fn new(role: PromptRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

impl From<&ChatMessage> for PromptSegment {
    fn from(message: &ChatMessage) -> Self {
        match message {
            ChatMessage::Human(content) => PromptSegment::new(PromptRole::Human, content.clone()),
            ChatMessage::Assistant(content) => {
                PromptSegment::new(PromptRole::Assistant, content.clone())
            }
        }
    }
}

/// 结构化提示：系统指令 + 历史 + 新输入，顺序固定
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredPrompt {
    segments: Vec<PromptSegment>,
}

impl StructuredPrompt {
    pub fn segments(&self) -> &[PromptSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// 系统指令（若有）
    pub fn system(&self) -> Option<&PromptSegment> {
        self.segments.iter().find(|s| s.role == PromptRole::System)
    }

    /// 除系统指令以外的对话片段
    pub fn conversation(&self) -> impl Iterator<Item = &PromptSegment> {
        self.segments.iter().filter(|s| s.role != PromptRole::System)
    }
}

/// 历史窗口策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryWindow {
    /// 保留全部历史
    #[default]
    Unbounded,
    /// 只保留最近 N 条历史消息
    LastTurns(usize),
}

impl From<Option<usize>> for HistoryWindow {
    fn from(limit: Option<usize>) -> Self {
        limit.map_or(HistoryWindow::Unbounded, HistoryWindow::LastTurns)
    }
}

impl HistoryWindow {
    /// 截取窗口内的历史；截断后不以助手消息开头
    fn apply<'a>(&self, history: &'a [ChatMessage]) -> &'a [ChatMessage] {
        match *self {
            HistoryWindow::Unbounded => history,
            HistoryWindow::LastTurns(n) => {
                let start = history.len().saturating_sub(n);
                let kept = &history[start..];
                if start > 0 && kept.first().is_some_and(|m| !m.is_human()) {
                    &kept[1..]
                } else {
                    kept
                }
            }
        }
    }
}

/// 提示模板
///
/// 领域服务：把显示名、历史与新输入渲染成结构化提示
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    system_template: String,
    window: HistoryWindow,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptTemplate {
    pub fn new() -> Self {
        Self {
            system_template: DEFAULT_SYSTEM_TEMPLATE.to_string(),
            window: HistoryWindow::Unbounded,
        }
    }

    pub fn with_system_template(mut self, template: impl Into<String>) -> Self {
        self.system_template = template.into();
        self
    }

    pub fn with_window(mut self, window: HistoryWindow) -> Self {
        self.window = window;
        self
    }

    pub fn window(&self) -> HistoryWindow {
        self.window
    }

    /// 渲染结构化提示
    ///
    /// 1. 系统指令（替换显示名）
    /// 2. 历史消息，最早的在前
    /// 3. 新的用户输入
    pub fn render(
        &self,
        display_name: &str,
        history: &[ChatMessage],
        new_input: &str,
    ) -> StructuredPrompt {
        let history = self.window.apply(history);
        let mut segments = Vec::with_capacity(history.len() + 2);

        segments.push(PromptSegment::new(
            PromptRole::System,
            self.system_template.replace(USER_NAME_PLACEHOLDER, display_name),
        ));
        segments.extend(history.iter().map(PromptSegment::from));
        segments.push(PromptSegment::new(PromptRole::Human, new_input));

        StructuredPrompt { segments }
    }
}
