// Session Domain
//
// 单个浏览器会话的界面状态（仅在内存中，进程退出即丢弃）

use serde::{Deserialize, Serialize};

use crate::modules::chat::domain::{ChatMessage, SessionId};
use crate::shared::Notice;

/// 登录方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginChoice {
    #[default]
    New,
    Existing,
}

impl LoginChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginChoice::New => "new",
            LoginChoice::Existing => "existing",
        }
    }

    /// 单选框文案
    pub fn label(&self) -> &'static str {
        match self {
            LoginChoice::New => "New User ID",
            LoginChoice::Existing => "Existing User ID",
        }
    }

    /// 提交按钮文案
    pub fn action_label(&self) -> &'static str {
        match self {
            LoginChoice::New => "Start Chat",
            LoginChoice::Existing => "Retrieve Session",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "new" => Some(LoginChoice::New),
            "existing" => Some(LoginChoice::Existing),
            _ => None,
        }
    }
}

/// 已登录用户
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveUser {
    pub display_name: String,
    pub session_id: SessionId,
}

/// 登录阶段
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoginStage {
    #[default]
    LoggedOut,
    AwaitingChoice(LoginChoice),
    LoggedIn(ActiveUser),
}

/// 浏览器会话状态
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    stage: LoginStage,
    /// 侧边栏当前选中的登录方式
    selected: LoginChoice,
    /// 页面显示的对话（存储内容的渲染副本）
    transcript: Vec<ChatMessage>,
    /// 待显示的一次性提示
    notices: Vec<Notice>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> &LoginStage {
        &self.stage
    }

    pub fn selected_choice(&self) -> LoginChoice {
        self.selected
    }

    pub fn active_user(&self) -> Option<&ActiveUser> {
        match &self.stage {
            LoginStage::LoggedIn(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.active_user().is_some()
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// 取出并清空提示
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub(super) fn select(&mut self, choice: LoginChoice) {
        self.selected = choice;
        if !self.is_logged_in() {
            self.stage = LoginStage::AwaitingChoice(choice);
        }
    }

    pub(super) fn log_in(&mut self, user: ActiveUser, transcript: Vec<ChatMessage>) {
        self.stage = LoginStage::LoggedIn(user);
        self.transcript = transcript;
    }

    pub(super) fn push_message(&mut self, message: ChatMessage) {
        self.transcript.push(message);
    }

    pub(super) fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_parse() {
        assert_eq!(LoginChoice::parse("new"), Some(LoginChoice::New));
        assert_eq!(LoginChoice::parse("existing"), Some(LoginChoice::Existing));
        assert_eq!(LoginChoice::parse("admin"), None);
    }

    #[test]
    fn test_select_does_not_log_out() {
        let mut state = SessionState::new();
        assert_eq!(state.stage(), &LoginStage::LoggedOut);

        state.select(LoginChoice::Existing);
        assert_eq!(
            state.stage(),
            &LoginStage::AwaitingChoice(LoginChoice::Existing)
        );

        let user = ActiveUser {
            display_name: "Ada".to_string(),
            session_id: SessionId::new(),
        };
        state.log_in(user.clone(), Vec::new());
        state.select(LoginChoice::New);

        assert_eq!(state.active_user(), Some(&user));
        assert_eq!(state.selected_choice(), LoginChoice::New);
    }

    #[test]
    fn test_take_notices_clears() {
        let mut state = SessionState::new();
        state.notify(Notice::info("hello"));

        assert_eq!(state.take_notices().len(), 1);
        assert!(state.notices().is_empty());
    }
}
