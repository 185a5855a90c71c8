// Session Controller
//
// 与 Web 框架无关的会话控制器：登录（新建 / 恢复）与对话循环

use std::sync::Arc;
use tracing::{info, warn};

use super::domain::{ActiveUser, LoginChoice, SessionState};
use crate::modules::chat::{ChatMessage, ChatModule, ListMessagesQuery, SendMessageCommand};
use crate::modules::directory::UserDirectory;
use crate::shared::{AppError, Notice};

/// 找不到会话时的提示
pub const NO_SESSION_MESSAGE: &str = "No session found for this name. Try creating a new one.";

/// 未填写名字时的提示
pub const EMPTY_NAME_MESSAGE: &str = "Please enter your name.";

/// 会话控制器
pub struct SessionController {
    directory: Arc<dyn UserDirectory>,
    chat: Arc<ChatModule>,
}

impl SessionController {
    pub fn new(directory: Arc<dyn UserDirectory>, chat: Arc<ChatModule>) -> Self {
        Self { directory, chat }
    }

    /// 选择登录方式
    pub fn choose(&self, state: &mut SessionState, choice: LoginChoice) {
        state.select(choice);
    }

    /// 按所选方式登录
    pub async fn login(&self, state: &mut SessionState, choice: LoginChoice, display_name: &str) {
        self.choose(state, choice);
        match choice {
            LoginChoice::New => self.login_new(state, display_name).await,
            LoginChoice::Existing => self.login_existing(state, display_name).await,
        }
    }

    /// 新用户：注册并开始空白会话
    pub async fn login_new(&self, state: &mut SessionState, display_name: &str) {
        if display_name.trim().is_empty() {
            state.notify(Notice::error(EMPTY_NAME_MESSAGE));
            return;
        }

        match self.directory.register(display_name).await {
            Ok(session_id) => {
                state.log_in(
                    ActiveUser {
                        display_name: display_name.to_string(),
                        session_id,
                    },
                    Vec::new(),
                );
                state.notify(Notice::success(format!(
                    "Welcome, {}! Your session has started.",
                    display_name
                )));
            }
            Err(e) => {
                warn!("Registration failed: {}", e);
                state.notify(Notice::from(&AppError::from(e)));
            }
        }
    }

    /// 老用户：查找会话并加载历史
    pub async fn login_existing(&self, state: &mut SessionState, display_name: &str) {
        if display_name.trim().is_empty() {
            state.notify(Notice::error(EMPTY_NAME_MESSAGE));
            return;
        }

        let session_id = match self.directory.lookup(display_name).await {
            Ok(found) => found,
            Err(e) => {
                warn!("User directory lookup failed: {}", e);
                state.notify(Notice::from(&AppError::from(e)));
                None
            }
        };

        let Some(session_id) = session_id else {
            state.notify(Notice::error(NO_SESSION_MESSAGE));
            return;
        };

        let transcript = match self
            .chat
            .list_messages(ListMessagesQuery::for_session(session_id))
            .await
        {
            Ok(response) => response.messages,
            Err(e) => {
                warn!("Failed to load history for session {}: {}", session_id, e);
                state.notify(Notice::from(&AppError::from(e)));
                Vec::new()
            }
        };

        info!(
            "Resumed session {} with {} messages",
            session_id,
            transcript.len()
        );
        state.log_in(
            ActiveUser {
                display_name: display_name.to_string(),
                session_id,
            },
            transcript,
        );
        state.notify(Notice::success(format!(
            "Welcome back, {}! Resuming session.",
            display_name
        )));
    }

    /// 提交一条消息
    ///
    /// 空白输入被忽略；模型失败时保留已显示的用户消息并给出错误提示
    pub async fn submit(&self, state: &mut SessionState, input: &str) {
        if input.trim().is_empty() {
            return;
        }
        let Some(user) = state.active_user().cloned() else {
            return;
        };

        state.push_message(ChatMessage::human(input));

        let command = SendMessageCommand::new(user.session_id, user.display_name, input);
        match self.chat.send_message(command).await {
            Ok(response) => state.push_message(response.reply),
            Err(e) => {
                warn!("Chat request failed: {}", e);
                state.notify(Notice::from(&AppError::from(e)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::chat::{
        ChatSettings, ChatTurn, CompletionRequest, CompletionResponse, InMemoryMessageRepository,
        LLMError, LLMPort, MessageRepository, MockLLMAdapter, ProviderInfo, ProviderType,
        SessionId, StorageError,
    };
    use crate::modules::directory::{
        DuplicateNamePolicy, FileUserDirectory, InMemoryUserDirectory,
    };
    use crate::modules::session::LoginStage;
    use crate::shared::NoticeLevel;
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct UnavailableLLMPort;

    #[async_trait]
    impl LLMPort for UnavailableLLMPort {
        fn provider_id(&self) -> &str {
            "unavailable"
        }

        fn provider_info(&self) -> ProviderInfo {
            ProviderInfo {
                id: "unavailable".to_string(),
                name: "Unavailable".to_string(),
                provider_type: ProviderType::Gemini,
                model: "none".to_string(),
            }
        }

        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> Result<CompletionResponse, LLMError> {
            Err(LLMError::NetworkError("connection refused".to_string()))
        }
    }

    /// 读取历史总是失败的存储
    struct LockedMessageRepository;

    #[async_trait]
    impl MessageRepository for LockedMessageRepository {
        async fn ensure_schema(&self) -> Result<(), StorageError> {
            Ok(())
        }

        async fn history(&self, _session_id: SessionId) -> Result<Vec<ChatTurn>, StorageError> {
            Err(StorageError::Unavailable("database is locked".to_string()))
        }

        async fn append(
            &self,
            _session_id: SessionId,
            _message: &ChatMessage,
        ) -> Result<(), StorageError> {
            Ok(())
        }
    }

    fn controller_with(
        directory: Arc<dyn UserDirectory>,
        llm: Arc<dyn LLMPort>,
    ) -> (SessionController, Arc<InMemoryMessageRepository>) {
        let repo = Arc::new(InMemoryMessageRepository::new());
        let chat = Arc::new(ChatModule::with_components(
            repo.clone(),
            llm,
            ChatSettings::default(),
        ));
        (SessionController::new(directory, chat), repo)
    }

    fn controller() -> (SessionController, Arc<InMemoryMessageRepository>) {
        controller_with(
            Arc::new(InMemoryUserDirectory::new()),
            Arc::new(MockLLMAdapter::new()),
        )
    }

    #[tokio::test]
    async fn test_new_user_flow() {
        let (controller, repo) = controller();
        let mut state = SessionState::new();

        controller.login(&mut state, LoginChoice::New, "Ada").await;
        assert!(state.is_logged_in());
        assert!(state.transcript().is_empty());
        let notices = state.take_notices();
        assert_eq!(notices[0].level, NoticeLevel::Success);
        assert_eq!(notices[0].text, "Welcome, Ada! Your session has started.");

        controller.submit(&mut state, "What is a p-value?").await;
        assert_eq!(state.transcript().len(), 2);
        assert_eq!(state.transcript()[1].content(), "You said: What is a p-value?");

        let session_id = state.active_user().unwrap().session_id;
        assert_eq!(repo.history(session_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_existing_user_resumes_history() {
        let (controller, _repo) = controller();

        let mut first = SessionState::new();
        controller.login(&mut first, LoginChoice::New, "Ada").await;
        controller.submit(&mut first, "hello").await;

        let mut second = SessionState::new();
        controller
            .login(&mut second, LoginChoice::Existing, "Ada")
            .await;

        assert_eq!(second.active_user(), first.active_user());
        assert_eq!(second.transcript(), first.transcript());
        assert_eq!(
            second.take_notices()[0].text,
            "Welcome back, Ada! Resuming session."
        );
    }

    #[tokio::test]
    async fn test_history_failure_still_logs_in_with_empty_transcript() {
        let directory = Arc::new(InMemoryUserDirectory::new());
        let session_id = directory.register("Ada").await.unwrap();
        let chat = Arc::new(ChatModule::with_components(
            Arc::new(LockedMessageRepository),
            Arc::new(MockLLMAdapter::new()),
            ChatSettings::default(),
        ));
        let controller = SessionController::new(directory, chat);
        let mut state = SessionState::new();

        controller
            .login(&mut state, LoginChoice::Existing, "Ada")
            .await;

        assert_eq!(
            state.stage(),
            &LoginStage::LoggedIn(ActiveUser {
                display_name: "Ada".to_string(),
                session_id,
            })
        );
        assert!(state.transcript().is_empty());
        let notices = state.take_notices();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert!(notices[0].text.starts_with("Storage error: "));
        assert!(notices[0].text.contains("database is locked"));
        assert_eq!(notices[1].level, NoticeLevel::Success);
        assert_eq!(notices[1].text, "Welcome back, Ada! Resuming session.");
    }

    #[tokio::test]
    async fn test_unknown_name_stays_logged_out() {
        let (controller, _repo) = controller();
        let mut state = SessionState::new();

        controller
            .login(&mut state, LoginChoice::Existing, "Nonexistent")
            .await;

        assert_eq!(
            state.stage(),
            &LoginStage::AwaitingChoice(LoginChoice::Existing)
        );
        let notices = state.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert_eq!(notices[0].text, NO_SESSION_MESSAGE);
    }

    #[tokio::test]
    async fn test_failed_lookup_keeps_current_login() {
        let (controller, _repo) = controller();
        let mut state = SessionState::new();

        controller.login(&mut state, LoginChoice::New, "Ada").await;
        let ada = state.active_user().cloned();
        controller
            .login(&mut state, LoginChoice::Existing, "Nonexistent")
            .await;

        assert_eq!(state.active_user().cloned(), ada);
    }

    #[tokio::test]
    async fn test_corrupt_user_file_reports_and_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("user_data.json");
        std::fs::write(&path, "[1, 2").unwrap();
        let (controller, _repo) = controller_with(
            Arc::new(FileUserDirectory::new(&path)),
            Arc::new(MockLLMAdapter::new()),
        );
        let mut state = SessionState::new();

        controller
            .login(&mut state, LoginChoice::Existing, "Ada")
            .await;

        assert!(!state.is_logged_in());
        let notices = state.take_notices();
        assert_eq!(notices.len(), 2);
        assert!(notices[0].text.starts_with("Error loading user data"));
        assert_eq!(notices[1].text, NO_SESSION_MESSAGE);

        // 注册同样失败，且文件保持原样
        controller.login(&mut state, LoginChoice::New, "Ada").await;
        assert!(!state.is_logged_in());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[1, 2");
    }

    #[tokio::test]
    async fn test_rejected_duplicate_name() {
        let (controller, _repo) = controller_with(
            Arc::new(InMemoryUserDirectory::new().with_policy(DuplicateNamePolicy::Reject)),
            Arc::new(MockLLMAdapter::new()),
        );

        let mut first = SessionState::new();
        controller.login(&mut first, LoginChoice::New, "Ada").await;

        let mut second = SessionState::new();
        controller.login(&mut second, LoginChoice::New, "Ada").await;

        assert!(!second.is_logged_in());
        assert_eq!(second.take_notices()[0].level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn test_blank_inputs_ignored() {
        let (controller, repo) = controller();
        let mut state = SessionState::new();

        controller.login(&mut state, LoginChoice::New, "   ").await;
        assert!(!state.is_logged_in());
        assert_eq!(state.take_notices()[0].text, EMPTY_NAME_MESSAGE);

        controller.login(&mut state, LoginChoice::New, "Ada").await;
        state.take_notices();
        controller.submit(&mut state, " \t ").await;

        assert!(state.transcript().is_empty());
        assert!(state.notices().is_empty());
        let session_id = state.active_user().unwrap().session_id;
        assert!(repo.history(session_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_while_logged_out_is_ignored() {
        let (controller, _repo) = controller();
        let mut state = SessionState::new();

        controller.submit(&mut state, "hello").await;
        assert!(state.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_model_failure_keeps_human_turn_visible() {
        let (controller, repo) = controller_with(
            Arc::new(InMemoryUserDirectory::new()),
            Arc::new(UnavailableLLMPort),
        );
        let mut state = SessionState::new();
        controller.login(&mut state, LoginChoice::New, "Ada").await;
        state.take_notices();

        controller.submit(&mut state, "Are you there?").await;

        assert_eq!(state.transcript(), &[ChatMessage::human("Are you there?")]);
        let notices = state.take_notices();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].text.starts_with("Model error"));

        let session_id = state.active_user().unwrap().session_id;
        assert!(repo.history(session_id).await.unwrap().is_empty());
    }
}
