// Chat Module - 聊天模块
//
// 实现六边形架构（Hexagonal Architecture）：
// - domain: 领域层，包含实体、值对象和领域服务（提示模板、输出解析）
// - ports: 端口层，定义与外部世界的抽象接口（模型、消息存储）
// - infrastructure: 基础设施层，实现端口的具体适配器
// - application: 应用层，实现 CQRS 命令和查询处理器

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

// 重新导出常用类型
pub use application::{
    // Traits
    ApplicationError,
    CommandHandler,
    // Queries
    ListMessagesHandler,
    ListMessagesQuery,
    ListMessagesResponse,
    QueryHandler,
    // Commands
    SendMessageCommand,
    SendMessageHandler,
    SendMessageResponse,
    EMPTY_INPUT_MESSAGE,
};

pub use domain::{
    ChatMessage, ChatTurn, HistoryWindow, MessageRole, PromptRole, PromptSegment, PromptTemplate,
    SessionId, StrOutputParser, StructuredPrompt,
};

pub use infrastructure::{
    create_adapter, GeminiAdapter, InMemoryMessageRepository, MockLLMAdapter, OpenAIAdapter,
    SqliteMessageRepository,
};

pub use ports::{
    CompletionRequest, CompletionResponse, FinishReason, LLMError, LLMPort, LLMProviderConfig,
    MessageRepository, ProviderInfo, ProviderType, StorageError, TokenUsage,
};

use std::path::Path;
use std::sync::Arc;

/// 对话链的固定参数
#[derive(Debug, Clone)]
pub struct ChatSettings {
    /// 模型 ID
    pub model: String,
    /// 温度参数
    pub temperature: Option<f32>,
    /// 历史窗口策略
    pub history_window: HistoryWindow,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-pro".to_string(),
            temperature: Some(0.7),
            history_window: HistoryWindow::Unbounded,
        }
    }
}

/// Chat 模块容器
///
/// 管理模块内的依赖注入；进程内只构建一次，所有浏览器会话共享
pub struct ChatModule {
    send_message_handler: SendMessageHandler,
    list_messages_handler: ListMessagesHandler,
}

impl ChatModule {
    /// 创建新的 ChatModule 实例（内存存储，用于开发测试）
    pub fn new(llm_port: Arc<dyn LLMPort>, settings: ChatSettings) -> Self {
        Self::with_components(
            Arc::new(InMemoryMessageRepository::new()),
            llm_port,
            settings,
        )
    }

    /// 创建带 SQLite 持久化的 ChatModule 实例
    ///
    /// # Errors
    /// 无法打开数据库或建表失败时返回错误
    pub async fn new_with_persistence(
        database_path: impl AsRef<Path>,
        llm_port: Arc<dyn LLMPort>,
        settings: ChatSettings,
    ) -> Result<Self, StorageError> {
        let repository = SqliteMessageRepository::open(database_path)?;
        repository.ensure_schema().await?;

        Ok(Self::with_components(
            Arc::new(repository),
            llm_port,
            settings,
        ))
    }

    /// 使用自定义组件创建 ChatModule
    pub fn with_components(
        message_repository: Arc<dyn MessageRepository>,
        llm_port: Arc<dyn LLMPort>,
        settings: ChatSettings,
    ) -> Self {
        let mut send_message_handler = SendMessageHandler::new(
            message_repository.clone(),
            llm_port,
            settings.model,
        )
        .with_template(PromptTemplate::new().with_window(settings.history_window));
        if let Some(temperature) = settings.temperature {
            send_message_handler = send_message_handler.with_temperature(temperature);
        }
        let list_messages_handler = ListMessagesHandler::new(message_repository);

        Self {
            send_message_handler,
            list_messages_handler,
        }
    }

    // Command handlers

    /// 发送消息并获取回复
    pub async fn send_message(
        &self,
        command: SendMessageCommand,
    ) -> Result<SendMessageResponse, ApplicationError> {
        self.send_message_handler.handle(command).await
    }

    // Query handlers

    /// 列出会话消息
    pub async fn list_messages(
        &self,
        query: ListMessagesQuery,
    ) -> Result<ListMessagesResponse, ApplicationError> {
        self.list_messages_handler.handle(query).await
    }
}
