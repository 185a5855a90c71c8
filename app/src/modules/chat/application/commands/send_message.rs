use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::super::{ApplicationError, CommandHandler};
use crate::modules::chat::domain::{ChatMessage, PromptTemplate, SessionId, StrOutputParser};
use crate::modules::chat::ports::{CompletionRequest, LLMError, LLMPort, MessageRepository};

/// 空输入时的提示
pub const EMPTY_INPUT_MESSAGE: &str = "Please enter a message.";

/// 发送消息命令
#[derive(Debug, Clone)]
pub struct SendMessageCommand {
    /// 会话 ID
    pub session_id: SessionId,
    /// 用户显示名（渲染进系统提示）
    pub display_name: String,
    /// 用户消息内容
    pub content: String,
}

impl SendMessageCommand {
    pub fn new(
        session_id: SessionId,
        display_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            session_id,
            display_name: display_name.into(),
            content: content.into(),
        }
    }
}

/// 发送消息响应
#[derive(Debug, Clone)]
pub struct SendMessageResponse {
    /// 已持久化的用户消息
    pub human: ChatMessage,
    /// 已持久化的助手回复
    pub reply: ChatMessage,
}

impl SendMessageResponse {
    /// 助手回复的纯文本
    pub fn reply_text(&self) -> &str {
        self.reply.content()
    }
}

/// 发送消息命令处理器
///
/// 进程启动时构建一次，之后只读；会话 ID 与显示名随每次调用传入。
/// 执行顺序：加载历史 → 渲染提示 → 调用模型 → 解析输出 → 持久化 → 返回
pub struct SendMessageHandler {
    message_repository: Arc<dyn MessageRepository>,
    llm_port: Arc<dyn LLMPort>,
    template: PromptTemplate,
    parser: StrOutputParser,
    model: String,
    temperature: Option<f32>,
}

impl SendMessageHandler {
    pub fn new(
        message_repository: Arc<dyn MessageRepository>,
        llm_port: Arc<dyn LLMPort>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            message_repository,
            llm_port,
            template: PromptTemplate::new(),
            parser: StrOutputParser::new(),
            model: model.into(),
            temperature: None,
        }
    }

    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[async_trait]
impl CommandHandler<SendMessageCommand, SendMessageResponse> for SendMessageHandler {
    async fn handle(
        &self,
        command: SendMessageCommand,
    ) -> Result<SendMessageResponse, ApplicationError> {
        if command.content.trim().is_empty() {
            return Err(ApplicationError::ValidationError(
                EMPTY_INPUT_MESSAGE.to_string(),
            ));
        }

        // 加载历史
        let history: Vec<ChatMessage> = self
            .message_repository
            .history(command.session_id)
            .await?
            .into_iter()
            .map(|turn| turn.into_message())
            .collect();

        // 渲染提示
        let prompt = self
            .template
            .render(&command.display_name, &history, &command.content);

        debug!(
            "Invoking model for session {}: history={}, segments={}",
            command.session_id,
            history.len(),
            prompt.len()
        );

        // 调用模型，失败直接返回，不写入任何消息
        let mut request = CompletionRequest::new(prompt, self.model.clone());
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        let response = self.llm_port.complete(request).await.map_err(|e| {
            warn!("Model call failed for session {}: {}", command.session_id, e);
            e
        })?;

        let reply_text = self
            .parser
            .parse(&response.content)
            .ok_or(LLMError::EmptyResponse)?;

        // 回复确定后再依次写入用户消息与助手回复
        let human = ChatMessage::human(command.content);
        let reply = ChatMessage::assistant(reply_text);
        self.message_repository
            .append(command.session_id, &human)
            .await?;
        self.message_repository
            .append(command.session_id, &reply)
            .await?;

        info!(
            "Session {} answered ({} chars)",
            command.session_id,
            reply.content().len()
        );

        Ok(SendMessageResponse { human, reply })
    }
}
