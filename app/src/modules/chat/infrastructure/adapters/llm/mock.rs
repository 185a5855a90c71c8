use async_trait::async_trait;

use crate::modules::chat::domain::PromptRole;
use crate::modules::chat::ports::{
    CompletionRequest, CompletionResponse, FinishReason, LLMError, LLMPort, ProviderInfo,
    ProviderType,
};

/// 模拟 LLM 适配器
///
/// 原样回显最后一条用户输入，不访问网络
pub struct MockLLMAdapter;

impl MockLLMAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MockLLMAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMPort for MockLLMAdapter {
    fn provider_id(&self) -> &str {
        "mock"
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo {
            id: "mock".to_string(),
            name: "Mock Provider (Simulation)".to_string(),
            provider_type: ProviderType::Gemini,
            model: "mock-model".to_string(),
        }
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LLMError> {
        let user_content = request
            .prompt
            .segments()
            .iter()
            .rev()
            .find(|s| s.role == PromptRole::Human)
            .map(|s| s.content.as_str())
            .unwrap_or("");

        Ok(CompletionResponse {
            content: format!("You said: {}", user_content),
            finish_reason: FinishReason::Stop,
            usage: None,
        })
    }
}
