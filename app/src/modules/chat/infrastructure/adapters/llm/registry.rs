use std::sync::Arc;
use tracing::info;

use crate::modules::chat::ports::{LLMError, LLMPort, LLMProviderConfig, ProviderType};

use super::{GeminiAdapter, OpenAIAdapter};

/// 根据配置创建适配器
pub fn create_adapter(config: &LLMProviderConfig) -> Result<Arc<dyn LLMPort>, LLMError> {
    if config.api_key.trim().is_empty() {
        return Err(LLMError::AuthenticationError(
            "API key is empty".to_string(),
        ));
    }

    let adapter: Arc<dyn LLMPort> = match config.provider_type {
        ProviderType::Gemini => Arc::new(GeminiAdapter::new(config.clone())?),
        ProviderType::OpenAI => Arc::new(OpenAIAdapter::new(config.clone())?),
    };

    info!(
        "Created LLM adapter: provider={}, model={}",
        adapter.provider_id(),
        config.default_model
    );

    Ok(adapter)
}
