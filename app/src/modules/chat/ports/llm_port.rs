use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::super::domain::StructuredPrompt;

/// LLM 错误类型
#[derive(Debug, Error)]
pub enum LLMError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error: {code} - {message}")]
    ApiError { code: String, message: String },

    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimitError { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("The model returned an empty reply")]
    EmptyResponse,
}

/// LLM 提供商类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    #[default]
    Gemini,
    OpenAI,
}

impl ProviderType {
    /// 提供商 ID
    pub fn id(&self) -> &'static str {
        match self {
            ProviderType::Gemini => "gemini",
            ProviderType::OpenAI => "openai",
        }
    }

    /// 提供商显示名
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderType::Gemini => "Google Gemini",
            ProviderType::OpenAI => "OpenAI",
        }
    }

    /// 提供商默认 API 地址
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderType::Gemini => "https://generativelanguage.googleapis.com",
            ProviderType::OpenAI => "https://api.openai.com/v1",
        }
    }
}

/// 提供商信息
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub id: String,
    pub name: String,
    pub provider_type: ProviderType,
    pub model: String,
}

/// 补全请求
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// 结构化提示
    pub prompt: StructuredPrompt,
    /// 模型 ID
    pub model: String,
    /// 温度参数
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn new(prompt: StructuredPrompt, model: impl Into<String>) -> Self {
        Self {
            prompt,
            model: model.into(),
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }
}

/// 补全响应（模型原始输出）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    pub content: String,
    pub finish_reason: FinishReason,
    pub usage: Option<TokenUsage>,
}

/// 结束原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    Other,
}

/// Token 使用统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// LLM 服务端口
///
/// 托管模型的抽象边界：给定结构化提示返回生成文本，可能失败或被限流
#[async_trait]
pub trait LLMPort: Send + Sync {
    /// 获取提供商 ID
    fn provider_id(&self) -> &str;

    /// 获取提供商信息
    fn provider_info(&self) -> ProviderInfo;

    /// 单次补全请求（阻塞直到返回或失败，不重试）
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LLMError>;
}

/// LLM 提供商配置
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LLMProviderConfig {
    pub id: String,
    pub name: String,
    pub provider_type: ProviderType,
    pub base_url: String,
    pub api_key: String,
    pub default_model: String,
    pub timeout_secs: u64,
}

impl fmt::Debug for LLMProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LLMProviderConfig")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("provider_type", &self.provider_type)
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .field("default_model", &self.default_model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for LLMProviderConfig {
    fn default() -> Self {
        Self {
            id: ProviderType::Gemini.id().to_string(),
            name: ProviderType::Gemini.display_name().to_string(),
            provider_type: ProviderType::Gemini,
            base_url: ProviderType::Gemini.default_base_url().to_string(),
            api_key: String::new(),
            default_model: "gemini-1.5-pro".to_string(),
            timeout_secs: 60,
        }
    }
}
