// OpenAI 兼容适配器
//
// POST {base_url}/chat/completions，Bearer 鉴权

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::http::{build_client, error_from_response};
use crate::modules::chat::domain::{PromptRole, StructuredPrompt};
use crate::modules::chat::ports::{
    CompletionRequest, CompletionResponse, FinishReason, LLMError, LLMPort, LLMProviderConfig,
    ProviderInfo, ProviderType, TokenUsage,
};

pub struct OpenAIAdapter {
    client: Client,
    config: LLMProviderConfig,
}

impl OpenAIAdapter {
    pub fn new(config: LLMProviderConfig) -> Result<Self, LLMError> {
        let client = build_client(config.timeout_secs)?;
        Ok(Self { client, config })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

impl<'a> From<&'a CompletionRequest> for ChatCompletionBody<'a> {
    fn from(request: &'a CompletionRequest) -> Self {
        Self {
            model: &request.model,
            messages: wire_messages(&request.prompt),
            temperature: request.temperature,
        }
    }
}

fn wire_messages(prompt: &StructuredPrompt) -> Vec<WireMessage<'_>> {
    prompt
        .segments()
        .iter()
        .map(|segment| WireMessage {
            role: match segment.role {
                PromptRole::System => "system",
                PromptRole::Human => "user",
                PromptRole::Assistant => "assistant",
            },
            content: &segment.content,
        })
        .collect()
}

fn finish_reason(raw: Option<&str>) -> FinishReason {
    match raw {
        None | Some("stop") => FinishReason::Stop,
        Some("length") => FinishReason::Length,
        Some("content_filter") => FinishReason::ContentFilter,
        Some(_) => FinishReason::Other,
    }
}

#[async_trait]
impl LLMPort for OpenAIAdapter {
    fn provider_id(&self) -> &str {
        &self.config.id
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo {
            id: self.config.id.clone(),
            name: self.config.name.clone(),
            provider_type: ProviderType::OpenAI,
            model: self.config.default_model.clone(),
        }
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LLMError> {
        debug!(
            "Sending chat completion: model={}, segments={}",
            request.model,
            request.prompt.len()
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&ChatCompletionBody::from(&request))
            .send()
            .await
            .map_err(|e| LLMError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_from_response("OpenAI", response).await);
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| LLMError::InvalidResponse(e.to_string()))?;
        let usage = completion.usage;
        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or(LLMError::EmptyResponse)?;

        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            finish_reason: finish_reason(choice.finish_reason.as_deref()),
            usage,
        })
    }
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default, deserialize_with = "usage_from_snake_case")]
    usage: Option<TokenUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// usage 字段是 snake_case，而 TokenUsage 按 camelCase 序列化
fn usage_from_snake_case<'de, D>(deserializer: D) -> Result<Option<TokenUsage>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Usage {
        prompt_tokens: u32,
        completion_tokens: u32,
        total_tokens: u32,
    }

    Ok(Option::<Usage>::deserialize(deserializer)?.map(|u| TokenUsage {
        prompt_tokens: u.prompt_tokens,
        completion_tokens: u.completion_tokens,
        total_tokens: u.total_tokens,
    }))
}
