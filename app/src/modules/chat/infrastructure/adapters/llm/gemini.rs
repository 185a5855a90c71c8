// Google Gemini 适配器
//
// 调用 Generative Language REST 接口：
// POST {base_url}/v1beta/models/{model}:generateContent

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

/// Gemini API 适配器
pub struct GeminiAdapter {
    client: Client,
    config: LLMProviderConfig,
}

impl GeminiAdapter {
    /// 创建新的 Gemini 适配器
    pub fn new(config: LLMProviderConfig) -> Result<Self, LLMError> {
        let client = build_client(config.timeout_secs)?;
        Ok(Self { client, config })
    }

    /// 获取 API URL
    fn api_url(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }

    /// 转换为 Gemini 请求格式
    ///
    /// 系统指令放入 systemInstruction，助手消息的角色为 "model"
    fn to_gemini_request(request: &CompletionRequest) -> GeminiRequest {
        GeminiRequest {
            contents: to_contents(&request.prompt),
            system_instruction: request
                .prompt
                .system()
                .map(|segment| GeminiContent::text(None, &segment.content)),
            generation_config: GenerationConfig {
                temperature: request.temperature,
            },
        }
    }

    /// 解析 Gemini 响应
    fn parse_response(response: GeminiResponse) -> Result<CompletionResponse, LLMError> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or(LLMError::EmptyResponse)?;

        let content: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        let finish_reason = match candidate.finish_reason.as_deref() {
            Some("STOP") | None => FinishReason::Stop,
            Some("MAX_TOKENS") => FinishReason::Length,
            Some("SAFETY") | Some("RECITATION") | Some("BLOCKLIST") => FinishReason::ContentFilter,
            Some(_) => FinishReason::Other,
        };

        Ok(CompletionResponse {
            content,
            finish_reason,
            usage: response.usage_metadata.map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            }),
        })
    }
}

/// 对话片段转换为 Gemini contents
fn to_contents(prompt: &StructuredPrompt) -> Vec<GeminiContent> {
    prompt
        .conversation()
        .map(|segment| {
            let role = match segment.role {
                PromptRole::Assistant => "model",
                PromptRole::Human | PromptRole::System => "user",
            };
            GeminiContent::text(Some(role), &segment.content)
        })
        .collect()
}

#[async_trait]
impl LLMPort for GeminiAdapter {
    fn provider_id(&self) -> &str {
        &self.config.id
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo {
            id: self.config.id.clone(),
            name: self.config.name.clone(),
            provider_type: ProviderType::Gemini,
            model: self.config.default_model.clone(),
        }
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LLMError> {
        let body = Self::to_gemini_request(&request);
        let url = self.api_url(&request.model);

        debug!(
            "Sending Gemini request: model={}, segments={}",
            request.model,
            request.prompt.len()
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LLMError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_from_response("Gemini", response).await);
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| LLMError::InvalidResponse(e.to_string()))?;

        Self::parse_response(gemini_response)
    }
}

// Gemini API 类型定义

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

impl GeminiContent {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![GeminiPart {
                text: Some(text.to_string()),
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::chat::domain::{ChatMessage, PromptTemplate};
    use axum::{http::StatusCode as HttpStatus, routing::post, Json, Router};
    use serde_json::{json, Value};

    fn sample_request() -> CompletionRequest {
        let history = vec![
            ChatMessage::human("What is a p-value?"),
            ChatMessage::assistant("A p-value is..."),
        ];
        let prompt = PromptTemplate::new().render("Ada", &history, "And a t-test?");
        CompletionRequest::new(prompt, "gemini-1.5-pro").with_temperature(0.7)
    }

    /// 在本地端口启动一个假的 Gemini 服务
    async fn spawn_fake(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn adapter_for(base_url: String) -> GeminiAdapter {
        GeminiAdapter::new(LLMProviderConfig {
            base_url,
            api_key: "test-key".to_string(),
            timeout_secs: 5,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_request_mapping() {
        let body = serde_json::to_value(GeminiAdapter::to_gemini_request(&sample_request())).unwrap();

        assert!(body["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("Ada"));
        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["parts"][0]["text"], "And a t-test?");
        let temperature = body["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_parse_response_joins_parts() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "A t-test "}, {"text": "compares means."}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 5, "totalTokenCount": 17}
        }))
        .unwrap();

        let parsed = GeminiAdapter::parse_response(response).unwrap();
        assert_eq!(parsed.content, "A t-test compares means.");
        assert_eq!(parsed.finish_reason, FinishReason::Stop);
        assert_eq!(parsed.usage.unwrap().total_tokens, 17);
    }

    #[test]
    fn test_parse_response_without_candidates() {
        let response: GeminiResponse = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(
            GeminiAdapter::parse_response(response),
            Err(LLMError::EmptyResponse)
        ));
    }

    #[test]
    fn test_parse_blocked_response() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{"finishReason": "SAFETY"}]
        }))
        .unwrap();

        let parsed = GeminiAdapter::parse_response(response).unwrap();
        assert_eq!(parsed.content, "");
        assert_eq!(parsed.finish_reason, FinishReason::ContentFilter);
    }

    #[tokio::test]
    async fn test_complete_against_fake_server() {
        let router = Router::new().route(
            "/v1beta/models/{model}",
            post(|Json(body): Json<Value>| async move {
                let question = body["contents"]
                    .as_array()
                    .and_then(|c| c.last())
                    .and_then(|c| c["parts"][0]["text"].as_str())
                    .unwrap_or_default()
                    .to_string();
                Json(json!({
                    "candidates": [{
                        "content": {"role": "model", "parts": [{"text": format!("echo: {}", question)}]},
                        "finishReason": "STOP"
                    }]
                }))
            }),
        );
        let adapter = adapter_for(spawn_fake(router).await);

        let response = adapter.complete(sample_request()).await.unwrap();
        assert_eq!(response.content, "echo: And a t-test?");
    }

    #[tokio::test]
    async fn test_rate_limit_maps_to_error() {
        let router = Router::new().route(
            "/v1beta/models/{model}",
            post(|| async { (HttpStatus::TOO_MANY_REQUESTS, "quota exceeded") }),
        );
        let adapter = adapter_for(spawn_fake(router).await);

        let result = adapter.complete(sample_request()).await;
        assert!(matches!(result, Err(LLMError::RateLimitError { .. })));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // 绑定后立即释放端口，保证无人监听
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let adapter = adapter_for(format!("http://{}", addr));
        let result = adapter.complete(sample_request()).await;
        assert!(matches!(result, Err(LLMError::NetworkError(_))));
    }
}
