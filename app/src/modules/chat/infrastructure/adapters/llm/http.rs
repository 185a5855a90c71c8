// 适配器共用的 HTTP 辅助函数

use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::error;

use crate::modules::chat::ports::LLMError;

/// 错误响应体最多保留的字符数
const MAX_ERROR_BODY: usize = 1024;

/// 服务端未给出 Retry-After 时的等待秒数
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// 构建带整体超时的客户端
pub(super) fn build_client(timeout_secs: u64) -> Result<Client, LLMError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| LLMError::NetworkError(e.to_string()))
}

/// 把非 2xx 响应转换为 LLMError
pub(super) async fn error_from_response(provider: &str, response: Response) -> LLMError {
    let status = response.status();
    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok());
    let body: String = response
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(MAX_ERROR_BODY)
        .collect();

    error!("{} API error: {} - {}", provider, status, body);
    status_error(status, retry_after, body)
}

fn status_error(status: StatusCode, retry_after: Option<u64>, body: String) -> LLMError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => LLMError::RateLimitError {
            retry_after_secs: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LLMError::AuthenticationError(body),
        _ => LLMError::ApiError {
            code: status.as_str().to_string(),
            message: body,
        },
    }
}
