// Config Domain Entities
//
// 配置领域实体定义

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::modules::chat::ports::ProviderType;
use crate::modules::directory::DuplicateNamePolicy;

/// 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8501".to_string(),
        }
    }
}

/// 存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub user_file: String,
    pub database_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            user_file: "user_data.json".to_string(),
            database_file: "chats_data.sqlite".to_string(),
        }
    }
}

impl StorageConfig {
    /// 用户目录文件路径
    pub fn user_file_path(&self) -> PathBuf {
        self.data_dir.join(&self.user_file)
    }

    /// SQLite 数据库路径
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }
}

/// LLM 配置
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmConfig {
    pub provider: ProviderType,
    pub model: String,
    pub temperature: f32,
    /// 覆盖提供商默认地址
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    /// 配置文件中的 API Key（环境变量优先）
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderType::Gemini,
            model: "gemini-1.5-pro".to_string(),
            temperature: 0.7,
            base_url: None,
            timeout_secs: 60,
            api_key: None,
        }
    }
}

impl LlmConfig {
    /// 实际使用的 API 地址
    pub fn effective_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| self.provider.default_base_url().to_string())
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

/// 对话配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatConfig {
    /// 提示中保留的最多历史消息数，None 表示不限
    pub history_window: Option<usize>,
    /// 重名注册策略
    pub duplicate_names: DuplicateNamePolicy,
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub llm: LlmConfig,
    pub chat: ChatConfig,
}

impl AppConfig {
    /// 校验配置，返回全部错误
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.server.bind_addr.parse::<SocketAddr>().is_err() {
            errors.push(format!(
                "server.bindAddr is not a socket address: {}",
                self.server.bind_addr
            ));
        }
        if self.storage.user_file.trim().is_empty() {
            errors.push("storage.userFile must not be empty".to_string());
        }
        if self.storage.database_file.trim().is_empty() {
            errors.push("storage.databaseFile must not be empty".to_string());
        }
        if self.llm.model.trim().is_empty() {
            errors.push("llm.model must not be empty".to_string());
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            errors.push(format!(
                "llm.temperature must be between 0 and 2, got {}",
                self.llm.temperature
            ));
        }
        if self.llm.timeout_secs == 0 {
            errors.push("llm.timeoutSecs must be positive".to_string());
        }
        if self.chat.history_window == Some(0) {
            errors.push("chat.historyWindow must be positive when set".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
