// Config Service
//
// 配置服务门面：加载并校验配置、解析 API Key

use std::sync::Arc;
use tracing::{debug, warn};

use crate::modules::chat::ports::LLMProviderConfig;
use crate::modules::chat::ChatSettings;
use crate::modules::config::domain::{ApiKey, AppConfig};
use crate::modules::config::ports::{ConfigError, ConfigRepository, SecretSource};

/// API Key 的环境变量名
pub const API_KEY_VAR: &str = "API_KEY";

/// 启动所需的完整配置
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub config: AppConfig,
    pub api_key: ApiKey,
}

impl RuntimeConfig {
    /// 模型适配器配置
    pub fn provider_config(&self) -> LLMProviderConfig {
        let llm = &self.config.llm;
        LLMProviderConfig {
            id: llm.provider.id().to_string(),
            name: llm.provider.display_name().to_string(),
            provider_type: llm.provider,
            base_url: llm.effective_base_url(),
            api_key: self.api_key.expose().to_string(),
            default_model: llm.model.clone(),
            timeout_secs: llm.timeout_secs,
        }
    }

    /// 对话链参数
    pub fn chat_settings(&self) -> ChatSettings {
        ChatSettings {
            model: self.config.llm.model.clone(),
            temperature: Some(self.config.llm.temperature),
            history_window: self.config.chat.history_window.into(),
        }
    }
}

/// 配置服务实现
pub struct ConfigService {
    repository: Arc<dyn ConfigRepository>,
    secrets: Arc<dyn SecretSource>,
}

impl ConfigService {
    pub fn new(repository: Arc<dyn ConfigRepository>, secrets: Arc<dyn SecretSource>) -> Self {
        Self {
            repository,
            secrets,
        }
    }

    /// 获取仓储引用
    pub fn repository(&self) -> &Arc<dyn ConfigRepository> {
        &self.repository
    }

    /// 加载并校验配置
    pub async fn load(&self) -> Result<AppConfig, ConfigError> {
        let config = self.repository.load().await?;
        config
            .validate()
            .map_err(|errors| ConfigError::ValidationError { errors })?;
        debug!("Configuration: {:?}", config);
        Ok(config)
    }

    /// 解析 API Key：环境变量优先，其次配置文件
    pub fn resolve_api_key(&self, config: &AppConfig) -> Result<ApiKey, ConfigError> {
        if let Some(key) = self.secrets.get(API_KEY_VAR).and_then(ApiKey::new) {
            return Ok(key);
        }
        if let Some(key) = config.llm.api_key.as_deref().and_then(ApiKey::new) {
            debug!("Using API key from configuration file");
            return Ok(key);
        }

        warn!("No API key in environment or configuration");
        Err(ConfigError::MissingApiKey)
    }

    /// 加载启动所需的全部配置
    pub async fn load_runtime(&self) -> Result<RuntimeConfig, ConfigError> {
        let config = self.load().await?;
        let api_key = self.resolve_api_key(&config)?;
        Ok(RuntimeConfig { config, api_key })
    }
}
