// In-Memory Config Repository
//
// 基于内存的配置仓储与密钥来源（用于测试和开发）

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::modules::config::domain::AppConfig;
use crate::modules::config::ports::{ConfigError, ConfigRepository, SecretSource};

/// 内存配置仓储
pub struct InMemoryConfigRepository {
    config: Arc<RwLock<AppConfig>>,
}

impl InMemoryConfigRepository {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
        }
    }
}

impl Default for InMemoryConfigRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigRepository for InMemoryConfigRepository {
    async fn load(&self) -> Result<AppConfig, ConfigError> {
        let config = self.config.read().await;
        Ok(config.clone())
    }

    async fn exists(&self) -> Result<bool, ConfigError> {
        Ok(true)
    }
}

/// 内存密钥来源
#[derive(Debug, Clone, Default)]
pub struct InMemorySecretSource {
    values: HashMap<String, String>,
}

impl InMemorySecretSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl SecretSource for InMemorySecretSource {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
