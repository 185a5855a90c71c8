// File-based Config Repository
//
// 基于 JSON 文件的配置仓储实现

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::modules::config::domain::AppConfig;
use crate::modules::config::ports::{ConfigError, ConfigRepository};

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// JSON 文件配置仓储
pub struct FileConfigRepository {
    /// 配置文件路径
    config_path: PathBuf,
    /// 内存缓存
    cache: Arc<RwLock<Option<AppConfig>>>,
}

impl FileConfigRepository {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            cache: Arc::new(RwLock::new(None)),
        }
    }

    /// 从文件加载配置
    async fn load_from_file(&self) -> Result<Option<AppConfig>, ConfigError> {
        let content = match tokio::fs::read_to_string(&self.config_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ConfigError::StorageError(e.to_string())),
        };

        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(Some(config))
    }
}

#[async_trait]
impl ConfigRepository for FileConfigRepository {
    async fn load(&self) -> Result<AppConfig, ConfigError> {
        // 先检查缓存
        {
            let cache = self.cache.read().await;
            if let Some(ref config) = *cache {
                return Ok(config.clone());
            }
        }

        // 从文件加载
        let config = match self.load_from_file().await? {
            Some(config) => {
                info!("Loaded configuration from {:?}", self.config_path);
                config
            }
            None => {
                debug!(
                    "No configuration file at {:?}, using defaults",
                    self.config_path
                );
                AppConfig::default()
            }
        };

        // 更新缓存
        {
            let mut cache = self.cache.write().await;
            *cache = Some(config.clone());
        }

        Ok(config)
    }

    async fn exists(&self) -> Result<bool, ConfigError> {
        tokio::fs::try_exists(&self.config_path)
            .await
            .map_err(|e| ConfigError::StorageError(e.to_string()))
    }
}
