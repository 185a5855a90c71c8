// Config Module
//
// 配置管理模块，采用六边形架构
//
// 层次结构:
// - domain: 领域层，包含配置实体与值对象
// - ports: 端口层，定义配置读取与密钥来源的抽象接口
// - infrastructure: 基础设施层，实现具体的配置存储适配器
// - application: 应用层，配置服务门面

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

// 重新导出常用类型

// Domain
pub use domain::{ApiKey, AppConfig, ChatConfig, LlmConfig, ServerConfig, StorageConfig};

// Ports
pub use ports::{ConfigError, ConfigRepository, SecretSource};

// Infrastructure
pub use infrastructure::{
    EnvSecretSource, FileConfigRepository, InMemoryConfigRepository, InMemorySecretSource,
    DEFAULT_CONFIG_FILE,
};

// Application
pub use application::{ConfigService, RuntimeConfig, API_KEY_VAR};

use std::path::PathBuf;
use std::sync::Arc;

/// Config 模块容器
///
/// 管理模块内的依赖注入
pub struct ConfigModule {
    service: ConfigService,
}

impl ConfigModule {
    /// 使用内存仓储创建（用于测试）
    pub fn new_in_memory(config: AppConfig, secrets: InMemorySecretSource) -> Self {
        Self::with_components(
            Arc::new(InMemoryConfigRepository::with_config(config)),
            Arc::new(secrets),
        )
    }

    /// 使用配置文件与进程环境创建（会先加载 .env）
    pub fn from_env(config_path: impl Into<PathBuf>) -> Self {
        Self::with_components(
            Arc::new(FileConfigRepository::new(config_path)),
            Arc::new(EnvSecretSource::with_dotenv()),
        )
    }

    /// 使用自定义组件创建
    pub fn with_components(
        repository: Arc<dyn ConfigRepository>,
        secrets: Arc<dyn SecretSource>,
    ) -> Self {
        Self {
            service: ConfigService::new(repository, secrets),
        }
    }

    /// 获取配置服务
    pub fn service(&self) -> &ConfigService {
        &self.service
    }

    /// 加载并校验配置
    pub async fn load(&self) -> Result<AppConfig, ConfigError> {
        self.service.load().await
    }

    /// 加载配置并解析 API Key
    pub async fn load_runtime(&self) -> Result<RuntimeConfig, ConfigError> {
        self.service.load_runtime().await
    }
}
