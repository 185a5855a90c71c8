use tracing::debug;

use crate::modules::config::ports::SecretSource;

/// 进程环境变量密钥来源
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecretSource;

impl EnvSecretSource {
    pub fn new() -> Self {
        Self
    }

    /// 先加载工作目录下的 .env（已存在的环境变量不会被覆盖）
    pub fn with_dotenv() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded environment from {:?}", path),
            Err(e) if e.not_found() => debug!("No .env file found"),
            Err(e) => debug!("Ignoring unreadable .env file: {}", e),
        }
        Self
    }
}

impl SecretSource for EnvSecretSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}
