// Config Ports Layer
//
// 定义配置模块的端口（接口）

pub mod config_repository;
pub mod secret_source;

pub use config_repository::*;
pub use secret_source::*;
