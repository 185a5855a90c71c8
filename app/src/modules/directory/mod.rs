// Directory Module - 用户目录模块
//
// 把用户自选的显示名映射到会话 ID（JSON 文件）
//
// - domain: 用户记录与重名策略
// - ports: 用户目录端口
// - infrastructure: 文件与内存实现

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::{DuplicateNamePolicy, UserRecord};
pub use infrastructure::{FileUserDirectory, InMemoryUserDirectory};
pub use ports::{DirectoryError, UserDirectory};
