// Chat Infrastructure - Repositories
//
// 仓储实现：
// - InMemoryMessageRepository: 内存仓储，用于开发和测试
// - SqliteMessageRepository: SQLite 持久化仓储，用于生产环境

mod in_memory_message_repository;
mod sqlite_message_repository;

pub use in_memory_message_repository::*;
pub use sqlite_message_repository::*;
