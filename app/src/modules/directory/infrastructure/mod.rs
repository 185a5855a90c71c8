// Directory Infrastructure Layer
//
// - FileUserDirectory: JSON 文件实现
// - InMemoryUserDirectory: 内存实现，用于测试

mod file_user_directory;
mod in_memory_user_directory;

pub use file_user_directory::*;
pub use in_memory_user_directory::*;
