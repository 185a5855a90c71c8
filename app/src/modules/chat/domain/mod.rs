// Chat Domain Layer
// 领域层包含实体、值对象和领域服务

pub mod entities;
pub mod services;
pub mod value_objects;

// 重导出常用类型
pub use entities::{ChatMessage, ChatTurn, MessageRole};
pub use services::{
    HistoryWindow, PromptRole, PromptSegment, PromptTemplate, StrOutputParser, StructuredPrompt,
    DEFAULT_SYSTEM_TEMPLATE,
};
pub use value_objects::SessionId;
