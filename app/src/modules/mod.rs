// Business Modules
//
// 按依赖顺序：用户目录 → 对话（存储、提示、编排） → 会话界面控制；配置贯穿其上

pub mod chat;
pub mod config;
pub mod directory;
pub mod session;
