// Session Module - 会话界面控制模块
//
// - domain: 浏览器会话状态（登录阶段、对话副本、一次性提示）
// - controller: 登录与对话循环

pub mod controller;
pub mod domain;

pub use controller::{SessionController, EMPTY_NAME_MESSAGE, NO_SESSION_MESSAGE};
pub use domain::{ActiveUser, LoginChoice, LoginStage, SessionState};
