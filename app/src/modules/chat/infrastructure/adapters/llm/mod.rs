// LLM Adapters
// 各种 LLM 提供商的适配器实现

mod gemini;
mod http;
mod mock;
mod openai;
mod registry;

pub use gemini::*;
pub use mock::*;
pub use openai::*;
pub use registry::*;
