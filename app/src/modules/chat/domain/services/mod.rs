// Chat Domain - Services
// 领域服务：提示模板与输出解析

mod output_parser;
mod prompt_template;

pub use output_parser::*;
pub use prompt_template::*;
