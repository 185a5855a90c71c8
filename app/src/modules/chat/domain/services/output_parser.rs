/// 字符串输出解析器
///
/// 把模型原始输出转换为纯文本；空白回复视为无效
#[derive(Debug, Clone, Copy, Default)]
pub struct StrOutputParser;

impl StrOutputParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, raw: &str) -> Option<String> {
        if raw.trim().is_empty() {
            None
        } else {
            Some(raw.to_string())
        }
    }
}
