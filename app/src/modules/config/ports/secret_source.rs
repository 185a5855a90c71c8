/// 密钥来源端口
///
/// 按名字读取密钥（生产环境为进程环境变量）
pub trait SecretSource: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}
