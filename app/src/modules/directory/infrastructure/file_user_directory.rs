// JSON 文件用户目录
//
// 文件内容为单个 JSON 对象：{ "<显示名>": "<uuid>" }
// 每次更新整体重写：先写同目录临时文件，再原子重命名

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::modules::chat::domain::SessionId;
use crate::modules::directory::domain::DuplicateNamePolicy;
use crate::modules::directory::ports::{DirectoryError, UserDirectory};

/// 文件用户目录
pub struct FileUserDirectory {
    path: PathBuf,
    policy: DuplicateNamePolicy,
    /// 串行化进程内的写操作
    write_lock: Mutex<()>,
}

impl FileUserDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            policy: DuplicateNamePolicy::default(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_policy(mut self, policy: DuplicateNamePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取整个映射；文件不存在视为空
    async fn read_map(&self) -> Result<BTreeMap<String, String>, DirectoryError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(DirectoryError::ReadError(e.to_string())),
        };

        serde_json::from_str(&content).map_err(|e| DirectoryError::Corrupt(e.to_string()))
    }

    /// 整体重写映射
    async fn write_map(&self, users: &BTreeMap<String, String>) -> Result<(), DirectoryError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DirectoryError::WriteError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(users)
            .map_err(|e| DirectoryError::WriteError(e.to_string()))?;

        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content)
            .await
            .map_err(|e| DirectoryError::WriteError(e.to_string()))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| DirectoryError::WriteError(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl UserDirectory for FileUserDirectory {
    async fn register(&self, display_name: &str) -> Result<SessionId, DirectoryError> {
        let _guard = self.write_lock.lock().await;

        // 文件损坏时直接返回错误，不覆盖原内容
        let mut users = self.read_map().await?;

        if users.contains_key(display_name) {
            match self.policy {
                DuplicateNamePolicy::Reject => {
                    return Err(DirectoryError::NameTaken(display_name.to_string()));
                }
                DuplicateNamePolicy::Overwrite => {
                    warn!("Display name {:?} re-registered, replacing mapping", display_name);
                }
            }
        }

        let session_id = SessionId::new();
        users.insert(display_name.to_string(), session_id.to_string());
        self.write_map(&users).await?;

        info!("Registered new session {} ({} users)", session_id, users.len());
        Ok(session_id)
    }

    async fn lookup(&self, display_name: &str) -> Result<Option<SessionId>, DirectoryError> {
        let users = self.read_map().await?;

        let session_id = users
            .get(display_name)
            .map(|raw| SessionId::parse(raw).map_err(|e| DirectoryError::Corrupt(e.to_string())))
            .transpose()?;

        debug!(
            "Lookup for display name: {}",
            if session_id.is_some() { "found" } else { "not found" }
        );
        Ok(session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn directory_in(temp_dir: &TempDir) -> FileUserDirectory {
        FileUserDirectory::new(temp_dir.path().join("user_data.json"))
    }

    #[tokio::test]
    async fn test_register_then_lookup() {
        let temp_dir = TempDir::new().unwrap();
        let directory = directory_in(&temp_dir);

        for name in ["Ada", "grace hopper", "  spaced  ", "李雷", ""] {
            let id = directory.register(name).await.unwrap();
            assert_eq!(directory.lookup(name).await.unwrap(), Some(id));
        }
    }

    #[tokio::test]
    async fn test_lookup_without_file() {
        let temp_dir = TempDir::new().unwrap();
        let directory = directory_in(&temp_dir);

        assert_eq!(directory.lookup("Nonexistent").await.unwrap(), None);
        assert!(!directory.path().exists());
    }

    #[tokio::test]
    async fn test_lookup_unknown_name() {
        let temp_dir = TempDir::new().unwrap();
        let directory = directory_in(&temp_dir);
        directory.register("Ada").await.unwrap();

        assert_eq!(directory.lookup("Nonexistent").await.unwrap(), None);
        assert_eq!(directory.lookup("ada").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_format() {
        let temp_dir = TempDir::new().unwrap();
        let directory = directory_in(&temp_dir);
        let id = directory.register("Ada").await.unwrap();

        let content = std::fs::read_to_string(directory.path()).unwrap();
        let users: BTreeMap<String, String> = serde_json::from_str(&content).unwrap();
        assert_eq!(users.get("Ada"), Some(&id.to_string()));
        assert!(!temp_dir.path().join("user_data.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_reads_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("user_data.json");
        std::fs::write(
            &path,
            r#"{"Ada": "0b6f3a52-4d7e-4bb6-9a57-3f0c2d6a1e11"}"#,
        )
        .unwrap();

        let directory = FileUserDirectory::new(&path);
        let id = directory.lookup("Ada").await.unwrap().unwrap();
        assert_eq!(id.to_string(), "0b6f3a52-4d7e-4bb6-9a57-3f0c2d6a1e11");
    }

    #[tokio::test]
    async fn test_overwrite_policy_replaces_mapping() {
        let temp_dir = TempDir::new().unwrap();
        let directory = directory_in(&temp_dir);

        let first = directory.register("Ada").await.unwrap();
        let second = directory.register("Ada").await.unwrap();

        assert_ne!(first, second);
        assert_eq!(directory.lookup("Ada").await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn test_reject_policy() {
        let temp_dir = TempDir::new().unwrap();
        let directory = directory_in(&temp_dir).with_policy(DuplicateNamePolicy::Reject);

        let first = directory.register("Ada").await.unwrap();
        let result = directory.register("Ada").await;

        assert!(matches!(result, Err(DirectoryError::NameTaken(name)) if name == "Ada"));
        assert_eq!(directory.lookup("Ada").await.unwrap(), Some(first));
    }

    #[tokio::test]
    async fn test_corrupt_file_left_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let directory = directory_in(&temp_dir);
        std::fs::write(directory.path(), "{not json").unwrap();

        assert!(matches!(
            directory.lookup("Ada").await,
            Err(DirectoryError::Corrupt(_))
        ));
        assert!(matches!(
            directory.register("Ada").await,
            Err(DirectoryError::Corrupt(_))
        ));
        assert_eq!(std::fs::read_to_string(directory.path()).unwrap(), "{not json");
    }

    #[tokio::test]
    async fn test_invalid_uuid_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let directory = directory_in(&temp_dir);
        std::fs::write(directory.path(), r#"{"Ada": "not-a-uuid"}"#).unwrap();

        assert!(matches!(
            directory.lookup("Ada").await,
            Err(DirectoryError::Corrupt(_))
        ));
        // 其他名字不受影响
        assert_eq!(directory.lookup("Bob").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_concurrent_registrations() {
        let temp_dir = TempDir::new().unwrap();
        let directory = std::sync::Arc::new(directory_in(&temp_dir));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let directory = directory.clone();
                tokio::spawn(async move {
                    let name = format!("user-{}", i);
                    let id = directory.register(&name).await.unwrap();
                    (name, id)
                })
            })
            .collect();

        for handle in handles {
            let (name, id) = handle.await.unwrap();
            assert_eq!(directory.lookup(&name).await.unwrap(), Some(id));
        }
    }
}
