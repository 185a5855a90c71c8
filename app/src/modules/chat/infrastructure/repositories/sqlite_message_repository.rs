// SQLite 消息仓储实现
//
// 表结构：message_store(id 自增主键, session_id, message)
// message 列保存序列化后的带标签消息：{"type": "human" | "ai", "data": {"content": ...}}

use async_trait::async_trait;
use rusqlite::{params, Connection, ErrorCode};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

use crate::modules::chat::domain::{ChatMessage, ChatTurn, SessionId};
use crate::modules::chat::ports::{MessageRepository, StorageError};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const CREATE_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS message_store (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        session_id TEXT NOT NULL,
        message TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_message_store_session_id ON message_store (session_id);
";

/// 持久化的消息格式
#[derive(Debug, Serialize, Deserialize)]
struct StoredMessage {
    #[serde(rename = "type")]
    kind: String,
    data: StoredMessageData,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredMessageData {
    content: String,
}

impl StoredMessage {
    fn encode(message: &ChatMessage) -> Result<String, StorageError> {
        let kind = match message {
            ChatMessage::Human(_) => "human",
            ChatMessage::Assistant(_) => "ai",
        };
        let stored = StoredMessage {
            kind: kind.to_string(),
            data: StoredMessageData {
                content: message.content().to_string(),
            },
        };
        serde_json::to_string(&stored).map_err(|e| StorageError::SerializationError(e.to_string()))
    }

    /// 解码；未知类型返回 None
    fn decode(raw: &str) -> Result<Option<ChatMessage>, StorageError> {
        let stored: StoredMessage = serde_json::from_str(raw)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        Ok(match stored.kind.as_str() {
            "human" => Some(ChatMessage::Human(stored.data.content)),
            "ai" => Some(ChatMessage::Assistant(stored.data.content)),
            _ => None,
        })
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        match e.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => StorageError::Constraint(e.to_string()),
            _ => StorageError::Unavailable(e.to_string()),
        }
    }
}

/// SQLite 消息仓储
///
/// 连接放在互斥锁后，所有调用都在阻塞线程池中执行；
/// 跨进程的并发由 SQLite 自身的锁（WAL + busy timeout）保证
pub struct SqliteMessageRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteMessageRepository {
    /// 打开（或创建）数据库文件
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!("Opened SQLite database {:?} (journal_mode={})", path, mode);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 内存数据库（测试用）
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 在阻塞线程中使用连接
    async fn with_connection<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StorageError::Unavailable("connection lock poisoned".to_string()))?;
            f(&guard)
        })
        .await
        .map_err(|e| StorageError::Unavailable(e.to_string()))?
    }
}

#[async_trait]
impl MessageRepository for SqliteMessageRepository {
    async fn ensure_schema(&self) -> Result<(), StorageError> {
        self.with_connection(|conn| {
            conn.execute_batch(CREATE_TABLE_SQL)?;
            Ok(())
        })
        .await
    }

    async fn history(&self, session_id: SessionId) -> Result<Vec<ChatTurn>, StorageError> {
        let key = session_id.to_string();
        let rows: Vec<(i64, String)> = self
            .with_connection(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, message FROM message_store WHERE session_id = ?1 ORDER BY id ASC",
                )?;
                let rows = stmt
                    .query_map(params![key], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await?;

        let mut turns = Vec::with_capacity(rows.len());
        for (id, raw) in rows {
            match StoredMessage::decode(&raw) {
                Ok(Some(message)) => turns.push(ChatTurn::new(session_id, message)),
                Ok(None) => warn!("Skipping row {} with unsupported message type", id),
                Err(e) => warn!("Skipping undecodable row {}: {}", id, e),
            }
        }

        Ok(turns)
    }

    async fn append(
        &self,
        session_id: SessionId,
        message: &ChatMessage,
    ) -> Result<(), StorageError> {
        let encoded = StoredMessage::encode(message)?;
        let key = session_id.to_string();

        self.with_connection(move |conn| {
            conn.execute(
                "INSERT INTO message_store (session_id, message) VALUES (?1, ?2)",
                params![key, encoded],
            )?;
            Ok(())
        })
        .await
    }
}
