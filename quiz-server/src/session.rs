use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use quiz_core::Session;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

/// 会话 Cookie 名称
pub const SESSION_COOKIE: &str = "quiz_session";

/// 单个访客的会话数据
#[derive(Debug)]
struct SessionRecord {
    values: HashMap<String, Value>,
    last_seen: Instant,
}

impl SessionRecord {
    fn new() -> Self {
        Self {
            values: HashMap::new(),
            last_seen: Instant::now(),
        }
    }
}

/// 会话管理器，按会话 ID 保存所有访客的服务端状态
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<DashMap<String, SessionRecord>>,
    ttl: Option<Duration>,
}

impl SessionManager {
    /// 创建新的会话管理器
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// 根据 Cookie 中的 ID 找到会话；未知或缺失时创建新会话
    ///
    /// Returns the session id and whether it was just created. Ids supplied by
    /// the client are only reused when the server already knows them.
    pub fn resolve(&self, cookie_id: Option<&str>) -> (String, bool) {
        if let Some(id) = cookie_id {
            if let Some(mut record) = self.sessions.get_mut(id) {
                record.last_seen = Instant::now();
                return (id.to_string(), false);
            }
        }

        let id = Uuid::new_v4().simple().to_string();
        self.sessions.insert(id.clone(), SessionRecord::new());
        info!("Session created: {} (total: {})", id, self.sessions.len());
        (id, true)
    }

    /// 查找已存在的会话，不会创建新会话
    pub fn lookup(&self, cookie_id: Option<&str>) -> Option<String> {
        let id = cookie_id?;
        let mut record = self.sessions.get_mut(id)?;
        record.last_seen = Instant::now();
        Some(id.to_string())
    }

    /// 在持有该会话锁的情况下执行闭包
    ///
    /// The entry stays locked for the whole closure, so concurrent requests for
    /// the same session are applied one after another. The closure must not
    /// call back into this manager.
    pub fn with_session<R>(&self, id: &str, f: impl FnOnce(&mut dyn Session) -> R) -> R {
        let mut entry = self
            .sessions
            .entry(id.to_string())
            .or_insert_with(SessionRecord::new);
        entry.last_seen = Instant::now();

        let mut session = StoredSession {
            id,
            record: &mut *entry,
        };
        f(&mut session)
    }

    /// 删除会话
    pub fn remove(&self, id: &str) {
        if self.sessions.remove(id).is_some() {
            info!("Session removed: {} (total: {})", id, self.sessions.len());
        }
    }

    /// 获取当前会话数
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// 检查会话是否存在
    pub fn has_session(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    /// 清理空闲超时的会话，返回清理数量
    pub fn sweep_expired(&self) -> usize {
        let Some(ttl) = self.ttl else {
            return 0;
        };

        let before = self.sessions.len();
        self.sessions
            .retain(|_, record| record.last_seen.elapsed() < ttl);
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            info!("Swept {} idle sessions (total: {})", removed, self.sessions.len());
        }
        removed
    }

    /// 启动后台清理任务，直到 `cancel` 被触发
    pub fn spawn_sweeper(&self, cancel: CancellationToken) -> Option<JoinHandle<()>> {
        let ttl = self.ttl?;
        let period = (ttl / 4).clamp(Duration::from_secs(1), Duration::from_secs(300));
        let manager = self.clone();

        Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        manager.sweep_expired();
                    }
                }
            }
            debug!("Session sweeper stopped");
        }))
    }
}

/// 会话句柄，借用会话管理器中已加锁的记录
struct StoredSession<'a> {
    id: &'a str,
    record: &'a mut SessionRecord,
}

impl Session for StoredSession<'_> {
    fn id(&self) -> &str {
        self.id
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.record.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.record.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.record.values.remove(key);
    }
}
