//! Session persistence behind a trait so the transition engine and the
//! service layer never care where state lives. The in-memory store backs
//! tests and single-node runs; the Redis store is the deployed backend
//! and carries a TTL so abandoned drafts age out on their own.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use redis::AsyncCommands;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::conversation::session::Session;

const SESSION_KEY_PREFIX: &str = "session:";

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("session backend error: {0}")]
    Backend(String),

    #[error("session serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<redis::RedisError> for SessionStoreError {
    fn from(err: redis::RedisError) -> Self {
        SessionStoreError::Backend(err.to_string())
    }
}

/// Keyed by chat id. One session per chat; saving overwrites.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, chat_id: &str) -> Result<Option<Session>, SessionStoreError>;
    async fn save(&self, session: &Session) -> Result<(), SessionStoreError>;
    async fn delete(&self, chat_id: &str) -> Result<(), SessionStoreError>;
}

// ─────────────────────────────────────────────
// In-memory store
// ─────────────────────────────────────────────

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, chat_id: &str) -> Result<Option<Session>, SessionStoreError> {
        Ok(self.sessions.read().await.get(chat_id).cloned())
    }

    async fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        self.sessions
            .write()
            .await
            .insert(session.chat_id.clone(), session.clone());
        Ok(())
    }

    async fn delete(&self, chat_id: &str) -> Result<(), SessionStoreError> {
        self.sessions.write().await.remove(chat_id);
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Redis store
// ─────────────────────────────────────────────

pub struct RedisSessionStore {
    client: redis::Client,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    pub fn new(client: redis::Client, ttl_seconds: u64) -> Self {
        RedisSessionStore {
            client,
            ttl_seconds,
        }
    }

    fn key(chat_id: &str) -> String {
        format!("{SESSION_KEY_PREFIX}{chat_id}")
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, chat_id: &str) -> Result<Option<Session>, SessionStoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = conn.get(Self::key(chat_id)).await?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let json = serde_json::to_string(session)?;
        conn.set_ex::<_, _, ()>(Self::key(&session.chat_id), json, self.ttl_seconds)
            .await?;
        Ok(())
    }

    async fn delete(&self, chat_id: &str) -> Result<(), SessionStoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.del::<_, ()>(Self::key(chat_id)).await?;
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Per-chat serialization
// ─────────────────────────────────────────────

/// Serializes message handling per chat id. Two messages from the same
/// chat run their load-transition-save cycles one after the other;
/// different chats never contend.
#[derive(Default)]
pub struct SessionGate {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SessionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, chat_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(chat_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}
