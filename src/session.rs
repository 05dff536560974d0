//! Per-session conversation memory
//!
//! A [`Session`] is an ordered buffer of [`Turn`]s plus the active [`Mode`].
//! The buffer is bounded: once it holds `memory_size` turns the oldest ones
//! are dropped. [`SessionStore`] keeps the sessions of the web interface.

use crate::chat_mode::Mode;
use crate::error::{ChatError, Result};
use crate::providers::{Message, Role};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// One message in a session's history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Author of the turn
    pub role: Role,
    /// Message text
    pub text: String,
    /// When the turn was recorded
    pub created_at: DateTime<Utc>,
}

impl Turn {
    /// Create a turn stamped with the current time
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    /// Create a user turn
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// Create an assistant turn
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    /// Provider message carrying this turn
    pub fn to_message(&self) -> Message {
        Message {
            role: self.role,
            content: self.text.clone(),
        }
    }
}

/// A single interaction's in-memory conversation
///
/// # Examples
///
/// ```
/// use modechat::chat_mode::Mode;
/// use modechat::session::{Session, Turn};
///
/// let mut session = Session::new(Mode::Chat, 40);
/// session.append(Turn::user("Hello"));
/// session.append(Turn::assistant("Hi there!"));
/// assert_eq!(session.len(), 2);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    id: Uuid,
    mode: Mode,
    turns: Vec<Turn>,
    memory_size: usize,
    created_at: DateTime<Utc>,
    last_active: DateTime<Utc>,
}

impl Session {
    /// Create an empty session
    ///
    /// `memory_size` is clamped to at least 2 so a user turn and its reply
    /// always fit.
    pub fn new(mode: Mode, memory_size: usize) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            mode,
            turns: Vec::new(),
            memory_size: memory_size.max(2),
            created_at: now,
            last_active: now,
        }
    }

    /// Session identifier
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Active mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switch the active mode, returning the previous one
    pub fn set_mode(&mut self, mode: Mode) -> Mode {
        let old = self.mode;
        self.mode = mode;
        self.touch();
        old
    }

    /// Maximum number of turns retained
    pub fn memory_size(&self) -> usize {
        self.memory_size
    }

    /// Append a turn, dropping the oldest turns beyond `memory_size`
    ///
    /// Returns the updated history.
    pub fn append(&mut self, turn: Turn) -> &[Turn] {
        self.turns.push(turn);
        let overflow = self.turns.len().saturating_sub(self.memory_size);
        if overflow > 0 {
            self.turns.drain(..overflow);
            tracing::debug!(session = %self.id, "Trimmed history by {} turns", overflow);
        }
        self.touch();
        &self.turns
    }

    /// All retained turns in submission order
    pub fn history(&self) -> &[Turn] {
        &self.turns
    }

    /// The most recent `n` turns
    pub fn recent(&self, n: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    /// Number of retained turns
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the session has no turns
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Clear the history, keeping id and mode
    pub fn reset(&mut self) {
        self.turns.clear();
        self.touch();
        tracing::info!(session = %self.id, "Chat history reset");
    }

    /// Creation time
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time of the last change
    pub fn last_active(&self) -> DateTime<Utc> {
        self.last_active
    }

    fn touch(&mut self) {
        self.last_active = Utc::now();
    }
}

// Ten years; keeps `now - ttl` representable
const MAX_TTL_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

/// Shared handle to one session
pub type SessionHandle = Arc<Mutex<Session>>;

/// Concurrent registry of live sessions
///
/// The map lock is only held to look up or insert handles; work on a
/// session (including the provider round trip) happens under that
/// session's own mutex, so one request per session runs at a time.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SessionHandle>>,
    memory_size: usize,
    ttl: Duration,
}

impl SessionStore {
    /// Create an empty store
    ///
    /// # Arguments
    ///
    /// * `memory_size` - History bound for new sessions
    /// * `ttl_seconds` - Idle time after which sessions are evicted
    pub fn new(memory_size: usize, ttl_seconds: u64) -> Self {
        let ttl_seconds = ttl_seconds.min(MAX_TTL_SECONDS) as i64;
        Self {
            sessions: RwLock::new(HashMap::new()),
            memory_size,
            ttl: Duration::seconds(ttl_seconds),
        }
    }

    /// Create and register a new session
    pub async fn create(&self, mode: Mode) -> SessionHandle {
        self.evict_idle().await;

        let session = Session::new(mode, self.memory_size);
        let id = session.id();
        let handle = Arc::new(Mutex::new(session));
        self.sessions.write().await.insert(id, handle.clone());
        tracing::info!(session = %id, mode = %mode, "Session created");
        handle
    }

    /// Look up a session
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::SessionNotFound`] for unknown ids
    pub async fn get(&self, id: Uuid) -> Result<SessionHandle> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| ChatError::SessionNotFound(id.to_string()).into())
    }

    /// Look up a session, creating one when no id is given
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::SessionNotFound`] when an id is given but unknown
    pub async fn get_or_create(&self, id: Option<Uuid>, mode: Mode) -> Result<SessionHandle> {
        match id {
            Some(id) => self.get(id).await,
            None => Ok(self.create(mode).await),
        }
    }

    /// End a session, discarding its history
    ///
    /// Returns whether the session existed.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            tracing::info!(session = %id, "Session ended");
        }
        removed
    }

    /// Drop sessions idle longer than the TTL
    ///
    /// Sessions currently locked by a request are treated as active.
    /// Returns the number of evicted sessions.
    pub async fn evict_idle(&self) -> usize {
        let cutoff = Utc::now() - self.ttl;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, handle| match handle.try_lock() {
            Ok(session) => session.last_active() >= cutoff,
            Err(_) => true,
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!("Evicted {} idle sessions", evicted);
        }
        evicted
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no sessions are live
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
