//! Per-user conversation sessions.
//!
//! The registry is the only mutable shared state in the process. It is
//! constructed at startup and injected into the webhook state — no
//! globals, so tests get an isolated registry each.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Which step of the scripted conversation the user is at.
///
/// Every (state, input) pair without an explicit route falls back to the
/// default reply without changing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueState {
    Idle,
    AwaitingConsent,
    AwaitingTiming,
    AwaitingAdviceResponse,
    StepOne,
    StepTwo,
    StepThree,
    StepFour,
    AwaitingReportStatus,
}

impl Default for DialogueState {
    fn default() -> Self {
        Self::Idle
    }
}

impl std::fmt::Display for DialogueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::AwaitingConsent => "awaiting_consent",
            Self::AwaitingTiming => "awaiting_timing",
            Self::AwaitingAdviceResponse => "awaiting_advice_response",
            Self::StepOne => "step_one",
            Self::StepTwo => "step_two",
            Self::StepThree => "step_three",
            Self::StepFour => "step_four",
            Self::AwaitingReportStatus => "awaiting_report_status",
        };
        write!(f, "{s}")
    }
}

/// One user's conversation session.
#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    /// Platform-scoped sender id; at most one session exists per user.
    pub user_id: String,
    pub state: DialogueState,
    pub created_at: DateTime<Utc>,
}

impl Session {
    fn new(user_id: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            state: DialogueState::Idle,
            created_at: Utc::now(),
        }
    }
}

/// Shared handle to one session. The inner mutex serializes event
/// handling for one user across concurrent webhook deliveries.
pub type SharedSession = Arc<Mutex<Session>>;

/// In-memory session store keyed by platform user id.
///
/// Sessions are created lazily and never evicted; the map grows for the
/// lifetime of the process. A TTL sweep keyed on `created_at` is needed
/// before production use.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SharedSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Return the session for `user_id`, creating it in state `Idle` on
    /// first sight. Insert-if-absent runs under the write lock, so
    /// concurrent calls for the same user cannot create duplicates.
    pub async fn get_or_create(&self, user_id: &str) -> SharedSession {
        if let Some(session) = self.sessions.read().await.get(user_id) {
            return Arc::clone(session);
        }
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(user_id.to_string()).or_insert_with(|| {
            tracing::debug!(user_id = %user_id, "creating session");
            Arc::new(Mutex::new(Session::new(user_id)))
        });
        Arc::clone(session)
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
