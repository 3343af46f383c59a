//! Shared API state: the triage engine and the live session registry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::generation::TextGenerator;
use crate::models::ConversationState;
use crate::triage::{ReplyTemplates, SymptomTable, TriageEngine};

/// One live chat session.
///
/// The `turn` mutex serializes turns: a second send for the same
/// session waits until the previous turn, including any outstanding
/// generation call, has finished. `closed` is visible without taking
/// the turn lock so teardown never waits behind an in-flight turn.
pub struct SessionHandle {
    pub id: Uuid,
    pub started_at: NaiveDateTime,
    closed: AtomicBool,
    pub turn: tokio::sync::Mutex<ConversationState>,
}

impl SessionHandle {
    fn new() -> Self {
        let mut state = ConversationState::new();
        state.push_assistant(&ReplyTemplates::greeting().text);
        Self {
            id: Uuid::new_v4(),
            started_at: chrono::Local::now().naive_local(),
            closed: AtomicBool::new(false),
            turn: tokio::sync::Mutex::new(state),
        }
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Shared context handed to every endpoint handler.
#[derive(Clone)]
pub struct ApiContext {
    pub engine: Arc<TriageEngine>,
    sessions: Arc<Mutex<HashMap<Uuid, Arc<SessionHandle>>>>,
}

impl ApiContext {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        let table = Arc::new(SymptomTable::builtin());
        Self {
            engine: Arc::new(TriageEngine::new(table, generator)),
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Create and register a new session.
    pub fn open_session(&self) -> Arc<SessionHandle> {
        let handle = Arc::new(SessionHandle::new());
        self.sessions
            .lock()
            .expect("session registry lock poisoned")
            .insert(handle.id, handle.clone());
        tracing::info!(session_id = %handle.id, "chat session opened");
        handle
    }

    /// Fetch a live session by id. Closed sessions are not returned.
    pub fn session(&self, id: &Uuid) -> Option<Arc<SessionHandle>> {
        self.sessions
            .lock()
            .expect("session registry lock poisoned")
            .get(id)
            .filter(|h| !h.is_closed())
            .cloned()
    }

    /// End a session: remove it from the registry and flag it closed so
    /// any turn still in flight discards its result.
    pub fn end_session(&self, id: &Uuid) -> bool {
        let removed = self
            .sessions
            .lock()
            .expect("session registry lock poisoned")
            .remove(id);
        match removed {
            Some(handle) => {
                handle.close();
                tracing::info!(session_id = %id, "chat session ended");
                true
            }
            None => false,
        }
    }

    pub fn open_session_count(&self) -> usize {
        self.sessions
            .lock()
            .expect("session registry lock poisoned")
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::generation::GenerationError;

    struct NoopGenerator;

    #[async_trait]
    impl TextGenerator for NoopGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            Err(GenerationError::Connect("noop".into()))
        }
    }

    fn ctx() -> ApiContext {
        ApiContext::new(Arc::new(NoopGenerator))
    }

    #[tokio::test]
    async fn new_session_opens_with_greeting_in_history() {
        let ctx = ctx();
        let handle = ctx.open_session();
        let state = handle.turn.lock().await;
        assert_eq!(state.history().len(), 1);
        assert!(state.history()[0].text.starts_with("Hello! I'm TriageCare AI"));
    }

    #[test]
    fn session_lookup_round_trip() {
        let ctx = ctx();
        let handle = ctx.open_session();
        assert!(ctx.session(&handle.id).is_some());
        assert!(ctx.session(&Uuid::new_v4()).is_none());
        assert_eq!(ctx.open_session_count(), 1);
    }

    #[test]
    fn end_session_removes_and_flags_closed() {
        let ctx = ctx();
        let handle = ctx.open_session();
        assert!(ctx.end_session(&handle.id));
        assert!(handle.is_closed());
        assert!(ctx.session(&handle.id).is_none());
        assert_eq!(ctx.open_session_count(), 0);

        // Ending twice is a no-op
        assert!(!ctx.end_session(&handle.id));
    }

    #[tokio::test]
    async fn closing_does_not_wait_for_turn_lock() {
        let ctx = ctx();
        let handle = ctx.open_session();

        // Hold the turn lock as an in-flight turn would
        let _guard = handle.turn.lock().await;
        assert!(ctx.end_session(&handle.id));
        assert!(handle.is_closed());
    }
}
