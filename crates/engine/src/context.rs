//! Application context – owns the calculator sessions.

use crate::calculator::Calculator;
use crate::types::new_run_id;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Central context passed to all engine commands.
///
/// Each session owns exactly one [`Calculator`]. Access goes through the
/// session lock, so concurrent callers are serialized per context.
/// Sessions stay until [`AppContext::close_session`]; a long-running daemon's
/// table grows with every session a client leaves open.
#[derive(Default)]
pub struct AppContext {
    sessions: Mutex<HashMap<String, Calculator>>,
}

impl AppContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<String, Calculator>> {
        // Calculator operations never leave a half-updated state.
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a session with a freshly reset engine and return its id.
    pub fn open_session(&self) -> String {
        let id = new_run_id();
        self.sessions().insert(id.clone(), Calculator::new());
        tracing::debug!(session = %id, "session opened");
        id
    }

    /// Drop a session. Returns false if it did not exist.
    pub fn close_session(&self, id: &str) -> bool {
        let removed = self.sessions().remove(id).is_some();
        if removed {
            tracing::debug!(session = %id, "session closed");
        }
        removed
    }

    /// Run `f` against the session's engine, or `None` for an unknown id.
    pub fn with_session<R>(&self, id: &str, f: impl FnOnce(&mut Calculator) -> R) -> Option<R> {
        self.sessions().get_mut(id).map(f)
    }

    pub fn session_count(&self) -> usize {
        self.sessions().len()
    }
}
