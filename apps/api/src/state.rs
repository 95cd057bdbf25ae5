use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::Config;
use crate::llm_client::GenerationService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: Arc<dyn GenerationService>,
    pub config: Config,
    pub sessions: SessionRegistry,
}

/// Tracks the cancellation token of each live interview run.
///
/// Starting a run for a session cancels any run already registered under it,
/// so a client that restarts an interview implicitly stops the old one. Each
/// registration gets a generation number; `finish` only removes the entry if
/// it still belongs to that generation, so a finished old run cannot evict a
/// newer one's token.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    next_generation: u64,
    live: HashMap<Uuid, (u64, CancellationToken)>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new run for `session`, cancelling any previous one.
    /// Returns the fresh token and the generation to pass back to `finish`.
    pub fn begin(&self, session: Uuid) -> (CancellationToken, u64) {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.next_generation += 1;
        let generation = inner.next_generation;
        let token = CancellationToken::new();
        if let Some((_, old)) = inner.live.insert(session, (generation, token.clone())) {
            old.cancel();
        }
        (token, generation)
    }

    /// Cancels the live run for `session`, if any. Idempotent: cancelling an
    /// unknown or already-cancelled session is a no-op.
    pub fn cancel(&self, session: Uuid) {
        let inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        if let Some((_, token)) = inner.live.get(&session) {
            token.cancel();
        }
    }

    /// Removes the registration, but only if it still belongs to
    /// `generation`.
    pub fn finish(&self, session: Uuid, generation: u64) {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        if inner
            .live
            .get(&session)
            .is_some_and(|(g, _)| *g == generation)
        {
            inner.live.remove(&session);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_cancels_previous_run() {
        let registry = SessionRegistry::new();
        let session = Uuid::new_v4();
        let (first, _) = registry.begin(session);
        let (second, _) = registry.begin(session);
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let registry = SessionRegistry::new();
        let session = Uuid::new_v4();
        let (token, _) = registry.begin(session);
        registry.cancel(session);
        registry.cancel(session);
        registry.cancel(Uuid::new_v4()); // unknown session, no-op
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_finish_only_removes_own_generation() {
        let registry = SessionRegistry::new();
        let session = Uuid::new_v4();
        let (_, old_generation) = registry.begin(session);
        let (newer, _) = registry.begin(session);
        registry.finish(session, old_generation);
        // The newer run's token must still be reachable for cancellation.
        registry.cancel(session);
        assert!(newer.is_cancelled());
    }
}
