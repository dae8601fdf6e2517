//! # Postponed Navigation
//!
//! A leave listener that calls `postpone()` gets a `ContinueNavigationAction`
//! back. The action is a plain token: an id plus the session it belongs to.
//! What to do on resume lives in the session's continuation table, keyed by
//! that id.
//!
//! ```text
//! postpone() ──► token ──► [session table: id → (handler?, event?)]
//!                              │
//!            proceed(guard) ───┤── remove entry, run handler(event) once
//!            cancel(guard)  ───┘── remove entry, run nothing
//! ```
//!
//! Both `proceed` and `cancel` need the session lock (`&mut SessionGuard`).
//! A guard for a different session is rejected with `LockNotHeld`.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::core::error::NavigationError;
use crate::core::location::Location;
use crate::core::router::NavigationOutcome;
use crate::core::session::{SessionGuard, SessionId};
use crate::core::state::{NavigationEvent, NavigationTrigger};

/// Identifier of one postponement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContinuationId(uuid::Uuid);

impl ContinuationId {
    pub(crate) fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for ContinuationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resumes a postponed attempt.
pub trait ContinuationHandler: Send + Sync {
    fn resume(
        &self,
        guard: &mut SessionGuard<'_>,
        event: NavigationEvent,
    ) -> Result<NavigationOutcome, NavigationError>;
}

/// What a session remembers about a postponed attempt.
pub struct PendingNavigation {
    handler: Option<Arc<dyn ContinuationHandler>>,
    event: Option<NavigationEvent>,
    /// Location the client showed when the attempt was blocked.
    restore_location: Option<Location>,
    postponed_at: DateTime<Utc>,
}

impl PendingNavigation {
    fn new() -> Self {
        Self {
            handler: None,
            event: None,
            restore_location: None,
            postponed_at: Utc::now(),
        }
    }
}

/// Returned by `cancel()` when there was something to cancel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelledNavigation {
    pub trigger: Option<NavigationTrigger>,
    /// For a blocked back/forward navigation, where the client's history
    /// should be put back to.
    pub restore_location: Option<Location>,
}

/// Token for resuming or cancelling a postponed transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinueNavigationAction {
    id: ContinuationId,
    session: SessionId,
}

impl ContinueNavigationAction {
    pub(crate) fn new(session: SessionId) -> Self {
        Self {
            id: ContinuationId::new(),
            session,
        }
    }

    pub fn id(&self) -> ContinuationId {
        self.id
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    fn check_lock(&self, guard: &SessionGuard<'_>) -> Result<(), NavigationError> {
        if guard.session_id() != self.session {
            return Err(NavigationError::LockNotHeld {
                expected: self.session,
                actual: guard.session_id(),
            });
        }
        Ok(())
    }

    /// Captures what `proceed()` will run.
    ///
    /// With `event` absent, the guard alone stands for exclusive access.
    pub fn set_references(
        &self,
        guard: &mut SessionGuard<'_>,
        handler: Option<Arc<dyn ContinuationHandler>>,
        event: Option<NavigationEvent>,
    ) -> Result<(), NavigationError> {
        self.check_lock(guard)?;
        let restore_location = guard.active().map(|chain| chain.location.clone());
        let mut pending = guard.take_pending(&self.id).unwrap_or_else(PendingNavigation::new);
        pending.handler = handler;
        pending.event = event;
        pending.restore_location = restore_location;
        guard.store_pending(self.id, pending);
        Ok(())
    }

    /// Resumes the postponed attempt.
    ///
    /// Returns `Ok(None)` when the action was already resolved or no
    /// handler/event pair was captured.
    pub fn proceed(
        &self,
        guard: &mut SessionGuard<'_>,
    ) -> Result<Option<NavigationOutcome>, NavigationError> {
        self.check_lock(guard)?;
        let Some(pending) = guard.take_pending(&self.id) else {
            debug!("Continuation {} already resolved, proceed is a no-op", self.id);
            return Ok(None);
        };
        match (pending.handler, pending.event) {
            (Some(handler), Some(event)) => {
                info!("Continuation {}: proceeding to {}", self.id, event.location);
                handler.resume(guard, event).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Drops the postponed attempt without running it.
    pub fn cancel(
        &self,
        guard: &mut SessionGuard<'_>,
    ) -> Result<Option<CancelledNavigation>, NavigationError> {
        self.check_lock(guard)?;
        let Some(pending) = guard.take_pending(&self.id) else {
            return Ok(None);
        };
        let trigger = pending.event.as_ref().map(|e| e.trigger);
        info!("Continuation {}: cancelled", self.id);
        let restore_location = match trigger {
            Some(NavigationTrigger::History) => pending.restore_location,
            _ => None,
        };
        Ok(Some(CancelledNavigation {
            trigger,
            restore_location,
        }))
    }

    /// Whether this action is still waiting to be resolved.
    pub fn is_postponed(&self, guard: &SessionGuard<'_>) -> bool {
        guard.is_postponed(self)
    }

    pub fn postponed_at(&self, guard: &SessionGuard<'_>) -> Option<DateTime<Utc>> {
        if guard.session_id() != self.session {
            return None;
        }
        guard.pending(&self.id).map(|p| p.postponed_at)
    }
}
