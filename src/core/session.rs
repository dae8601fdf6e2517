//! # Sessions
//!
//! One `Session` per long-lived UI. All navigation work for a session runs
//! while holding its exclusive lock, represented by a `SessionGuard`.
//!
//! ```text
//! Session
//! ├── id: SessionId
//! └── Mutex<SessionState>
//!     ├── active: Option<ActiveChain>              // what is on screen now
//!     └── continuations: ContinuationId → Pending  // postponed attempts
//! ```
//!
//! The guard is the only way into the state, and anything that must run
//! "under the lock" takes `&mut SessionGuard` explicitly. There is no
//! ambient "current session".

use std::collections::HashMap;
use std::fmt;

use log::debug;
use parking_lot::{Mutex, MutexGuard};

use crate::core::continuation::{ContinuationId, ContinueNavigationAction, PendingNavigation};
use crate::core::location::Location;
use crate::core::state::{NavigationState, ViewType};

/// Identifier of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(uuid::Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The view chain currently shown by a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveChain {
    /// Address the client displays.
    pub location: Location,
    pub state: NavigationState,
    /// Outermost layout first.
    pub layouts: Vec<ViewType>,
}

impl ActiveChain {
    /// Layouts followed by the target.
    pub fn views(&self) -> impl Iterator<Item = &ViewType> {
        self.layouts
            .iter()
            .chain(std::iter::once(self.state.target()))
    }
}

#[derive(Default)]
pub struct SessionState {
    active: Option<ActiveChain>,
    continuations: HashMap<ContinuationId, PendingNavigation>,
}

pub struct Session {
    id: SessionId,
    state: Mutex<SessionState>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Blocks until the session's exclusive lock is held.
    pub fn lock(&self) -> SessionGuard<'_> {
        SessionGuard {
            id: self.id,
            state: self.state.lock(),
        }
    }

    /// Returns `None` if the lock is held elsewhere.
    pub fn try_lock(&self) -> Option<SessionGuard<'_>> {
        self.state.try_lock().map(|state| SessionGuard { id: self.id, state })
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("id", &self.id).finish()
    }
}

/// Proof that the session lock is held.
pub struct SessionGuard<'a> {
    id: SessionId,
    state: MutexGuard<'a, SessionState>,
}

impl SessionGuard<'_> {
    pub fn session_id(&self) -> SessionId {
        self.id
    }

    pub fn active(&self) -> Option<&ActiveChain> {
        self.state.active.as_ref()
    }

    pub(crate) fn set_active(&mut self, chain: ActiveChain) {
        self.state.active = Some(chain);
    }

    pub fn is_postponed(&self, action: &ContinueNavigationAction) -> bool {
        action.session() == self.id && self.state.continuations.contains_key(&action.id())
    }

    pub fn pending_count(&self) -> usize {
        self.state.continuations.len()
    }

    pub(crate) fn pending(&self, id: &ContinuationId) -> Option<&PendingNavigation> {
        self.state.continuations.get(id)
    }

    pub(crate) fn store_pending(&mut self, id: ContinuationId, pending: PendingNavigation) {
        self.state.continuations.insert(id, pending);
    }

    pub(crate) fn take_pending(&mut self, id: &ContinuationId) -> Option<PendingNavigation> {
        self.state.continuations.remove(id)
    }

    /// Drops every postponed attempt; their actions become no-ops.
    pub(crate) fn discard_pending(&mut self) -> usize {
        let count = self.state.continuations.len();
        if count > 0 {
            debug!("Session {}: discarding {} postponed navigation(s)", self.id, count);
            self.state.continuations.clear();
        }
        count
    }
}
