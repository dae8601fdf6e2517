//! # Router
//!
//! Drives one navigation attempt from a requested location to an activated
//! view chain.
//!
//! ```text
//! navigate(guard, location)
//!   │
//!   ├─ resolve location ──────────── no route? → NotFound error view
//!   │
//!   ├─ leave phase (only if something is active)
//!   │     postpone  → Postponed(action)   stop here
//!   │     redirect  → replace target
//!   │
//!   ├─ enter phase ◄──────────────┐
//!   │     redirect  → replace target, count hop, run again
//!   │
//!   ├─ handler.handle(resolved)
//!   │     Failure   → reroute to error view ─┘
//!   │
//!   └─ session.active = chain     → Activated(resolved)
//! ```
//!
//! Within a phase, listeners run in a fixed order: the global ones in
//! registration order, then the per-view ones for each view of the chain,
//! outermost layout first and the target last. The first listener that
//! redirects (or postpones) ends the phase.
//!
//! Every redirect counts as a hop. More than `max_redirects` hops aborts the
//! attempt with `RedirectLoop`.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::core::continuation::{ContinuationHandler, ContinueNavigationAction};
use crate::core::error::NavigationError;
use crate::core::error_target::{ErrorParameter, ErrorTargetResolver, Failure};
use crate::core::event::{BeforeEnterEvent, BeforeEvent, BeforeLeaveEvent, Redirect, RedirectView};
use crate::core::handler::{
    BeforeEnterListener, BeforeLeaveListener, NavigationHandler, ResolvedNavigation,
};
use crate::core::location::Location;
use crate::core::registry::RouteRegistry;
use crate::core::session::{ActiveChain, SessionGuard};
use crate::core::state::{NavigationEvent, NavigationState, NavigationTrigger, ViewType};

/// Default bound on forward/reroute hops per attempt.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

const OK_STATUS: u16 = 200;

/// How an attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// A view chain was activated.
    Activated(ResolvedNavigation),
    /// A leave listener postponed; resolve the action to go on.
    Postponed(ContinueNavigationAction),
    /// A listener forwarded outside the application.
    External(String),
}

impl NavigationOutcome {
    pub fn activated(&self) -> Option<&ResolvedNavigation> {
        match self {
            NavigationOutcome::Activated(resolved) => Some(resolved),
            _ => None,
        }
    }
}

pub struct RouterBuilder {
    registry: Arc<dyn RouteRegistry>,
    errors: Arc<dyn ErrorTargetResolver>,
    handler: Arc<dyn NavigationHandler>,
    max_redirects: usize,
    leave: Vec<Arc<dyn BeforeLeaveListener>>,
    enter: Vec<Arc<dyn BeforeEnterListener>>,
    leave_for: HashMap<ViewType, Vec<Arc<dyn BeforeLeaveListener>>>,
    enter_for: HashMap<ViewType, Vec<Arc<dyn BeforeEnterListener>>>,
}

impl RouterBuilder {
    pub fn max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Listener for every leave phase.
    pub fn before_leave(mut self, listener: impl BeforeLeaveListener + 'static) -> Self {
        self.leave.push(Arc::new(listener));
        self
    }

    /// Listener for every enter phase.
    pub fn before_enter(mut self, listener: impl BeforeEnterListener + 'static) -> Self {
        self.enter.push(Arc::new(listener));
        self
    }

    /// Listener for leave phases where `view` is part of the active chain.
    pub fn before_leave_for(
        mut self,
        view: impl Into<ViewType>,
        listener: impl BeforeLeaveListener + 'static,
    ) -> Self {
        self.leave_for
            .entry(view.into())
            .or_default()
            .push(Arc::new(listener));
        self
    }

    /// Listener for enter phases where `view` is part of the target chain.
    pub fn before_enter_for(
        mut self,
        view: impl Into<ViewType>,
        listener: impl BeforeEnterListener + 'static,
    ) -> Self {
        self.enter_for
            .entry(view.into())
            .or_default()
            .push(Arc::new(listener));
        self
    }

    pub fn build(self) -> Router {
        Router {
            inner: Arc::new(RouterCore {
                registry: self.registry,
                errors: self.errors,
                handler: self.handler,
                max_redirects: self.max_redirects,
                leave: self.leave,
                enter: self.enter,
                leave_for: self.leave_for,
                enter_for: self.enter_for,
            }),
        }
    }
}

/// Navigation orchestrator. Cheap to clone; all clones share listeners.
#[derive(Clone)]
pub struct Router {
    inner: Arc<RouterCore>,
}

impl Router {
    pub fn builder(
        registry: Arc<dyn RouteRegistry>,
        errors: Arc<dyn ErrorTargetResolver>,
        handler: Arc<dyn NavigationHandler>,
    ) -> RouterBuilder {
        RouterBuilder {
            registry,
            errors,
            handler,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            leave: Vec::new(),
            enter: Vec::new(),
            leave_for: HashMap::new(),
            enter_for: HashMap::new(),
        }
    }

    pub fn max_redirects(&self) -> usize {
        self.inner.max_redirects
    }

    /// Runs one navigation attempt for the guard's session.
    ///
    /// Postponed attempts from earlier navigations of the session are
    /// discarded first; their actions become no-ops.
    pub fn navigate(
        &self,
        guard: &mut SessionGuard<'_>,
        location: Location,
        trigger: NavigationTrigger,
    ) -> Result<NavigationOutcome, NavigationError> {
        let discarded = guard.discard_pending();
        if discarded > 0 {
            warn!(
                "Session {}: new navigation to {} dropped {} postponed attempt(s)",
                guard.session_id(),
                location,
                discarded
            );
        }
        let event = NavigationEvent::new(guard.session_id(), location, trigger);
        info!("Navigating to {} ({:?})", event.location, event.trigger);
        self.inner.run(guard, event, 0)
    }
}

struct RouterCore {
    registry: Arc<dyn RouteRegistry>,
    errors: Arc<dyn ErrorTargetResolver>,
    handler: Arc<dyn NavigationHandler>,
    max_redirects: usize,
    leave: Vec<Arc<dyn BeforeLeaveListener>>,
    enter: Vec<Arc<dyn BeforeEnterListener>>,
    leave_for: HashMap<ViewType, Vec<Arc<dyn BeforeLeaveListener>>>,
    enter_for: HashMap<ViewType, Vec<Arc<dyn BeforeEnterListener>>>,
}

/// Resumes a postponed attempt from the leave listener after the one that
/// postponed.
struct ResumeNavigation {
    core: Arc<RouterCore>,
    next_listener: usize,
}

impl ContinuationHandler for ResumeNavigation {
    fn resume(
        &self,
        guard: &mut SessionGuard<'_>,
        event: NavigationEvent,
    ) -> Result<NavigationOutcome, NavigationError> {
        self.core.run(guard, event, self.next_listener)
    }
}

/// Where an attempt currently points.
struct Attempt {
    /// Location being resolved; its query is what redirects preserve.
    location: Location,
    /// Location the client displays.
    visible: Location,
    state: NavigationState,
    layouts: Vec<ViewType>,
    forwarded: bool,
    error: Option<(ErrorParameter, u16)>,
    chain: Vec<String>,
}

impl RouterCore {
    fn run(
        self: &Arc<Self>,
        guard: &mut SessionGuard<'_>,
        event: NavigationEvent,
        leave_start: usize,
    ) -> Result<NavigationOutcome, NavigationError> {
        let mut attempt = self.start(&event)?;

        if let Some(active) = guard.active().cloned() {
            let listeners = self.leave_listeners(&active);
            let mut leave = BeforeLeaveEvent::new(self.before_event(&event, &attempt));
            let mut stopped_at = None;
            for (index, listener) in listeners.iter().enumerate().skip(leave_start) {
                debug!("Leave listener {} for {}", index, active.state.target());
                listener.before_leave(&mut leave)?;
                if leave.is_postponed() || leave.is_redirecting() {
                    stopped_at = Some(index);
                    break;
                }
            }
            let (base, continuation) = leave.into_parts();
            if let Some(action) = continuation {
                let resume: Arc<dyn ContinuationHandler> = Arc::new(ResumeNavigation {
                    core: Arc::clone(self),
                    next_listener: stopped_at.map_or(listeners.len(), |i| i + 1),
                });
                action.set_references(guard, Some(resume), Some(event.clone()))?;
                info!(
                    "Navigation to {} postponed while leaving {}",
                    event.location,
                    active.state.target()
                );
                return Ok(NavigationOutcome::Postponed(action));
            }
            if let Some(redirect) = base.into_redirect() {
                if let Some(url) = self.follow(&mut attempt, redirect)? {
                    return Ok(self.external(url));
                }
            }
        }

        loop {
            let mut enter = BeforeEnterEvent::new(self.before_event(&event, &attempt));
            for listener in self.enter_listeners(&attempt) {
                debug!("Enter listener for {}", attempt.state.target());
                listener.before_enter(&mut enter)?;
                if enter.is_redirecting() {
                    break;
                }
            }
            if let Some(redirect) = enter.into_inner().into_redirect() {
                if let Some(url) = self.follow(&mut attempt, redirect)? {
                    return Ok(self.external(url));
                }
                continue;
            }

            let resolved = ResolvedNavigation {
                event: event.clone(),
                state: attempt.state.clone(),
                layouts: attempt.layouts.clone(),
                visible_location: attempt.visible.clone(),
                forwarded: attempt.forwarded,
                status: attempt.error.as_ref().map_or(OK_STATUS, |(_, s)| *s),
                error: attempt.error.as_ref().map(|(e, _)| e.clone()),
            };
            match self.handler.handle(&resolved) {
                Ok(()) => {
                    info!(
                        "Activated {} at {} ({})",
                        resolved.state.target(),
                        resolved.visible_location,
                        resolved.status
                    );
                    guard.set_active(ActiveChain {
                        location: resolved.visible_location.clone(),
                        state: resolved.state.clone(),
                        layouts: resolved.layouts.clone(),
                    });
                    return Ok(NavigationOutcome::Activated(resolved));
                }
                Err(failure) => self.reroute_failure(&mut attempt, failure)?,
            }
        }
    }

    /// Resolves the requested location, falling back to the NotFound view.
    fn start(&self, event: &NavigationEvent) -> Result<Attempt, NavigationError> {
        let (state, error) = match self.registry.resolve_location(&event.location) {
            Some(state) => (state, None),
            None => {
                let failure = Failure::not_found(event.location.path());
                let Some(entry) = self.errors.resolve(&failure) else {
                    return Err(NavigationError::NotFoundUnhandled {
                        path: event.location.path().to_string(),
                    });
                };
                warn!("No route for {}, showing {}", event.location, entry.view);
                let parameter = ErrorParameter::new(entry.handled_kind, failure, String::new());
                (NavigationState::new(entry.view), Some((parameter, entry.status)))
            }
        };
        Ok(Attempt {
            location: event.location.clone(),
            visible: event.location.clone(),
            layouts: self.registry.layouts(state.target()),
            chain: vec![state.target().name().to_string()],
            state,
            forwarded: false,
            error,
        })
    }

    fn before_event(&self, event: &NavigationEvent, attempt: &Attempt) -> BeforeEvent {
        let current = NavigationEvent::new(event.session, attempt.location.clone(), event.trigger);
        BeforeEvent::new(
            &current,
            &attempt.state,
            attempt.layouts.clone(),
            Arc::clone(&self.registry),
            Arc::clone(&self.errors),
        )
    }

    /// Moves the attempt to a redirect target. Returns the URL of an
    /// external forward, which ends the attempt.
    fn follow(
        &self,
        attempt: &mut Attempt,
        redirect: Redirect,
    ) -> Result<Option<String>, NavigationError> {
        let (state, location) = match redirect {
            Redirect::External(url) => return Ok(Some(url)),
            Redirect::Forward { state, location } => {
                debug!("Forward {} -> {}", attempt.state.target(), state.target());
                attempt.visible = location.clone();
                attempt.forwarded = true;
                attempt.error = None;
                (state, location)
            }
            Redirect::Reroute {
                state,
                location,
                error,
            } => {
                debug!("Reroute {} -> {}", attempt.state.target(), state.target());
                attempt.error = error;
                (state, location)
            }
        };
        self.hop(attempt, state, location)?;
        Ok(None)
    }

    fn hop(
        &self,
        attempt: &mut Attempt,
        state: NavigationState,
        location: Location,
    ) -> Result<(), NavigationError> {
        attempt.chain.push(state.target().name().to_string());
        if attempt.chain.len() - 1 > self.max_redirects {
            warn!("Redirect chain too long: {}", attempt.chain.join(" -> "));
            return Err(NavigationError::RedirectLoop {
                limit: self.max_redirects,
                chain: std::mem::take(&mut attempt.chain),
            });
        }
        attempt.layouts = self.registry.layouts(state.target());
        attempt.state = state;
        attempt.location = location;
        Ok(())
    }

    /// Turns an activation failure into a reroute to its error view.
    fn reroute_failure(
        &self,
        attempt: &mut Attempt,
        failure: Failure,
    ) -> Result<(), NavigationError> {
        if attempt.error.is_some() {
            return Err(NavigationError::ActivationFailed {
                target: attempt.state.target().clone(),
                failure,
            });
        }
        warn!("Activating {} failed: {}", attempt.state.target(), failure);
        let Some(entry) = self.errors.resolve(&failure) else {
            return Err(NavigationError::UnroutableError {
                message: failure.message.clone(),
                kind: failure.kind,
            });
        };
        attempt.error = Some((
            ErrorParameter::new(entry.handled_kind, failure, String::new()),
            entry.status,
        ));
        let location = attempt.location.clone();
        self.hop(attempt, NavigationState::new(entry.view), location)
    }

    fn external(&self, url: String) -> NavigationOutcome {
        info!("Leaving application for {}", url);
        NavigationOutcome::External(url)
    }

    fn leave_listeners(&self, active: &ActiveChain) -> Vec<Arc<dyn BeforeLeaveListener>> {
        let mut listeners = self.leave.clone();
        for view in active.views() {
            if let Some(for_view) = self.leave_for.get(view) {
                listeners.extend(for_view.iter().cloned());
            }
        }
        listeners
    }

    fn enter_listeners(&self, attempt: &Attempt) -> Vec<Arc<dyn BeforeEnterListener>> {
        let mut listeners = self.enter.clone();
        let views = attempt
            .layouts
            .iter()
            .chain(std::iter::once(attempt.state.target()));
        for view in views {
            if let Some(for_view) = self.enter_for.get(view) {
                listeners.extend(for_view.iter().cloned());
            }
        }
        listeners
    }
}
