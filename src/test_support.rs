//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::error_target::{ErrorViews, Failure, FailureKind};
use crate::core::event::BeforeEvent;
use crate::core::handler::{NavigationHandler, ResolvedNavigation};
use crate::core::location::Location;
use crate::core::params::ParamType;
use crate::core::registry::{RouteDefinition, RouteRegistry, RouteTable};
use crate::core::session::SessionId;
use crate::core::state::{NavigationEvent, NavigationState, NavigationTrigger};

/// Routes used throughout the unit tests.
pub fn route_table() -> RouteTable {
    RouteTable::new()
        .route("", "home")
        .route("login", "login")
        .route("about", "about")
        .route_with(RouteDefinition::new("users/:id", "user".into()).param_type(ParamType::Integer))
        .route_with(
            RouteDefinition::new("admin/audit", "audit".into())
                .layouts(["main".into(), "admin".into()]),
        )
}

/// `NotFound` → "not-found", everything else → "error".
pub fn error_views() -> ErrorViews {
    ErrorViews::new()
        .handle(FailureKind::NOT_FOUND, "not-found")
        .handle(FailureKind::ANY, "error")
}

/// A fresh event for `location`, as the router would build it.
pub fn event_for(location: &str, routes: RouteTable, errors: ErrorViews) -> BeforeEvent {
    let event = NavigationEvent::new(
        SessionId::new(),
        Location::new(location),
        NavigationTrigger::Programmatic,
    );
    let state = routes
        .resolve_location(&event.location)
        .unwrap_or_else(|| NavigationState::new("home".into()));
    let layouts = routes.layouts(state.target());
    BeforeEvent::new(&event, &state, layouts, Arc::new(routes), Arc::new(errors))
}

/// Navigation handler that remembers what it activated.
#[derive(Default)]
pub struct RecordingHandler {
    seen: Mutex<Vec<ResolvedNavigation>>,
    failing: HashSet<String>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails activation of the named views with an internal failure.
    pub fn failing_on<'a>(views: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
            failing: views.into_iter().map(str::to_string).collect(),
        }
    }

    /// Target names in call order, failed activations included.
    pub fn targets(&self) -> Vec<String> {
        self.seen
            .lock()
            .iter()
            .map(|n| n.target().name().to_string())
            .collect()
    }
}

impl NavigationHandler for RecordingHandler {
    fn handle(&self, navigation: &ResolvedNavigation) -> Result<(), Failure> {
        self.seen.lock().push(navigation.clone());
        if self.failing.contains(navigation.target().name()) {
            return Err(Failure::internal(format!(
                "cannot build {}",
                navigation.target()
            )));
        }
        Ok(())
    }
}
