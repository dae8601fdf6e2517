//! # Navigation State
//!
//! Resolved targets and the request that started an attempt.
//!
//! ```text
//! NavigationState
//! ├── target: ViewType              // which view to activate
//! ├── route_parameters              // captured path values
//! └── resolved_path: Option<String> // concrete path, once computed
//!
//! NavigationEvent
//! ├── session: SessionId
//! ├── location: Location
//! └── trigger: NavigationTrigger
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::location::Location;
use crate::core::params::RouteParameters;
use crate::core::session::SessionId;

/// Opaque token naming a view type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewType(Arc<str>);

impl ViewType {
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ViewType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What caused a navigation. Fixed when the event is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationTrigger {
    /// Navigation requested from application code.
    #[default]
    Programmatic,
    /// The user followed a router link.
    RouterLink,
    /// Browser back/forward.
    History,
    /// Initial load of the page.
    PageLoad,
    /// Reload of the current location.
    Refresh,
}

/// A resolved forward/reroute/navigation target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    target: ViewType,
    route_parameters: RouteParameters,
    resolved_path: Option<String>,
}

impl NavigationState {
    pub fn new(target: ViewType) -> Self {
        Self {
            target,
            route_parameters: RouteParameters::empty(),
            resolved_path: None,
        }
    }

    pub fn with_parameters(mut self, parameters: RouteParameters) -> Self {
        self.route_parameters = parameters;
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.resolved_path = Some(path.into());
        self
    }

    pub fn target(&self) -> &ViewType {
        &self.target
    }

    pub fn route_parameters(&self) -> &RouteParameters {
        &self.route_parameters
    }

    pub fn resolved_path(&self) -> Option<&str> {
        self.resolved_path.as_deref()
    }
}

/// The request that started a navigation attempt.
///
/// A postponed attempt keeps this so it can be resumed later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEvent {
    pub session: SessionId,
    pub location: Location,
    pub trigger: NavigationTrigger,
}

impl NavigationEvent {
    pub fn new(session: SessionId, location: Location, trigger: NavigationTrigger) -> Self {
        Self {
            session,
            location,
            trigger,
        }
    }
}
