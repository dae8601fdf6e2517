//! Listener and navigation handler contracts.
//!
//! Listeners see the event by `&mut` for the duration of one call and
//! nothing else; they cannot keep it. Plain closures work for all three
//! traits.

use serde::Serialize;

use crate::core::error::NavigationError;
use crate::core::error_target::{ErrorParameter, Failure};
use crate::core::event::{BeforeEnterEvent, BeforeLeaveEvent};
use crate::core::location::Location;
use crate::core::params::RouteParameters;
use crate::core::state::{NavigationEvent, NavigationState, ViewType};

/// What a listener returns. An `Err` aborts the whole attempt.
pub type ListenerResult = Result<(), NavigationError>;

/// Runs before the active view chain is deactivated.
pub trait BeforeLeaveListener: Send + Sync {
    fn before_leave(&self, event: &mut BeforeLeaveEvent) -> ListenerResult;
}

impl<F> BeforeLeaveListener for F
where
    F: Fn(&mut BeforeLeaveEvent) -> ListenerResult + Send + Sync,
{
    fn before_leave(&self, event: &mut BeforeLeaveEvent) -> ListenerResult {
        self(event)
    }
}

/// Runs before the target view chain is activated.
pub trait BeforeEnterListener: Send + Sync {
    fn before_enter(&self, event: &mut BeforeEnterEvent) -> ListenerResult;
}

impl<F> BeforeEnterListener for F
where
    F: Fn(&mut BeforeEnterEvent) -> ListenerResult + Send + Sync,
{
    fn before_enter(&self, event: &mut BeforeEnterEvent) -> ListenerResult {
        self(event)
    }
}

/// The final result of an attempt, handed to the `NavigationHandler`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNavigation {
    /// The request that started the attempt.
    pub event: NavigationEvent,
    pub state: NavigationState,
    /// Outermost first.
    pub layouts: Vec<ViewType>,
    /// Address the client should display. Forwards change it, reroutes don't.
    pub visible_location: Location,
    pub forwarded: bool,
    pub error: Option<ErrorParameter>,
    pub status: u16,
}

impl ResolvedNavigation {
    pub fn target(&self) -> &ViewType {
        self.state.target()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Serializable digest for printing.
    pub fn summary(&self) -> NavigationSummary {
        NavigationSummary {
            requested: self.event.location.path_with_query(),
            target: self.state.target().clone(),
            layouts: self.layouts.clone(),
            visible_location: self.visible_location.path_with_query(),
            route_parameters: self.state.route_parameters().clone(),
            forwarded: self.forwarded,
            error: self.error.as_ref().map(|e| e.message().to_string()),
            status: self.status,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NavigationSummary {
    pub requested: String,
    pub target: ViewType,
    pub layouts: Vec<ViewType>,
    pub visible_location: String,
    pub route_parameters: RouteParameters,
    pub forwarded: bool,
    pub error: Option<String>,
    pub status: u16,
}

/// Activates the resolved view chain. Called once per completed attempt.
///
/// A returned `Failure` is turned into a reroute to the matching error view.
pub trait NavigationHandler: Send + Sync {
    fn handle(&self, navigation: &ResolvedNavigation) -> Result<(), Failure>;
}

impl<F> NavigationHandler for F
where
    F: Fn(&ResolvedNavigation) -> Result<(), Failure> + Send + Sync,
{
    fn handle(&self, navigation: &ResolvedNavigation) -> Result<(), Failure> {
        self(navigation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::SessionId;
    use crate::core::state::NavigationTrigger;

    #[test]
    fn test_summary_serializes() {
        let resolved = ResolvedNavigation {
            event: NavigationEvent::new(
                SessionId::new(),
                Location::new("users/3?tab=a"),
                NavigationTrigger::RouterLink,
            ),
            state: NavigationState::new("user".into())
                .with_parameters(RouteParameters::from_pairs([("id", "3")]))
                .with_path("users/3"),
            layouts: vec!["main".into()],
            visible_location: Location::new("users/3?tab=a"),
            forwarded: false,
            error: None,
            status: 200,
        };
        let json = serde_json::to_value(resolved.summary()).unwrap();
        assert_eq!(json["target"], "user");
        assert_eq!(json["visible_location"], "users/3?tab=a");
        assert_eq!(json["route_parameters"]["id"], "3");
        assert_eq!(json["status"], 200);
        assert!(json["error"].is_null());
    }

    #[test]
    fn test_closure_handler() {
        let handler = |n: &ResolvedNavigation| {
            if n.target().name() == "broken" {
                Err(Failure::internal("no"))
            } else {
                Ok(())
            }
        };
        let resolved = ResolvedNavigation {
            event: NavigationEvent::new(
                SessionId::new(),
                Location::new("x"),
                NavigationTrigger::Programmatic,
            ),
            state: NavigationState::new("broken".into()),
            layouts: Vec::new(),
            visible_location: Location::new("x"),
            forwarded: false,
            error: None,
            status: 200,
        };
        assert!(NavigationHandler::handle(&handler, &resolved).is_err());
    }
}
