//! # Before-Navigation Events
//!
//! Each navigation attempt builds one event per phase and hands it, by
//! `&mut`, to every listener of that phase in turn. Listeners record at most
//! one decision on it:
//!
//! ```text
//! forward_to*   target changes, the visible address changes
//! reroute_to*   target changes, the visible address stays
//! reroute_to_error   reroute to the error view for a failure
//! forward_to_url     leave the application (full page load)
//! postpone      leave phase only: suspend the attempt
//! ```
//!
//! Redirect decisions are last-write-wins and mutually exclusive: setting
//! a forward clears any reroute and vice versa. A path that cannot be
//! resolved is recorded as an "unknown forward/reroute" marker instead of
//! failing, and leaves earlier decisions alone.
//!
//! `BeforeLeaveEvent` and `BeforeEnterEvent` share this machinery through
//! `BeforeEvent`. Only the leave event can `postpone()`.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use log::{debug, warn};

use crate::core::continuation::ContinueNavigationAction;
use crate::core::error::NavigationError;
use crate::core::error_target::{ErrorParameter, ErrorTargetResolver, Failure, FailureKind};
use crate::core::location::{Location, QueryParameters, trim_path};
use crate::core::params::{ParamValue, RouteParameters, validate_parameter, validate_segment};
use crate::core::registry::RouteRegistry;
use crate::core::session::SessionId;
use crate::core::state::{NavigationEvent, NavigationState, NavigationTrigger, ViewType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RedirectKind {
    Forward,
    Reroute,
}

/// The decision an event carries once dispatch is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Redirect {
    Forward {
        state: NavigationState,
        location: Location,
    },
    Reroute {
        state: NavigationState,
        location: Location,
        error: Option<(ErrorParameter, u16)>,
    },
    External(String),
}

/// Read-only view of an event's redirect decision.
pub trait RedirectView {
    fn before_event(&self) -> &BeforeEvent;

    fn has_forward_target(&self) -> bool {
        self.before_event().forward_target.is_some()
    }

    fn has_reroute_target(&self) -> bool {
        self.before_event().reroute_target.is_some()
    }

    fn has_unknown_forward(&self) -> bool {
        self.before_event().unknown_forward.is_some()
    }

    fn has_unknown_reroute(&self) -> bool {
        self.before_event().unknown_reroute.is_some()
    }

    fn has_error_parameter(&self) -> bool {
        self.before_event().error_parameter.is_some()
    }

    fn has_redirect_query_parameters(&self) -> bool {
        self.before_event().redirect_query_parameters.is_some()
    }

    fn has_external_forward_url(&self) -> bool {
        self.before_event().external_forward_url.is_some()
    }

    /// True once a listener has decided where the attempt goes instead.
    fn is_redirecting(&self) -> bool {
        self.has_forward_target() || self.has_reroute_target() || self.has_external_forward_url()
    }
}

/// Shared state and redirect API of both navigation phases.
pub struct BeforeEvent {
    session: SessionId,
    location: Location,
    trigger: NavigationTrigger,
    navigation_target: ViewType,
    parameters: RouteParameters,
    layouts: Vec<ViewType>,
    registry: Arc<dyn RouteRegistry>,
    errors: Arc<dyn ErrorTargetResolver>,

    forward_target: Option<NavigationState>,
    reroute_target: Option<NavigationState>,
    redirect_query_parameters: Option<QueryParameters>,
    unknown_forward: Option<String>,
    unknown_reroute: Option<String>,
    external_forward_url: Option<String>,
    error_parameter: Option<ErrorParameter>,
    error_status: Option<u16>,
}

impl BeforeEvent {
    pub fn new(
        event: &NavigationEvent,
        target: &NavigationState,
        layouts: Vec<ViewType>,
        registry: Arc<dyn RouteRegistry>,
        errors: Arc<dyn ErrorTargetResolver>,
    ) -> Self {
        Self {
            session: event.session,
            location: event.location.clone(),
            trigger: event.trigger,
            navigation_target: target.target().clone(),
            parameters: target.route_parameters().clone(),
            layouts,
            registry,
            errors,
            forward_target: None,
            reroute_target: None,
            redirect_query_parameters: None,
            unknown_forward: None,
            unknown_reroute: None,
            external_forward_url: None,
            error_parameter: None,
            error_status: None,
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn trigger(&self) -> NavigationTrigger {
        self.trigger
    }

    /// The view the attempt is heading for, in both phases.
    pub fn navigation_target(&self) -> &ViewType {
        &self.navigation_target
    }

    pub fn route_parameters(&self) -> &RouteParameters {
        &self.parameters
    }

    /// Layout chain of the navigation target, outermost first.
    pub fn layouts(&self) -> &[ViewType] {
        &self.layouts
    }

    // ── forward ─────────────────────────────────────────────────────────────

    /// Forward to `target` with no route parameters.
    pub fn forward_to(&mut self, target: &ViewType) -> Result<(), NavigationError> {
        self.redirect_to_view(RedirectKind::Forward, target, &RouteParameters::empty(), None)
    }

    /// Forward to `target`. `query` of `None` keeps this location's query.
    pub fn forward_to_with(
        &mut self,
        target: &ViewType,
        parameters: RouteParameters,
        query: Option<QueryParameters>,
    ) -> Result<(), NavigationError> {
        self.redirect_to_view(RedirectKind::Forward, target, &parameters, query)
    }

    /// Forward to a target that takes typed parameters.
    pub fn forward_to_parameters(
        &mut self,
        target: &ViewType,
        values: &[ParamValue],
        query: Option<QueryParameters>,
    ) -> Result<(), NavigationError> {
        self.redirect_to_typed(RedirectKind::Forward, target, values, query)
    }

    pub fn forward_to_state(&mut self, state: NavigationState) {
        self.set_target(RedirectKind::Forward, state, None);
    }

    /// Forward to whatever is registered at `path`.
    ///
    /// An unknown path is recorded (see `unknown_forward()`), not an error.
    pub fn forward_to_path(&mut self, path: &str) {
        self.redirect_to_location(RedirectKind::Forward, path);
    }

    /// Forward to the route at `path` that takes `values` as trailing
    /// parameters. Fails if the values do not match the declared type.
    pub fn forward_to_path_with(
        &mut self,
        path: &str,
        values: &[ParamValue],
        query: Option<QueryParameters>,
    ) -> Result<(), NavigationError> {
        self.redirect_to_path(RedirectKind::Forward, path, values, query)
    }

    /// Leave the application for `url`.
    pub fn forward_to_url(&mut self, url: impl Into<String>) {
        let url = url.into();
        debug!("External forward to {}", url);
        self.forward_target = None;
        self.reroute_target = None;
        self.error_parameter = None;
        self.error_status = None;
        self.external_forward_url = Some(url);
    }

    // ── reroute ─────────────────────────────────────────────────────────────

    /// Reroute to `target` with no route parameters.
    pub fn reroute_to(&mut self, target: &ViewType) -> Result<(), NavigationError> {
        self.redirect_to_view(RedirectKind::Reroute, target, &RouteParameters::empty(), None)
    }

    /// Reroute to `target`. `query` of `None` keeps this location's query.
    pub fn reroute_to_with(
        &mut self,
        target: &ViewType,
        parameters: RouteParameters,
        query: Option<QueryParameters>,
    ) -> Result<(), NavigationError> {
        self.redirect_to_view(RedirectKind::Reroute, target, &parameters, query)
    }

    pub fn reroute_to_parameters(
        &mut self,
        target: &ViewType,
        values: &[ParamValue],
        query: Option<QueryParameters>,
    ) -> Result<(), NavigationError> {
        self.redirect_to_typed(RedirectKind::Reroute, target, values, query)
    }

    pub fn reroute_to_state(&mut self, state: NavigationState) {
        self.set_target(RedirectKind::Reroute, state, None);
    }

    /// Reroute to whatever is registered at `path`; unknown paths are recorded.
    pub fn reroute_to_path(&mut self, path: &str) {
        self.redirect_to_location(RedirectKind::Reroute, path);
    }

    pub fn reroute_to_path_with(
        &mut self,
        path: &str,
        values: &[ParamValue],
        query: Option<QueryParameters>,
    ) -> Result<(), NavigationError> {
        self.redirect_to_path(RedirectKind::Reroute, path, values, query)
    }

    /// Reroute to the error view for a failure of `kind`.
    pub fn reroute_to_error_kind(
        &mut self,
        kind: FailureKind,
        custom_message: &str,
    ) -> Result<(), NavigationError> {
        self.reroute_to_error(Failure::new(kind, ""), custom_message)
    }

    /// Reroute to the error view for `failure`.
    ///
    /// No error view for it is fatal: there is nowhere else to show it.
    pub fn reroute_to_error(
        &mut self,
        failure: Failure,
        custom_message: &str,
    ) -> Result<(), NavigationError> {
        let Some(entry) = self.errors.resolve(&failure) else {
            let message = if custom_message.is_empty() {
                failure.message.clone()
            } else {
                custom_message.to_string()
            };
            return Err(NavigationError::UnroutableError {
                kind: failure.kind,
                message,
            });
        };
        debug!(
            "Reroute to error view {} for '{}' (handled as '{}')",
            entry.view, failure.kind, entry.handled_kind
        );
        self.set_target(RedirectKind::Reroute, NavigationState::new(entry.view), None);
        self.error_parameter = Some(ErrorParameter::new(
            entry.handled_kind,
            failure,
            custom_message.to_string(),
        ));
        self.error_status = Some(entry.status);
        Ok(())
    }

    // ── accessors ───────────────────────────────────────────────────────────

    pub fn forward_target(&self) -> Option<&NavigationState> {
        self.forward_target.as_ref()
    }

    pub fn reroute_target(&self) -> Option<&NavigationState> {
        self.reroute_target.as_ref()
    }

    pub fn forward_url(&self) -> Option<&str> {
        self.forward_target.as_ref().and_then(|s| s.resolved_path())
    }

    pub fn reroute_url(&self) -> Option<&str> {
        self.reroute_target.as_ref().and_then(|s| s.resolved_path())
    }

    /// Where a forward would go, with the query it would carry.
    pub fn forward_location(&self) -> Option<Location> {
        self.forward_target.as_ref().map(|s| self.next_location(s))
    }

    /// Where a reroute would go, with the query it would carry.
    pub fn reroute_location(&self) -> Option<Location> {
        self.reroute_target.as_ref().map(|s| self.next_location(s))
    }

    pub fn unknown_forward(&self) -> Option<&str> {
        self.unknown_forward.as_deref()
    }

    pub fn unknown_reroute(&self) -> Option<&str> {
        self.unknown_reroute.as_deref()
    }

    pub fn external_forward_url(&self) -> Option<&str> {
        self.external_forward_url.as_deref()
    }

    pub fn redirect_query_parameters(&self) -> Option<&QueryParameters> {
        self.redirect_query_parameters.as_ref()
    }

    pub fn error_parameter(&self) -> Option<&ErrorParameter> {
        self.error_parameter.as_ref()
    }

    // ── internals ───────────────────────────────────────────────────────────

    fn next_location(&self, state: &NavigationState) -> Location {
        let query = self
            .redirect_query_parameters
            .clone()
            .unwrap_or_else(|| self.location.query_parameters().clone());
        let path = state.resolved_path().unwrap_or(self.location.path());
        Location::with_query(path, query)
    }

    fn set_target(
        &mut self,
        kind: RedirectKind,
        state: NavigationState,
        query: Option<QueryParameters>,
    ) {
        debug!("{:?} to {} ({:?})", kind, state.target(), state.resolved_path());
        self.redirect_query_parameters = query;
        self.external_forward_url = None;
        self.error_parameter = None;
        self.error_status = None;
        match kind {
            RedirectKind::Forward => {
                self.reroute_target = None;
                self.forward_target = Some(state);
            }
            RedirectKind::Reroute => {
                self.forward_target = None;
                self.reroute_target = Some(state);
            }
        }
    }

    fn set_unknown(&mut self, kind: RedirectKind, path: &str) {
        let trimmed = trim_path(path);
        warn!("{:?} target '{}' is not a known route", kind, trimmed);
        match kind {
            RedirectKind::Forward => self.unknown_forward = Some(trimmed),
            RedirectKind::Reroute => self.unknown_reroute = Some(trimmed),
        }
    }

    fn state_for_view(
        &self,
        target: &ViewType,
        parameters: &RouteParameters,
    ) -> Result<NavigationState, NavigationError> {
        if let Some(required) = self.registry.parameter_type(target) {
            for name in self.registry.parameter_names(target) {
                if let Some(value) = parameters.get(&name) {
                    validate_segment(value, required)?;
                }
            }
        }
        if let Some(state) = self.registry.resolve_target(target, parameters) {
            return Ok(state);
        }
        let required = self.registry.parameter_names(target);
        if required.is_empty() {
            Err(NavigationError::NotRoutable {
                target: target.clone(),
            })
        } else {
            Err(NavigationError::MissingParameters {
                target: target.clone(),
                required,
            })
        }
    }

    fn redirect_to_view(
        &mut self,
        kind: RedirectKind,
        target: &ViewType,
        parameters: &RouteParameters,
        query: Option<QueryParameters>,
    ) -> Result<(), NavigationError> {
        let state = self.state_for_view(target, parameters)?;
        self.set_target(kind, state, query);
        Ok(())
    }

    fn redirect_to_typed(
        &mut self,
        kind: RedirectKind,
        target: &ViewType,
        values: &[ParamValue],
        query: Option<QueryParameters>,
    ) -> Result<(), NavigationError> {
        self.validate(target, values)?;
        let names = self.registry.parameter_names(target);
        let parameters = named_parameters(&names, values);
        let state = self.state_for_view(target, &parameters)?;
        self.set_target(kind, state, query);
        Ok(())
    }

    fn redirect_to_location(&mut self, kind: RedirectKind, path: &str) {
        let location = Location::new(path);
        match self.registry.resolve_location(&location) {
            Some(state) => {
                let query = (!location.query_parameters().is_empty())
                    .then(|| location.query_parameters().clone());
                self.set_target(kind, state, query);
            }
            None => self.set_unknown(kind, path),
        }
    }

    fn redirect_to_path(
        &mut self,
        kind: RedirectKind,
        path: &str,
        values: &[ParamValue],
        query: Option<QueryParameters>,
    ) -> Result<(), NavigationError> {
        let segments: Vec<String> = values.iter().map(ParamValue::to_segment).collect();
        let Some(target) = self.registry.resolve_path(path, &segments) else {
            self.set_unknown(kind, path);
            return Ok(());
        };
        self.validate(&target, values)?;

        let mut full = trim_path(path);
        for segment in &segments {
            if !full.is_empty() {
                full.push('/');
            }
            full.push_str(segment);
        }
        let names = self.registry.parameter_names(&target);
        let state = NavigationState::new(target)
            .with_parameters(named_parameters(&names, values))
            .with_path(full);
        self.set_target(kind, state, query);
        Ok(())
    }

    fn validate(&self, target: &ViewType, values: &[ParamValue]) -> Result<(), NavigationError> {
        if let Some(required) = self.registry.parameter_type(target) {
            for value in values {
                validate_parameter(value, required)?;
            }
        }
        Ok(())
    }

    /// Consumes the event, yielding the decision the router acts on.
    pub(crate) fn into_redirect(self) -> Option<Redirect> {
        if let Some(url) = self.external_forward_url {
            return Some(Redirect::External(url));
        }
        if let Some(state) = &self.forward_target {
            return Some(Redirect::Forward {
                location: self.next_location(state),
                state: state.clone(),
            });
        }
        if let Some(state) = &self.reroute_target {
            let error = self
                .error_parameter
                .clone()
                .zip(self.error_status);
            return Some(Redirect::Reroute {
                location: self.next_location(state),
                state: state.clone(),
                error,
            });
        }
        None
    }
}

/// Pairs values with the route's trailing parameter names.
fn named_parameters(names: &[String], values: &[ParamValue]) -> RouteParameters {
    let offset = names.len().saturating_sub(values.len());
    RouteParameters::from_pairs(
        names[offset..]
            .iter()
            .zip(values)
            .map(|(name, value)| (name.clone(), value.to_segment())),
    )
}

impl RedirectView for BeforeEvent {
    fn before_event(&self) -> &BeforeEvent {
        self
    }
}

/// Event for the phase that deactivates the current view chain.
pub struct BeforeLeaveEvent {
    base: BeforeEvent,
    continuation: Option<ContinueNavigationAction>,
}

impl BeforeLeaveEvent {
    pub fn new(base: BeforeEvent) -> Self {
        Self {
            base,
            continuation: None,
        }
    }

    /// Suspends the attempt. The router stops after this listener; keep the
    /// returned action to `proceed()` or `cancel()` later.
    pub fn postpone(&mut self) -> ContinueNavigationAction {
        let action = ContinueNavigationAction::new(self.base.session);
        debug!("Navigation to {} postponed ({})", self.base.location, action.id());
        self.continuation = Some(action.clone());
        action
    }

    pub fn is_postponed(&self) -> bool {
        self.continuation.is_some()
    }

    pub fn continue_navigation_action(&self) -> Option<&ContinueNavigationAction> {
        self.continuation.as_ref()
    }

    pub(crate) fn into_parts(self) -> (BeforeEvent, Option<ContinueNavigationAction>) {
        (self.base, self.continuation)
    }
}

impl Deref for BeforeLeaveEvent {
    type Target = BeforeEvent;

    fn deref(&self) -> &BeforeEvent {
        &self.base
    }
}

impl DerefMut for BeforeLeaveEvent {
    fn deref_mut(&mut self) -> &mut BeforeEvent {
        &mut self.base
    }
}

impl RedirectView for BeforeLeaveEvent {
    fn before_event(&self) -> &BeforeEvent {
        &self.base
    }
}

/// Event for the phase that activates the target view chain.
pub struct BeforeEnterEvent {
    base: BeforeEvent,
}

impl BeforeEnterEvent {
    pub fn new(base: BeforeEvent) -> Self {
        Self { base }
    }

    pub(crate) fn into_inner(self) -> BeforeEvent {
        self.base
    }
}

impl Deref for BeforeEnterEvent {
    type Target = BeforeEvent;

    fn deref(&self) -> &BeforeEvent {
        &self.base
    }
}

impl DerefMut for BeforeEnterEvent {
    fn deref_mut(&mut self) -> &mut BeforeEvent {
        &mut self.base
    }
}

impl RedirectView for BeforeEnterEvent {
    fn before_event(&self) -> &BeforeEvent {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::params::ParamType;
    use crate::test_support::{error_views, event_for, route_table};

    fn enter_event(location: &str) -> BeforeEnterEvent {
        BeforeEnterEvent::new(event_for(location, route_table(), error_views()))
    }

    #[test]
    fn test_forward_sets_only_forward_slot() {
        let mut event = enter_event("home");
        event.forward_to(&"login".into()).unwrap();
        assert!(event.has_forward_target());
        assert!(!event.has_reroute_target());
        assert_eq!(event.forward_url(), Some("login"));
    }

    #[test]
    fn test_last_redirect_wins() {
        let mut event = enter_event("home");
        event.forward_to(&"login".into()).unwrap();
        event.reroute_to(&"about".into()).unwrap();
        assert!(!event.has_forward_target());
        assert!(event.has_reroute_target());
        assert_eq!(event.reroute_target().unwrap().target().name(), "about");

        event.forward_to(&"login".into()).unwrap();
        assert!(event.has_forward_target());
        assert!(!event.has_reroute_target());
    }

    #[test]
    fn test_forward_preserves_original_query() {
        let mut event = enter_event("home?lang=fi&x=1");
        event.forward_to(&"login".into()).unwrap();
        let location = event.forward_location().unwrap();
        assert_eq!(location.path_with_query(), "login?lang=fi&x=1");
        assert!(!event.has_redirect_query_parameters());
    }

    #[test]
    fn test_forward_with_empty_query_clears_it() {
        let mut event = enter_event("home?lang=fi");
        event
            .forward_to_with(
                &"login".into(),
                RouteParameters::empty(),
                Some(QueryParameters::empty()),
            )
            .unwrap();
        assert!(event.has_redirect_query_parameters());
        assert_eq!(event.forward_location().unwrap().path_with_query(), "login");
    }

    #[test]
    fn test_reroute_with_query_override() {
        let mut event = enter_event("home?lang=fi");
        event
            .reroute_to_with(
                &"about".into(),
                RouteParameters::empty(),
                Some(QueryParameters::simple([("tab", "team")])),
            )
            .unwrap();
        assert_eq!(
            event.reroute_location().unwrap().path_with_query(),
            "about?tab=team"
        );
    }

    #[test]
    fn test_unknown_forward_is_recorded_not_raised() {
        let mut event = enter_event("home");
        event.forward_to_path(" /no-such-route/ ");
        assert!(event.has_unknown_forward());
        assert_eq!(event.unknown_forward(), Some("no-such-route"));
        assert!(!event.has_forward_target());
    }

    #[test]
    fn test_unknown_reroute_keeps_earlier_target() {
        let mut event = enter_event("home");
        event.reroute_to(&"about".into()).unwrap();
        event.reroute_to_path("ghost");
        assert!(event.has_unknown_reroute());
        assert!(event.has_reroute_target());
    }

    #[test]
    fn test_forward_to_path_resolves_parameters() {
        let mut event = enter_event("home");
        event.forward_to_path("/users/42?tab=posts");
        let target = event.forward_target().unwrap();
        assert_eq!(target.target().name(), "user");
        assert_eq!(target.route_parameters().get_integer("id"), Some(42));
        assert_eq!(
            event.forward_location().unwrap().path_with_query(),
            "users/42?tab=posts"
        );
    }

    #[test]
    fn test_typed_path_forward_rejects_wrong_type_before_mutation() {
        let mut event = enter_event("home");
        let err = event
            .forward_to_path_with("users", &[ParamValue::from("abc")], None)
            .unwrap_err();
        assert_eq!(
            err,
            NavigationError::ParameterType {
                value: "abc".to_string(),
                supplied: ParamType::Text,
                required: ParamType::Integer,
            }
        );
        assert!(!event.has_forward_target());
        assert!(!event.has_unknown_forward());
        assert!(!event.has_redirect_query_parameters());
    }

    #[test]
    fn test_typed_path_forward_accepts_matching_type() {
        let mut event = enter_event("home");
        event
            .forward_to_path_with("users", &[ParamValue::from(42)], None)
            .unwrap();
        assert_eq!(event.forward_url(), Some("users/42"));
        assert_eq!(
            event.forward_target().unwrap().route_parameters().get("id"),
            Some("42")
        );
    }

    #[test]
    fn test_typed_path_forward_unknown_route() {
        let mut event = enter_event("home");
        event
            .forward_to_path_with("nothing", &[ParamValue::from(1)], None)
            .unwrap();
        assert_eq!(event.unknown_forward(), Some("nothing"));
    }

    #[test]
    fn test_typed_view_forward() {
        let mut event = enter_event("home");
        event
            .reroute_to_parameters(&"user".into(), &[ParamValue::from(5)], None)
            .unwrap();
        assert_eq!(event.reroute_url(), Some("users/5"));
        let err = event
            .reroute_to_parameters(&"user".into(), &[ParamValue::from(true)], None)
            .unwrap_err();
        assert!(matches!(err, NavigationError::ParameterType { .. }));
        assert_eq!(event.reroute_url(), Some("users/5"));
    }

    #[test]
    fn test_path_forward_with_unparseable_segment_is_unknown() {
        let mut event = enter_event("home");
        event.forward_to_path("users/abc");
        assert!(!event.has_forward_target());
        assert_eq!(event.unknown_forward(), Some("users/abc"));
    }

    #[test]
    fn test_unknown_path_keeps_its_query() {
        let mut event = enter_event("home");
        event.reroute_to_path("/nope?x=1");
        assert_eq!(event.unknown_reroute(), Some("nope?x=1"));
    }

    #[test]
    fn test_view_forward_checks_parameter_values() {
        let mut event = enter_event("home");
        let err = event
            .forward_to_with(
                &"user".into(),
                RouteParameters::from_pairs([("id", "abc")]),
                Some(QueryParameters::empty()),
            )
            .unwrap_err();
        assert_eq!(
            err,
            NavigationError::ParameterType {
                value: "abc".to_string(),
                supplied: ParamType::Text,
                required: ParamType::Integer,
            }
        );
        assert!(!event.is_redirecting());
        assert!(!event.has_redirect_query_parameters());

        event
            .forward_to_with(&"user".into(), RouteParameters::from_pairs([("id", "12")]), None)
            .unwrap();
        assert_eq!(event.forward_url(), Some("users/12"));
    }

    #[test]
    fn test_forward_to_parameters() {
        let mut event = enter_event("home?tab=x");
        event
            .forward_to_parameters(&"user".into(), &[ParamValue::from(9)], None)
            .unwrap();
        assert_eq!(event.forward_location().unwrap().path_with_query(), "users/9?tab=x");
        assert_eq!(
            event.forward_target().unwrap().route_parameters().get_integer("id"),
            Some(9)
        );

        let err = event
            .forward_to_parameters(&"user".into(), &[ParamValue::from("9")], None)
            .unwrap_err();
        assert!(matches!(err, NavigationError::ParameterType { .. }));
        assert_eq!(event.forward_url(), Some("users/9"));
    }

    #[test]
    fn test_state_redirects_take_the_state_as_given() {
        let mut event = enter_event("home");
        let state = NavigationState::new("audit".into()).with_path("admin/audit");
        event.forward_to_state(state.clone());
        assert_eq!(event.forward_target(), Some(&state));
        assert_eq!(event.forward_url(), Some("admin/audit"));

        event.reroute_to_state(NavigationState::new("about".into()));
        assert!(!event.has_forward_target());
        assert_eq!(event.reroute_target().unwrap().target().name(), "about");
        assert_eq!(event.reroute_location().unwrap().path(), "home");
    }

    #[test]
    fn test_forward_to_unregistered_view_fails() {
        let mut event = enter_event("home");
        let err = event.forward_to(&"ghost".into()).unwrap_err();
        assert!(matches!(err, NavigationError::NotRoutable { .. }));
        let err = event.forward_to(&"user".into()).unwrap_err();
        assert!(matches!(err, NavigationError::MissingParameters { .. }));
    }

    #[test]
    fn test_reroute_to_error_sets_parameter() {
        let mut event = enter_event("home");
        event
            .reroute_to_error(Failure::internal("boom"), "Something broke")
            .unwrap();
        assert!(event.has_reroute_target());
        assert!(event.has_error_parameter());
        assert_eq!(event.reroute_target().unwrap().target().name(), "error");
        let param = event.error_parameter().unwrap();
        assert_eq!(param.handled_kind(), &FailureKind::ANY);
        assert_eq!(param.custom_message(), "Something broke");
        assert_eq!(param.failure().message, "boom");
    }

    #[test]
    fn test_reroute_to_error_without_handler_is_fatal() {
        let mut event = BeforeEnterEvent::new(event_for(
            "home",
            route_table(),
            crate::core::error_target::ErrorViews::new(),
        ));
        let err = event
            .reroute_to_error_kind(FailureKind::new("Unauthenticated"), "login first")
            .unwrap_err();
        assert_eq!(
            err,
            NavigationError::UnroutableError {
                kind: FailureKind::new("Unauthenticated"),
                message: "login first".to_string(),
            }
        );
        assert!(!event.has_reroute_target());
    }

    #[test]
    fn test_later_redirect_clears_error_parameter() {
        let mut event = enter_event("home");
        event.reroute_to_error(Failure::internal("boom"), "").unwrap();
        event.forward_to(&"login".into()).unwrap();
        assert!(!event.has_error_parameter());
    }

    #[test]
    fn test_external_forward_replaces_targets() {
        let mut event = enter_event("home");
        event.forward_to(&"login".into()).unwrap();
        event.forward_to_url("https://example.com/sso");
        assert!(!event.has_forward_target());
        assert!(event.has_external_forward_url());
        assert!(event.is_redirecting());
        assert_eq!(
            event.into_inner().into_redirect(),
            Some(Redirect::External("https://example.com/sso".to_string()))
        );
    }

    #[test]
    fn test_postpone_only_on_leave() {
        let mut event = BeforeLeaveEvent::new(event_for("home", route_table(), error_views()));
        assert!(!event.is_postponed());
        let action = event.postpone();
        assert!(event.is_postponed());
        assert_eq!(event.continue_navigation_action(), Some(&action));
        assert_eq!(action.session(), event.session());
    }

    #[test]
    fn test_fresh_event_has_no_decision() {
        let event = enter_event("home");
        assert!(!event.is_redirecting());
        assert!(!event.has_unknown_forward());
        assert!(!event.has_unknown_reroute());
        assert!(!event.has_error_parameter());
        assert_eq!(event.into_inner().into_redirect(), None);
    }
}
