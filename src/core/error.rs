//! # Navigation Errors
//!
//! The fatal side of navigation. Anything a caller can recover from locally
//! (an unknown forward path, a postponed leave) is *not* in here; it shows up
//! as a marker on the event or as a `NavigationOutcome` instead.

use thiserror::Error;

use crate::core::error_target::{Failure, FailureKind};
use crate::core::params::ParamType;
use crate::core::session::SessionId;
use crate::core::state::ViewType;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    /// A route parameter does not match the type the target declares.
    #[error("Given route parameter '{value}' is of the wrong type {supplied}. Required '{required}'.")]
    ParameterType {
        value: String,
        supplied: ParamType,
        required: ParamType,
    },

    /// The view type has no route, so there is no path to navigate to.
    #[error("view '{target}' is not a registered navigation target")]
    NotRoutable { target: ViewType },

    /// The view's route needs parameters that were not given.
    #[error("view '{target}' needs route parameters [{}]", .required.join(", "))]
    MissingParameters {
        target: ViewType,
        required: Vec<String>,
    },

    /// `reroute_to_error` found no error view for the failure.
    #[error("no error view handles failure kind '{kind}': {message}")]
    UnroutableError { kind: FailureKind, message: String },

    /// Not-found fallback failed: the path has no route and no error view.
    #[error("no route for '{path}' and no error view for '{}'", FailureKind::NOT_FOUND)]
    NotFoundUnhandled { path: String },

    /// A continuation was used with the lock of a different session.
    #[error(
        "continuation for session {expected} may not be used without that session's lock (held: {actual})"
    )]
    LockNotHeld {
        expected: SessionId,
        actual: SessionId,
    },

    /// Forward/reroute chain went past the configured bound.
    #[error("redirect chain exceeded {limit} hops: {}", .chain.join(" -> "))]
    RedirectLoop { limit: usize, chain: Vec<String> },

    /// The navigation handler failed while activating an error view.
    #[error("activation of error view '{target}' failed: {failure}")]
    ActivationFailed { target: ViewType, failure: Failure },

    /// A listener aborted the attempt.
    #[error("navigation aborted by listener: {0}")]
    Listener(String),
}
