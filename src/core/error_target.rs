//! # Error Targets
//!
//! Maps a raised failure to the view that presents it.
//!
//! Lookup is by `FailureKind`: an exact registration wins, otherwise the
//! `ANY` catch-all (if registered) handles it. The entry remembers which kind
//! it was registered for, so an error view can tell "I was picked for
//! exactly this" from "I am the fallback".

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::state::ViewType;

/// Named class of failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FailureKind(Cow<'static, str>);

impl FailureKind {
    /// A location with no route.
    pub const NOT_FOUND: FailureKind = FailureKind(Cow::Borrowed("NotFound"));
    /// A failure raised while activating a view.
    pub const INTERNAL: FailureKind = FailureKind(Cow::Borrowed("Internal"));
    /// Catch-all registration.
    pub const ANY: FailureKind = FailureKind(Cow::Borrowed("Any"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A raised failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(path: &str) -> Self {
        Self::new(
            FailureKind::NOT_FOUND,
            format!("Couldn't find route for '{path}'"),
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(FailureKind::INTERNAL, message)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for Failure {}

/// Resolver answer: the error view and the kind it was registered for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorTargetEntry {
    pub view: ViewType,
    pub handled_kind: FailureKind,
    /// Status code the error view reports (404 for not found, 500 otherwise by default).
    pub status: u16,
}

/// What an error view receives: the failure and why it was picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorParameter {
    handled_kind: FailureKind,
    failure: Failure,
    custom_message: String,
}

impl ErrorParameter {
    pub(crate) fn new(handled_kind: FailureKind, failure: Failure, custom_message: String) -> Self {
        Self {
            handled_kind,
            failure,
            custom_message,
        }
    }

    pub fn handled_kind(&self) -> &FailureKind {
        &self.handled_kind
    }

    pub fn failure(&self) -> &Failure {
        &self.failure
    }

    pub fn custom_message(&self) -> &str {
        &self.custom_message
    }

    /// The custom message, or the failure's own message when none was given.
    pub fn message(&self) -> &str {
        if self.custom_message.is_empty() {
            &self.failure.message
        } else {
            &self.custom_message
        }
    }
}

/// Lookup contract for error views.
pub trait ErrorTargetResolver: Send + Sync {
    fn resolve(&self, failure: &Failure) -> Option<ErrorTargetEntry>;
}

/// In-memory error view table.
#[derive(Debug, Default)]
pub struct ErrorViews {
    views: HashMap<FailureKind, (ViewType, u16)>,
}

impl ErrorViews {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `view` for `kind` with the default status for that kind.
    pub fn handle(self, kind: FailureKind, view: impl Into<ViewType>) -> Self {
        let status = default_status(&kind);
        self.handle_with_status(kind, view, status)
    }

    pub fn handle_with_status(
        mut self,
        kind: FailureKind,
        view: impl Into<ViewType>,
        status: u16,
    ) -> Self {
        self.add(kind, view.into(), status);
        self
    }

    pub fn add(&mut self, kind: FailureKind, view: ViewType, status: u16) {
        debug!("Error view for '{}' -> {} ({})", kind, view, status);
        self.views.insert(kind, (view, status));
    }
}

pub fn default_status(kind: &FailureKind) -> u16 {
    if *kind == FailureKind::NOT_FOUND { 404 } else { 500 }
}

impl ErrorTargetResolver for ErrorViews {
    fn resolve(&self, failure: &Failure) -> Option<ErrorTargetEntry> {
        let (handled_kind, (view, status)) = self
            .views
            .get_key_value(&failure.kind)
            .or_else(|| self.views.get_key_value(&FailureKind::ANY))?;
        Some(ErrorTargetEntry {
            view: view.clone(),
            handled_kind: handled_kind.clone(),
            status: *status,
        })
    }
}
