//! # Route Registry
//!
//! Answers "which view handles this path?" and the reverse, "what path
//! shows this view with these parameters?".
//!
//! Templates use `:name` for a captured segment:
//!
//! ```text
//! ""                 -> home
//! "users/:id"        -> user       (declares ParamType::Integer)
//! "admin/audit"      -> audit      (layouts: [main, admin])
//! ```
//!
//! `RouteTable` keeps registration order; the first matching template wins.
//! A segment that does not parse as the route's declared type does not match.

use std::collections::HashMap;

use log::{debug, warn};

use crate::core::location::{Location, trim_path};
use crate::core::params::{ParamType, RouteParameters};
use crate::core::state::{NavigationState, ViewType};

/// Lookup contract the router consumes.
pub trait RouteRegistry: Send + Sync {
    /// Target for `path` with `segments` appended as trailing parameters.
    ///
    /// `resolve_path("users", ["42"])` finds the view registered at `users/:id`.
    fn resolve_path(&self, path: &str, segments: &[String]) -> Option<ViewType>;

    /// Reverse lookup: the state (with its concrete path) for a view.
    fn resolve_target(&self, target: &ViewType, parameters: &RouteParameters)
    -> Option<NavigationState>;

    /// Full match of a location against the registered templates.
    fn resolve_location(&self, location: &Location) -> Option<NavigationState>;

    /// Layout chain wrapping `target`, outermost first.
    fn layouts(&self, target: &ViewType) -> Vec<ViewType>;

    /// The parameter type `target` declares, if it takes one.
    fn parameter_type(&self, target: &ViewType) -> Option<ParamType>;

    /// Names of the parameters in `target`'s route, in template order.
    fn parameter_names(&self, target: &ViewType) -> Vec<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

/// One registered route.
#[derive(Debug, Clone)]
pub struct RouteDefinition {
    template: String,
    segments: Vec<Segment>,
    view: ViewType,
    param_type: Option<ParamType>,
    layouts: Vec<ViewType>,
}

impl RouteDefinition {
    pub fn new(template: &str, view: ViewType) -> Self {
        let template = trim_path(template);
        let segments = template
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s.strip_prefix(':') {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Static(s.to_string()),
            })
            .collect();
        Self {
            template,
            segments,
            view,
            param_type: None,
            layouts: Vec::new(),
        }
    }

    pub fn param_type(mut self, param_type: ParamType) -> Self {
        self.param_type = Some(param_type);
        self
    }

    /// Layouts wrapping the view, outermost first.
    pub fn layouts(mut self, layouts: impl IntoIterator<Item = ViewType>) -> Self {
        self.layouts = layouts.into_iter().collect();
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn view(&self) -> &ViewType {
        &self.view
    }

    fn capture(&self, segments: &[String]) -> Option<RouteParameters> {
        if segments.len() != self.segments.len() {
            return None;
        }
        let mut captured = Vec::new();
        for (pattern, actual) in self.segments.iter().zip(segments) {
            match pattern {
                Segment::Static(s) if s == actual => {}
                Segment::Static(_) => return None,
                Segment::Param(_)
                    if self.param_type.is_some_and(|t| !t.accepts(actual)) =>
                {
                    return None;
                }
                Segment::Param(name) => captured.push((name.clone(), actual.clone())),
            }
        }
        Some(RouteParameters::from_pairs(captured))
    }

    fn build_path(&self, parameters: &RouteParameters) -> Option<String> {
        let mut parts = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            match segment {
                Segment::Static(s) => parts.push(s.clone()),
                Segment::Param(name) => parts.push(parameters.get(name)?.to_string()),
            }
        }
        Some(parts.join("/"))
    }

    /// True when the template is `path` followed by exactly `count` parameters.
    fn accepts_trailing(&self, path: &str, count: usize) -> bool {
        if self.segments.len() < count {
            return false;
        }
        let split = self.segments.len() - count;
        let (head, tail) = self.segments.split_at(split);
        if !tail.iter().all(|s| matches!(s, Segment::Param(_))) {
            return false;
        }
        let head: Vec<&str> = head
            .iter()
            .map(|s| match s {
                Segment::Static(s) => s.as_str(),
                Segment::Param(_) => "",
            })
            .collect();
        head.iter().all(|s| !s.is_empty()) && head.join("/") == trim_path(path)
    }
}

/// In-memory route registry.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<RouteDefinition>,
    by_view: HashMap<ViewType, usize>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `view` at `template` with no declared parameter type or layouts.
    pub fn route(self, template: &str, view: impl Into<ViewType>) -> Self {
        self.route_with(RouteDefinition::new(template, view.into()))
    }

    /// Registers a route. Re-registering a template replaces the old entry.
    pub fn route_with(mut self, definition: RouteDefinition) -> Self {
        self.add(definition);
        self
    }

    pub fn add(&mut self, definition: RouteDefinition) {
        if let Some(index) = self
            .routes
            .iter()
            .position(|r| r.template == definition.template)
        {
            warn!(
                "Route '{}' re-registered: '{}' replaces '{}'",
                definition.template, definition.view, self.routes[index].view
            );
            self.routes[index] = definition;
            self.reindex();
            return;
        }
        debug!("Route '{}' -> {}", definition.template, definition.view);
        self.by_view
            .entry(definition.view.clone())
            .or_insert(self.routes.len());
        self.routes.push(definition);
    }

    /// Each view maps to its first registered template.
    fn reindex(&mut self) {
        self.by_view.clear();
        for (index, route) in self.routes.iter().enumerate() {
            self.by_view.entry(route.view.clone()).or_insert(index);
        }
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    fn definition(&self, target: &ViewType) -> Option<&RouteDefinition> {
        self.by_view.get(target).map(|&i| &self.routes[i])
    }
}

impl RouteRegistry for RouteTable {
    fn resolve_path(&self, path: &str, segments: &[String]) -> Option<ViewType> {
        self.routes
            .iter()
            .find(|r| r.accepts_trailing(path, segments.len()))
            .map(|r| r.view.clone())
    }

    fn resolve_target(
        &self,
        target: &ViewType,
        parameters: &RouteParameters,
    ) -> Option<NavigationState> {
        let definition = self.definition(target)?;
        let path = definition.build_path(parameters)?;
        Some(
            NavigationState::new(target.clone())
                .with_parameters(parameters.clone())
                .with_path(path),
        )
    }

    fn resolve_location(&self, location: &Location) -> Option<NavigationState> {
        self.routes.iter().find_map(|r| {
            r.capture(location.segments()).map(|parameters| {
                NavigationState::new(r.view.clone())
                    .with_parameters(parameters)
                    .with_path(location.path())
            })
        })
    }

    fn layouts(&self, target: &ViewType) -> Vec<ViewType> {
        self.definition(target)
            .map(|d| d.layouts.clone())
            .unwrap_or_default()
    }

    fn parameter_type(&self, target: &ViewType) -> Option<ParamType> {
        self.definition(target).and_then(|d| d.param_type)
    }

    fn parameter_names(&self, target: &ViewType) -> Vec<String> {
        self.definition(target)
            .map(|d| {
                d.segments
                    .iter()
                    .filter_map(|s| match s {
                        Segment::Param(name) => Some(name.clone()),
                        Segment::Static(_) => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
