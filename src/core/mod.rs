//! # Core Navigation Logic
//!
//! Decides which view chain a session shows when its location changes. It
//! knows nothing about rendering or transport: views are opaque
//! `ViewType` tokens and activation is delegated to a `NavigationHandler`.
//!
//! ```text
//!               ┌──────────────────────────────┐
//!  Location ──► │           Router             │ ──► NavigationHandler
//!               │                              │       (activates views)
//!               │  leave phase → enter phase   │
//!               │  redirects · postponement    │
//!               └──────┬───────────────┬───────┘
//!                      │               │
//!             ┌────────▼─────┐  ┌──────▼──────────────┐
//!             │ RouteRegistry │  │ ErrorTargetResolver │
//!             │ (path ↔ view) │  │ (failure → view)    │
//!             └──────────────┘  └─────────────────────┘
//! ```
//!
//! All work for a session runs under its lock (`SessionGuard`).
//!
//! ## Modules
//!
//! - [`location`], [`params`]: requested locations, query and route parameters
//! - [`state`]: view tokens, navigation targets and requests
//! - [`registry`]: the `RouteRegistry` contract and an in-memory table
//! - [`error_target`]: failures and the views that present them
//! - [`event`]: before-leave and before-enter events, the redirect API
//! - [`continuation`]: postponed navigation tokens
//! - [`session`]: per-session lock and state
//! - [`handler`]: listener and navigation handler contracts
//! - [`router`]: the orchestrator
//! - [`config`]: TOML config with env/CLI overrides
//! - [`error`]: `NavigationError`

pub mod config;
pub mod continuation;
pub mod error;
pub mod error_target;
pub mod event;
pub mod handler;
pub mod location;
pub mod params;
pub mod registry;
pub mod router;
pub mod session;
pub mod state;

pub use error::NavigationError;
pub use router::{NavigationOutcome, Router};
