//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.waypoint/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.
//! Besides router settings the file can declare the route table and the
//! error views, which the binary turns into a `RouteTable` and `ErrorViews`.
//!
//! Loading and resolution run before the logger exists, so both collect
//! `ConfigNotice`s for the caller to `emit()` once logging is installed.

use log::{Level, LevelFilter, log};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::error_target::{ErrorViews, FailureKind, default_status};
use crate::core::params::ParamType;
use crate::core::registry::{RouteDefinition, RouteTable};
use crate::core::router::DEFAULT_MAX_REDIRECTS;
use crate::core::state::ViewType;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct WaypointConfig {
    #[serde(default)]
    pub router: RouterConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
    #[serde(default)]
    pub error_views: Vec<ErrorViewEntry>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RouterConfig {
    pub max_redirects: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub log_file: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteEntry {
    pub path: String,
    pub view: String,
    pub param_type: Option<ParamType>,
    #[serde(default)]
    pub layouts: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorViewEntry {
    pub kind: String,
    pub view: String,
    pub status: Option<u16>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;
pub const DEFAULT_LOG_FILE: &str = "waypoint.log";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub max_redirects: usize,
    pub log_level: LevelFilter,
    pub log_file: PathBuf,
    pub routes: Vec<RouteEntry>,
    pub error_views: Vec<ErrorViewEntry>,
    pub notices: Vec<ConfigNotice>,
}

/// A config file plus what happened while finding it.
#[derive(Debug, Default)]
pub struct LoadedConfig {
    pub config: WaypointConfig,
    pub notices: Vec<ConfigNotice>,
}

/// A log record held back until the logger is installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigNotice {
    pub level: Level,
    pub message: String,
}

impl ConfigNotice {
    fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn emit(&self) {
        log!(self.level, "{}", self.message);
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid route '{path}': {reason}")]
    InvalidRoute { path: String, reason: String },
    #[error("invalid error view for '{kind}': {reason}")]
    InvalidErrorView { kind: String, reason: String },
}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.waypoint/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".waypoint").join("config.toml"))
}

/// Load config from `explicit`, or from `~/.waypoint/config.toml`.
///
/// A missing default file is generated (commented out) and yields
/// `WaypointConfig::default()`. A missing explicit file is an error.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let mut loaded = LoadedConfig::default();
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match config_path() {
            Some(p) => p,
            None => {
                loaded.notices.push(ConfigNotice::new(
                    Level::Warn,
                    "Could not determine home directory, using default config",
                ));
                return Ok(loaded);
            }
        },
    };

    if explicit.is_none() && !path.exists() {
        loaded.notices.push(ConfigNotice::new(
            Level::Info,
            format!("No config file found, generating default at {}", path.display()),
        ));
        if let Err(e) = generate_default_config(&path) {
            loaded.notices.push(ConfigNotice::new(
                Level::Warn,
                format!("Failed to write default config: {}", e),
            ));
        }
        return Ok(loaded);
    }

    let contents = fs::read_to_string(&path)?;
    loaded.config = parse_config(&contents)?;
    loaded.notices.push(ConfigNotice::new(
        Level::Info,
        format!("Loaded config from {}", path.display()),
    ));
    loaded.notices.push(ConfigNotice::new(
        Level::Debug,
        format!("Config: {:?}", loaded.config),
    ));
    Ok(loaded)
}

pub fn parse_config(contents: &str) -> Result<WaypointConfig, ConfigError> {
    Ok(toml::from_str(contents)?)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) -> std::io::Result<()> {
    let default_content = r#"# Waypoint Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [router]
# max_redirects = 10                 # Or set WAYPOINT_MAX_REDIRECTS

# [logging]
# level = "info"                     # Or set WAYPOINT_LOG_LEVEL
# log_file = "waypoint.log"

# [[routes]]
# path = ""
# view = "home"

# [[routes]]
# path = "users/:id"
# view = "user"
# param_type = "integer"             # "text", "integer", "long", "boolean"
# layouts = ["main"]

# [[error_views]]
# kind = "NotFound"
# view = "not-found"                 # status defaults to 404

# [[error_views]]
# kind = "Any"
# view = "error"
# status = 500
"#;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, default_content)
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_max_redirects` is from the CLI flag (None = not specified).
pub fn resolve(config: &WaypointConfig, cli_max_redirects: Option<usize>) -> ResolvedConfig {
    let mut notices = Vec::new();

    // Redirect bound: CLI → env → config → default
    let max_redirects = cli_max_redirects
        .or_else(|| env_parsed("WAYPOINT_MAX_REDIRECTS", &mut notices))
        .or(config.router.max_redirects)
        .unwrap_or(DEFAULT_MAX_REDIRECTS);

    // Log level: env → config → default
    let log_level = env_parsed::<LevelFilter>("WAYPOINT_LOG_LEVEL", &mut notices)
        .or_else(|| {
            let level = config.logging.level.as_deref()?;
            let parsed = level.parse::<LevelFilter>().ok();
            if parsed.is_none() {
                notices.push(ConfigNotice::new(
                    Level::Warn,
                    format!("Unknown log level '{}' in config", level),
                ));
            }
            parsed
        })
        .unwrap_or(DEFAULT_LOG_LEVEL);

    let log_file = config
        .logging
        .log_file
        .clone()
        .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string());

    ResolvedConfig {
        max_redirects,
        log_level,
        log_file: PathBuf::from(log_file),
        routes: config.routes.clone(),
        error_views: config.error_views.clone(),
        notices,
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str, notices: &mut Vec<ConfigNotice>) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            notices.push(ConfigNotice::new(
                Level::Warn,
                format!("Ignoring {}={:?}: not a valid value", name, raw),
            ));
            None
        }
    }
}

// ============================================================================
// Building collaborators
// ============================================================================

/// Builds the route table, in declaration order.
pub fn build_route_table(routes: &[RouteEntry]) -> Result<RouteTable, ConfigError> {
    let mut table = RouteTable::new();
    for entry in routes {
        let invalid = |reason: &str| ConfigError::InvalidRoute {
            path: entry.path.clone(),
            reason: reason.to_string(),
        };
        if entry.view.trim().is_empty() {
            return Err(invalid("view name is empty"));
        }
        if entry.param_type.is_some() && !entry.path.split('/').any(|s| s.starts_with(':')) {
            return Err(invalid("param_type given but the path has no :parameter"));
        }
        let mut definition = RouteDefinition::new(&entry.path, ViewType::new(&entry.view))
            .layouts(entry.layouts.iter().map(|l| ViewType::new(l)));
        if let Some(param_type) = entry.param_type {
            definition = definition.param_type(param_type);
        }
        table.add(definition);
    }
    Ok(table)
}

pub fn build_error_views(entries: &[ErrorViewEntry]) -> Result<ErrorViews, ConfigError> {
    let mut views = ErrorViews::new();
    for entry in entries {
        if entry.view.trim().is_empty() {
            return Err(ConfigError::InvalidErrorView {
                kind: entry.kind.clone(),
                reason: "view name is empty".to_string(),
            });
        }
        let kind = FailureKind::new(entry.kind.clone());
        let status = entry.status.unwrap_or_else(|| default_status(&kind));
        if !(100..=599).contains(&status) {
            return Err(ConfigError::InvalidErrorView {
                kind: entry.kind.clone(),
                reason: format!("status {status} is out of range"),
            });
        }
        views.add(kind, ViewType::new(&entry.view), status);
    }
    Ok(views)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error_target::{ErrorTargetResolver, Failure};
    use crate::core::location::Location;
    use crate::core::registry::RouteRegistry;

    #[test]
    fn test_default_config_is_empty() {
        let config = WaypointConfig::default();
        assert!(config.routes.is_empty());
        assert!(config.router.max_redirects.is_none());
    }

    #[test]
    fn test_generated_default_config_parses() {
        let dir = std::env::temp_dir().join(format!("waypoint-config-{}", uuid::Uuid::new_v4()));
        let path = dir.join("config.toml");
        generate_default_config(&path).unwrap();

        let loaded = load_config(Some(&path)).unwrap();
        assert!(loaded.config.routes.is_empty());
        assert!(loaded.config.error_views.is_empty());
        assert!(loaded.config.logging.level.is_none());
        assert_eq!(loaded.notices[0].level, Level::Info);
        assert!(loaded.notices[0].message.starts_with("Loaded config from"));
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_unknown_config_log_level_is_reported() {
        let config = WaypointConfig {
            logging: LoggingConfig {
                level: Some("chatty".to_string()),
                log_file: None,
            },
            ..Default::default()
        };
        let resolved = resolve(&config, Some(1));
        if std::env::var("WAYPOINT_LOG_LEVEL").is_err() {
            assert_eq!(resolved.log_level, DEFAULT_LOG_LEVEL);
            assert_eq!(
                resolved.notices,
                [ConfigNotice::new(
                    Level::Warn,
                    "Unknown log level 'chatty' in config"
                )]
            );
        }
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = WaypointConfig {
            router: RouterConfig {
                max_redirects: Some(4),
            },
            logging: LoggingConfig {
                level: None,
                log_file: Some("nav.log".to_string()),
            },
            ..Default::default()
        };
        let resolved = resolve(&config, None);
        assert_eq!(resolved.log_file, PathBuf::from("nav.log"));
        if std::env::var("WAYPOINT_MAX_REDIRECTS").is_err() {
            assert_eq!(resolved.max_redirects, 4);
        }
    }

    #[test]
    fn test_resolve_cli_max_redirects_wins() {
        let config = WaypointConfig {
            router: RouterConfig {
                max_redirects: Some(4),
            },
            ..Default::default()
        };
        let resolved = resolve(&config, Some(2));
        assert_eq!(resolved.max_redirects, 2);
    }

    #[test]
    fn test_resolve_defaults() {
        let resolved = resolve(&WaypointConfig::default(), Some(DEFAULT_MAX_REDIRECTS));
        assert_eq!(resolved.max_redirects, 10);
        assert_eq!(resolved.log_file, PathBuf::from(DEFAULT_LOG_FILE));
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
[router]
max_redirects = 5

[logging]
level = "debug"

[[routes]]
path = ""
view = "home"

[[routes]]
path = "users/:id"
view = "user"
param_type = "integer"
layouts = ["main"]

[[error_views]]
kind = "NotFound"
view = "not-found"

[[error_views]]
kind = "Any"
view = "error"
status = 503
"#;
        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.router.max_redirects, Some(5));
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.routes[1].param_type, Some(ParamType::Integer));
        assert_eq!(config.routes[1].layouts, ["main"]);
        assert_eq!(config.error_views[0].status, None);

        let table = build_route_table(&config.routes).unwrap();
        let state = table.resolve_location(&Location::new("users/9")).unwrap();
        assert_eq!(state.target().name(), "user");
        assert_eq!(table.layouts(&"user".into()), vec!["main".into()]);

        let views = build_error_views(&config.error_views).unwrap();
        assert_eq!(views.resolve(&Failure::not_found("x")).unwrap().status, 404);
        assert_eq!(views.resolve(&Failure::internal("x")).unwrap().status, 503);
    }

    #[test]
    fn test_sparse_toml_parses() {
        let config = parse_config("[router]\nmax_redirects = 3\n").unwrap();
        assert_eq!(config.router.max_redirects, Some(3));
        assert!(config.logging.level.is_none());
        assert!(config.error_views.is_empty());
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = parse_config("[router\nmax_redirects = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_param_type_without_parameter_is_rejected() {
        let routes = vec![RouteEntry {
            path: "about".to_string(),
            view: "about".to_string(),
            param_type: Some(ParamType::Integer),
            layouts: Vec::new(),
        }];
        let err = build_route_table(&routes).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRoute { ref path, .. } if path == "about"));
    }

    #[test]
    fn test_bad_error_view_status_is_rejected() {
        let entries = vec![ErrorViewEntry {
            kind: "Any".to_string(),
            view: "error".to_string(),
            status: Some(42),
        }];
        assert!(matches!(
            build_error_views(&entries),
            Err(ConfigError::InvalidErrorView { .. })
        ));
    }

    #[test]
    fn test_missing_explicit_file_is_io_error() {
        let err = load_config(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
