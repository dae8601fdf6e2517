use clap::Parser;
use log::{error, info};
use serde::Serialize;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use waypoint::core::config::{self, ResolvedConfig};
use waypoint::core::error_target::Failure;
use waypoint::core::handler::{NavigationSummary, ResolvedNavigation};
use waypoint::core::location::Location;
use waypoint::core::session::Session;
use waypoint::core::state::NavigationTrigger;
use waypoint::core::{NavigationOutcome, Router};

#[derive(Parser)]
#[command(
    name = "waypoint",
    about = "Replay navigations against a configured route table"
)]
struct Args {
    /// Config file (defaults to ~/.waypoint/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print one JSON object per navigation
    #[arg(long)]
    json: bool,

    /// Also log to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Maximum forward/reroute hops per navigation
    #[arg(long)]
    max_redirects: Option<usize>,

    /// Locations to navigate to, in order, within one session
    #[arg(required = true)]
    paths: Vec<String>,
}

#[derive(Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
enum Report {
    Activated(NavigationSummary),
    Postponed { continuation: String },
    External { url: String },
    Failed { requested: String, error: String },
}

fn init_logging(resolved: &ResolvedConfig, verbose: bool) {
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    if let Ok(log_file) = File::create(&resolved.log_file) {
        loggers.push(WriteLogger::new(
            resolved.log_level,
            log_config.clone(),
            log_file,
        ));
    }
    if verbose {
        loggers.push(TermLogger::new(
            resolved.log_level,
            log_config,
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ));
    }
    let _ = CombinedLogger::init(loggers);
}

fn run(args: Args) -> Result<bool, Box<dyn std::error::Error>> {
    let loaded = config::load_config(args.config.as_deref())?;
    let resolved = config::resolve(&loaded.config, args.max_redirects);
    init_logging(&resolved, args.verbose);
    for notice in loaded.notices.iter().chain(&resolved.notices) {
        notice.emit();
    }

    let routes = config::build_route_table(&resolved.routes)?;
    let errors = config::build_error_views(&resolved.error_views)?;
    info!(
        "Waypoint starting with {} route(s), max {} redirect(s)",
        routes.len(),
        resolved.max_redirects
    );

    let handler = |navigation: &ResolvedNavigation| -> Result<(), Failure> {
        info!(
            "Activating {} (layouts: {:?})",
            navigation.target(),
            navigation.layouts
        );
        Ok(())
    };
    let router = Router::builder(Arc::new(routes), Arc::new(errors), Arc::new(handler))
        .max_redirects(resolved.max_redirects)
        .build();

    let session = Session::new();
    let mut all_ok = true;
    for (index, path) in args.paths.iter().enumerate() {
        let trigger = if index == 0 {
            NavigationTrigger::PageLoad
        } else {
            NavigationTrigger::RouterLink
        };
        let mut guard = session.lock();
        let report = match router.navigate(&mut guard, Location::new(path), trigger) {
            Ok(NavigationOutcome::Activated(navigation)) => Report::Activated(navigation.summary()),
            Ok(NavigationOutcome::Postponed(action)) => Report::Postponed {
                continuation: action.id().to_string(),
            },
            Ok(NavigationOutcome::External(url)) => Report::External { url },
            Err(e) => {
                error!("Navigation to {} failed: {}", path, e);
                all_ok = false;
                Report::Failed {
                    requested: path.clone(),
                    error: e.to_string(),
                }
            }
        };
        print_report(&report, args.json)?;
    }
    Ok(all_ok)
}

fn print_report(report: &Report, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string(report)?);
        return Ok(());
    }
    match report {
        Report::Activated(summary) => {
            let mut line = format!(
                "{} -> {} at /{} ({})",
                summary.requested, summary.target, summary.visible_location, summary.status
            );
            if let Some(message) = &summary.error {
                line.push_str(&format!(": {message}"));
            }
            println!("{line}");
        }
        Report::Postponed { continuation } => println!("postponed ({continuation})"),
        Report::External { url } => println!("external -> {url}"),
        Report::Failed { requested, error } => println!("{requested} failed: {error}"),
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("waypoint: {e}");
            ExitCode::FAILURE
        }
    }
}
