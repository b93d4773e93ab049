//! helmsman - autonomous navigation controller for an unmanned surface
//! vessel.
//!
//! Reads a static JSON configuration, wires the navigation core to its
//! peripheral adapters and runs until interrupted. A config problem aborts
//! startup with a message on stderr; SIGINT shuts the subsystem tree down
//! gracefully.

mod adapters;
mod app;
mod config;
mod ipc;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use tokio_graceful_shutdown::{SubsystemBuilder, SubsystemHandle, Toplevel};

use crate::app::App;
use crate::config::Config;

const DEFAULT_CONFIG_FILE: &str = "/etc/ship-nav.conf";

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

fn parse_args(raw: &[String]) -> Result<PathBuf, String> {
    let mut config_file = PathBuf::from(DEFAULT_CONFIG_FILE);

    let mut i = 1;
    while i < raw.len() {
        match raw[i].as_str() {
            "-c" => {
                i += 1;
                let Some(path) = raw.get(i) else {
                    return Err("missing value for -c".to_string());
                };
                config_file = PathBuf::from(path);
            }
            other => return Err(format!("unknown argument '{other}'")),
        }
        i += 1;
    }

    Ok(config_file)
}

fn init_logging(configured_level: &str) {
    let level = match configured_level.parse() {
        Ok(level) => level,
        Err(_) => {
            eprintln!("invalid logLevel '{configured_level}', defaulting to info");
            log::LevelFilter::Info
        }
    };
    env_logger::Builder::new().filter_level(level).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let raw: Vec<String> = std::env::args().collect();
    let config_file = match parse_args(&raw) {
        Ok(path) => path,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("usage: helmsman [-c <config-file>]");
            return ExitCode::FAILURE;
        }
    };

    let config = match Config::load(&config_file) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to parse config file: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.log_level);
    log::info!("starting with config {}", config_file.display());

    let result = Toplevel::new(move |s: SubsystemHandle| async move {
        s.start(SubsystemBuilder::new("app", |handle| {
            App::new(config).run(handle)
        }));
    })
    .catch_signals()
    .handle_shutdown_requests(SHUTDOWN_TIMEOUT)
    .await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("shutdown finished with errors: {err}");
            ExitCode::FAILURE
        }
    }
}
