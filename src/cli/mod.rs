//! Process entry for the wrapper
//!
//! Loads configuration, sets up logging, runs the pipeline and turns the
//! collected errors into stderr diagnostics and an exit code.

use std::ffi::OsString;
use std::io::IsTerminal;
use std::process::ExitCode;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{load_config, Config};
use crate::error::Report;
use crate::pipeline;

const DIAGNOSTIC_PREFIX: &str = "[helm-spruce] Error:";

fn init_logging(config: &Config) {
    // stdout belongs to the wrapped binary; logs only ever go to stderr.
    // The directive was checked when the config was loaded.
    let filter = EnvFilter::new(&config.log);
    let layer =
        fmt::layer().with_writer(std::io::stderr).with_ansi(std::io::stderr().is_terminal());
    let _ = tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init();
}

pub fn run_with_args(argv: Vec<OsString>) -> Report<()> {
    let config = match load_config() {
        Ok(config) => config,
        Err(err) => return Report::failed(err),
    };
    init_logging(&config);
    tracing::debug!(?config, "loaded configuration");

    pipeline::run(argv, &config)
}

pub fn run() -> ExitCode {
    let report = run_with_args(std::env::args_os().collect());
    for err in report.errors() {
        eprintln!("{DIAGNOSTIC_PREFIX} {err}");
    }
    ExitCode::from(report.exit_code())
}
