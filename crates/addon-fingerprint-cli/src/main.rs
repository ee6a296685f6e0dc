#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod logging;
mod report;

use addon_fingerprint_core::Config;
use clap::Parser;
use miette::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "addon-fingerprint")]
#[command(author, version, about = "Fingerprint the native addons installed in a Node project", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long)]
    json: bool,

    /// Also print each addon identity, one per line
    #[arg(long)]
    list: bool,

    /// Project directory to fingerprint (defaults to the working directory)
    #[arg(long, value_name = "PATH", env = "ADDON_FINGERPRINT_CWD")]
    cwd: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let config = Config::new(cwd)
        .with_verbosity(cli.verbose)
        .with_json_logs(cli.json);

    logging::init(config.verbosity, config.json_logs);

    let span = tracing::info_span!("fingerprint", cwd = %config.cwd.display());
    let _guard = span.enter();

    report::run(&config, cli.list, cli.json)
}
