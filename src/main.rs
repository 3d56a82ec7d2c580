//! Beacon - status signals for concurrent coding agents

use std::io;
use std::process;

use beacon::cli::Cli;
use beacon::config::Config;
use beacon::logging;
use clap::Parser;

fn main() {
    logging::init();
    let cli = Cli::parse();
    let config = Config::load();

    let stdout = io::stdout();
    if let Err(e) = cli.run(&config, &mut stdout.lock()) {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("error: {}", e);
        process::exit(1);
    }
}
