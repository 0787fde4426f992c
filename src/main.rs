//! `leaflet-embed` - render markdown map directives as placeholders

use clap::Parser;

use leaflet_embed::cli::args::Cli;
use leaflet_embed::cli::commands;
use leaflet_embed::error::ExitCode;
use leaflet_embed::observability::{LogSettings, init_logging};

fn main() {
    let cli = Cli::parse();

    init_logging(LogSettings::from(&cli));

    match commands::dispatch(cli) {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
