//! Logging setup for the `leaflet-embed` binary.
//!
//! Logs go to stderr so `render` output on stdout stays clean. Verbosity
//! flags only raise this crate's own level; dependencies (the markdown
//! parser, the metrics exporter) stay at `warn` unless
//! `LEAFLET_EMBED_LOG_LEVEL` says otherwise.

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

use crate::cli::args::{Cli, ColorChoice};

/// Environment variable holding an `EnvFilter` directive. Replaces the
/// flag-derived filter entirely when set.
pub const LOG_LEVEL_ENV: &str = "LEAFLET_EMBED_LOG_LEVEL";

/// Target name of this crate in filter directives.
const CRATE_TARGET: &str = "leaflet_embed";

/// Log line format on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Human,
    /// One flattened JSON object per event.
    Json,
}

/// Logging options taken from the global CLI flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSettings {
    pub format: LogFormat,
    pub verbosity: u8,
    pub color: ColorChoice,
    /// No subscriber is installed; errors still reach stderr via `main`.
    pub quiet: bool,
}

impl From<&Cli> for LogSettings {
    fn from(cli: &Cli) -> Self {
        Self {
            format: if cli.log_json {
                LogFormat::Json
            } else {
                LogFormat::Human
            },
            verbosity: cli.verbose,
            color: cli.color,
            quiet: cli.quiet,
        }
    }
}

/// Filter directive for a verbosity count.
///
/// `-v` info, `-vv` debug, `-vvv` trace for this crate only; `-vvvv` and
/// up also trace dependencies.
#[must_use]
pub fn default_directive(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        3 => "trace",
        _ => return "trace".to_string(),
    };
    format!("warn,{CRATE_TARGET}={level}")
}

/// Whether stderr output should carry ANSI colors.
#[must_use]
pub fn use_ansi(color: ColorChoice) -> bool {
    match color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => {
            std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
        }
    }
}

/// Installs the global subscriber described by `settings`.
///
/// Uses `try_init()`, so a second call is a no-op.
pub fn init_logging(settings: LogSettings) {
    if settings.quiet {
        return;
    }

    let filter = EnvFilter::try_from_env(LOG_LEVEL_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(settings.verbosity)));

    // Targets are only noise until someone is debugging.
    let show_target = settings.verbosity >= 2;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(show_target)
        .with_writer(std::io::stderr);

    let _ = match settings.format {
        LogFormat::Human => builder.with_ansi(use_ansi(settings.color)).try_init(),
        LogFormat::Json => builder
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .try_init(),
    };
}
