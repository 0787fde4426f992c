//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod check;
pub mod completions;
pub mod render;
pub mod version;

use std::path::Path;

use crate::cli::args::{Cli, Commands};
use crate::config::loader::{ConfigLoader, LoaderOptions};
use crate::config::schema::EmbedConfig;
use crate::error::EmbedError;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub fn dispatch(cli: Cli) -> Result<(), EmbedError> {
    match cli.command {
        Commands::Render(args) => render::run(&args),
        Commands::Check(args) => check::run(&args),
        Commands::Completions(args) => {
            completions::run(&args);
            Ok(())
        }
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}

/// Loads the configuration file, or the defaults when none is given.
///
/// Loader warnings are logged, not returned.
pub(crate) fn load_config(path: Option<&Path>) -> Result<EmbedConfig, EmbedError> {
    let loader = ConfigLoader::new(LoaderOptions::default());
    let load_result = match path {
        Some(path) => {
            tracing::info!(config = %path.display(), "loading configuration");
            loader.load(path)?
        }
        None => loader.load_defaults()?,
    };

    for warning in &load_result.warnings {
        tracing::warn!(
            location = warning.location.as_deref().unwrap_or("<unknown>"),
            "{}",
            warning.message
        );
    }

    Ok(load_result.config)
}
