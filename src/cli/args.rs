//! CLI argument definitions
//!
//! All Clap derive structs for `leaflet-embed` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

// ============================================================================
// Root CLI
// ============================================================================

/// Render markdown map directives as Leaflet image-map placeholders.
#[derive(Parser, Debug)]
#[command(name = "leaflet-embed", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "LEAFLET_EMBED_COLOR")]
    pub color: ColorChoice,

    /// Emit logs as newline-delimited JSON.
    #[arg(long, global = true)]
    pub log_json: bool,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replace map directives in markdown files with placeholders.
    Render(RenderArgs),

    /// Report map directive outcomes without writing anything.
    Check(CheckArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

// ============================================================================
// Render / Check
// ============================================================================

/// Arguments for `render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Markdown files to transform.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Directory to write transformed files into. Required for more than
    /// one input; a single input is written to stdout otherwise.
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Output document format.
    #[arg(short, long, default_value = "markdown")]
    pub format: DocumentFormat,

    /// Path to YAML configuration file.
    #[arg(short, long, env = "LEAFLET_EMBED_CONFIG")]
    pub config: Option<PathBuf>,

    /// Fail when any directive cannot be parsed.
    #[arg(long)]
    pub strict: bool,

    /// Print directive metrics in Prometheus text format to stderr.
    #[arg(long)]
    pub metrics: bool,
}

/// Arguments for `check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Markdown files to check.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Path to YAML configuration file.
    #[arg(short, long, env = "LEAFLET_EMBED_CONFIG")]
    pub config: Option<PathBuf>,
}

// ============================================================================
// Completions / Version
// ============================================================================

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    pub shell: Shell,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Format of transformed documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DocumentFormat {
    /// Markdown with placeholders spliced in.
    #[default]
    Markdown,
    /// Rendered HTML.
    Html,
}

impl DocumentFormat {
    /// File extension for written output.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Html => "html",
        }
    }
}

/// Shell type for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// `PowerShell`.
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell.
    Elvish,
}

// ============================================================================
// Tests
// ============================================================================
