//! Error types for `leaflet-embed`
//!
//! One hierarchy covers the build-time side (configuration, directive
//! parsing, file I/O) and the runtime side (per-placeholder setup). Every
//! top-level error maps onto a CLI exit code.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `leaflet-embed` CLI operations.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Directive error (malformed map payload under `--strict`)
    pub const DIRECTIVE_ERROR: i32 = 4;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `leaflet-embed` operations.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Strict mode found blocks that could not be rendered
    #[error("{failed} map directive(s) failed to parse in {path}")]
    StrictFailure {
        /// File containing the failed blocks
        path: PathBuf,
        /// Number of blocks left unrendered
        failed: usize,
    },

    /// Invalid combination of arguments
    #[error("usage error: {0}")]
    Usage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EmbedError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => ExitCode::CONFIG_ERROR,
            Self::StrictFailure { .. } => ExitCode::DIRECTIVE_ERROR,
            Self::Usage(_) => ExitCode::USAGE_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
            Self::Json(_) => ExitCode::ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Configuration file could not be read
    #[error("cannot read {path}: {source}")]
    Unreadable {
        /// Path to the configuration file
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// Configuration file exceeds the size limit
    #[error("{path} is {size} bytes (limit: {limit})")]
    TooLarge {
        /// Path to the configuration file
        path: PathBuf,
        /// Actual size in bytes
        size: u64,
        /// Configured limit in bytes
        limit: u64,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },
}

// ============================================================================
// Directive Errors
// ============================================================================

/// Failure to read a map directive payload.
///
/// These never abort a document: the transform logs them and leaves the
/// offending block in place.
#[derive(Debug, Error)]
pub enum DirectiveError {
    /// Payload is not valid YAML
    #[error("invalid directive payload: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Payload parsed but is not a key-value mapping
    #[error("directive payload must be a mapping, found {found}")]
    NotAMapping {
        /// YAML kind that was found instead
        found: &'static str,
    },
}

// ============================================================================
// Runtime Setup Errors
// ============================================================================

/// Per-placeholder setup failure in the map initializer.
///
/// `Clone` so a single library load failure can be handed to every
/// placeholder waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    /// Library script or stylesheet failed to load
    #[error("failed to load map library from {url}")]
    LibraryLoad {
        /// Script URL that failed
        url: String,
    },

    /// Script loaded but did not register the library global
    #[error("map library script loaded but the library is unavailable")]
    LibraryMissing,

    /// Map image failed to load
    #[error("failed to load map image: {url}")]
    ImageLoad {
        /// Image URL that failed
        url: String,
    },

    /// Map image loaded with a zero width or height
    #[error("unable to determine image dimensions for {url}")]
    ImageDimensions {
        /// Image URL that was decoded
        url: String,
    },

    /// The map library rejected the container
    #[error("map construction failed: {0}")]
    Construction(String),
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `leaflet-embed` operations.
pub type Result<T> = std::result::Result<T, EmbedError>;

// ============================================================================
// Tests
// ============================================================================
