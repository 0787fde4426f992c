//! Configuration loader
//!
//! Loading pipeline:
//! 1. Size check and read (UTF-8 BOM stripped)
//! 2. YAML parsing into [`EmbedConfig`]
//! 3. Environment overrides
//! 4. Validation

use std::path::Path;

use crate::config::schema::EmbedConfig;
use crate::error::ConfigError;

/// Environment variable overriding [`EmbedConfig::asset_root`].
pub const ENV_ASSET_ROOT: &str = "LEAFLET_EMBED_ASSET_ROOT";

/// Environment variable overriding [`EmbedConfig::default_height`].
pub const ENV_DEFAULT_HEIGHT: &str = "LEAFLET_EMBED_DEFAULT_HEIGHT";

/// Options for the configuration loader.
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Maximum configuration file size in bytes.
    pub max_config_size: u64,

    /// Whether `LEAFLET_EMBED_*` variables override file values.
    pub apply_env: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            max_config_size: env_or("LEAFLET_EMBED_MAX_CONFIG_SIZE", 1024 * 1024),
            apply_env: true,
        }
    }
}

/// Result of loading a configuration file.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated configuration.
    pub config: EmbedConfig,

    /// Warnings encountered during loading.
    pub warnings: Vec<LoadWarning>,
}

/// Warning during configuration loading.
#[derive(Debug, Clone)]
pub struct LoadWarning {
    /// Warning message.
    pub message: String,

    /// Field the warning refers to.
    pub location: Option<String>,
}

/// Configuration loader.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: LoaderOptions,
}

impl ConfigLoader {
    /// Creates a new configuration loader with the given options.
    #[must_use]
    pub const fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, exceeds the size limit,
    /// is not valid YAML for the schema, or fails validation.
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        if metadata.len() > self.options.max_config_size {
            return Err(ConfigError::TooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                limit: self.options.max_config_size,
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(&raw);

        self.load_from_str(raw, path)
    }

    /// Loads configuration from an in-memory YAML string.
    ///
    /// `origin` is only used for error messages. An empty document yields
    /// the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error on YAML or validation failure.
    pub fn load_from_str(&self, raw: &str, origin: &Path) -> Result<LoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let mut config: EmbedConfig = if raw.trim().is_empty() {
            warnings.push(LoadWarning {
                message: "configuration file is empty, using defaults".to_string(),
                location: None,
            });
            EmbedConfig::default()
        } else {
            serde_yaml::from_str(raw).map_err(|e| ConfigError::ParseError {
                path: origin.to_path_buf(),
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?
        };

        if self.options.apply_env {
            apply_env_overrides(&mut config);
        }

        normalize(&mut config);
        validate(&config, &mut warnings)?;

        Ok(LoadResult { config, warnings })
    }

    /// Returns the defaults with environment overrides applied.
    ///
    /// # Errors
    ///
    /// Returns an error if an override produces an invalid configuration.
    pub fn load_defaults(&self) -> Result<LoadResult, ConfigError> {
        let mut config = EmbedConfig::default();
        if self.options.apply_env {
            apply_env_overrides(&mut config);
        }
        let mut warnings = Vec::new();
        normalize(&mut config);
        validate(&config, &mut warnings)?;
        Ok(LoadResult { config, warnings })
    }
}

fn apply_env_overrides(config: &mut EmbedConfig) {
    if let Ok(root) = std::env::var(ENV_ASSET_ROOT) {
        tracing::debug!(asset_root = %root, "asset root overridden from environment");
        config.asset_root = root;
    }
    if let Ok(height) = std::env::var(ENV_DEFAULT_HEIGHT) {
        tracing::debug!(height = %height, "default height overridden from environment");
        config.default_height = height;
    }
}

/// Trims language tags and drops blank ones, so the stored tags are the
/// ones the transform compares against info strings.
fn normalize(config: &mut EmbedConfig) {
    config.languages = config
        .languages
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
}

fn validate(config: &EmbedConfig, warnings: &mut Vec<LoadWarning>) -> Result<(), ConfigError> {
    let languages = &config.languages;
    if languages.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "languages".to_string(),
            value: "[]".to_string(),
            expected: "at least one non-empty language tag".to_string(),
        });
    }
    if let Some(bad) = languages.iter().find(|l| l.contains(char::is_whitespace)) {
        return Err(ConfigError::InvalidValue {
            field: "languages".to_string(),
            value: bad.clone(),
            expected: "a single info-string token".to_string(),
        });
    }

    if config.default_height.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "default_height".to_string(),
            value: config.default_height.clone(),
            expected: "a CSS length such as 500px".to_string(),
        });
    }

    for (field, url) in [
        ("library.script_url", &config.library.script_url),
        ("library.stylesheet_url", &config.library.stylesheet_url),
    ] {
        if !is_fetchable_url(url) {
            return Err(ConfigError::InvalidValue {
                field: field.to_string(),
                value: url.clone(),
                expected: "an http(s) or protocol-relative URL".to_string(),
            });
        }
        if url.starts_with("http://") {
            warnings.push(LoadWarning {
                message: format!("{url} is served over plain HTTP"),
                location: Some(field.to_string()),
            });
        }
    }

    if config.asset_root.trim().is_empty() {
        warnings.push(LoadWarning {
            message: "asset_root is empty, relative images resolve against the page".to_string(),
            location: Some("asset_root".to_string()),
        });
    }

    Ok(())
}

fn is_fetchable_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://") || url.starts_with("//")
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
