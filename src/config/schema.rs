//! Configuration schema.
//!
//! Every field has a default so an absent or partial configuration file
//! still yields a working setup.

use serde::{Deserialize, Serialize};

/// Pinned Leaflet script served from unpkg.
pub const DEFAULT_SCRIPT_URL: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";

/// Pinned Leaflet stylesheet served from unpkg.
pub const DEFAULT_STYLESHEET_URL: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";

/// Public prefix that relative image paths are rooted under.
pub const DEFAULT_ASSET_ROOT: &str = "/_Assets";

/// Height used when a directive declares none.
pub const DEFAULT_HEIGHT: &str = "500px";

/// Code block language tag that marks a map directive.
pub const DEFAULT_LANGUAGE: &str = "leaflet";

/// Top-level configuration for the transform and the initializer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmbedConfig {
    /// Prefix for sanitized relative image paths.
    pub asset_root: String,

    /// Fenced code block languages recognized as map directives.
    pub languages: Vec<String>,

    /// Placeholder height when a directive omits `height`.
    pub default_height: String,

    /// Where the initializer fetches the mapping library from.
    pub library: LibrarySource,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            asset_root: DEFAULT_ASSET_ROOT.to_string(),
            languages: vec![DEFAULT_LANGUAGE.to_string()],
            default_height: DEFAULT_HEIGHT.to_string(),
            library: LibrarySource::default(),
        }
    }
}

/// Script and stylesheet URLs of the mapping library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LibrarySource {
    /// Library script URL.
    pub script_url: String,

    /// Library stylesheet URL.
    pub stylesheet_url: String,
}

impl Default for LibrarySource {
    fn default() -> Self {
        Self {
            script_url: DEFAULT_SCRIPT_URL.to_string(),
            stylesheet_url: DEFAULT_STYLESHEET_URL.to_string(),
        }
    }
}
