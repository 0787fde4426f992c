//! Map directive parsing.
//!
//! A map directive is the YAML payload of a fenced code block such as:
//!
//! ~~~text
//! ```leaflet
//! id: world
//! image: [[World Map.png]]
//! height: 600px
//! lat: 0.5
//! long: 50
//! minZoom: 5
//! maxZoom: 12
//! defaultZoom: 8
//! scale: 2
//! unit: km
//! ```
//! ~~~
//!
//! Parsing is lenient field by field: a malformed value becomes "unset"
//! instead of failing the block. Only a payload that is not a YAML mapping
//! at all is rejected.

pub mod path;
pub mod value;

use rand::Rng;
use serde_yaml::{Mapping, Value};

use crate::config::schema::{DEFAULT_ASSET_ROOT, DEFAULT_HEIGHT, EmbedConfig};
use crate::error::DirectiveError;

pub use path::sanitize_image_path;
pub use value::{coerce_number, extract_image_reference};

/// Exclusive upper bound of generated directive ids.
pub const GENERATED_ID_RANGE: u32 = 10_000;

/// Settings applied while parsing a directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveOptions {
    /// Prefix for relative image paths.
    pub asset_root: String,

    /// Height used when the directive declares none.
    pub default_height: String,
}

impl Default for DirectiveOptions {
    fn default() -> Self {
        Self {
            asset_root: DEFAULT_ASSET_ROOT.to_string(),
            default_height: DEFAULT_HEIGHT.to_string(),
        }
    }
}

impl From<&EmbedConfig> for DirectiveOptions {
    fn from(config: &EmbedConfig) -> Self {
        Self {
            asset_root: config.asset_root.clone(),
            default_height: config.default_height.clone(),
        }
    }
}

/// A parsed and normalized map directive.
#[derive(Debug, Clone, PartialEq)]
pub struct MapDirective {
    /// DOM-local identifier. Not guaranteed unique.
    pub id: String,
    /// Sanitized image URL; empty when nothing resolved.
    pub image_path: String,
    /// CSS height of the map container.
    pub height: String,
    /// Vertical center coordinate, in any of the accepted encodings.
    pub lat: Option<f64>,
    /// Horizontal center coordinate, in any of the accepted encodings.
    pub long: Option<f64>,
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
    pub default_zoom: Option<f64>,
    /// Multiplier on the image's pixel dimensions. Always positive.
    pub scale: Option<f64>,
    /// Free-text distance unit label.
    pub unit: Option<String>,
}

impl MapDirective {
    /// Parses a directive from the raw body of a fenced code block.
    ///
    /// # Errors
    ///
    /// Returns [`DirectiveError::Yaml`] for malformed YAML and
    /// [`DirectiveError::NotAMapping`] when the payload is a scalar,
    /// sequence, or empty document.
    pub fn parse(source: &str, options: &DirectiveOptions) -> Result<Self, DirectiveError> {
        if source.trim().is_empty() {
            return Err(DirectiveError::NotAMapping {
                found: kind_name(&Value::Null),
            });
        }
        match serde_yaml::from_str::<Value>(source)? {
            Value::Mapping(fields) => Ok(Self::from_mapping(&fields, options)),
            other => Err(DirectiveError::NotAMapping {
                found: kind_name(&other),
            }),
        }
    }

    fn from_mapping(fields: &Mapping, options: &DirectiveOptions) -> Self {
        let get = |key: &str| fields.get(key);
        let number = |key: &str| get(key).and_then(coerce_number);

        let id = get("id")
            .and_then(value::scalar_text)
            .unwrap_or_else(generate_id);

        let image_path = get("image").map_or_else(String::new, |raw| {
            sanitize_image_path(&extract_image_reference(raw), &options.asset_root)
        });

        let height = get("height")
            .and_then(|h| match h {
                Value::Number(n) => Some(format!("{n}px")),
                other => value::scalar_text(other),
            })
            .unwrap_or_else(|| options.default_height.clone());

        Self {
            id,
            image_path,
            height,
            lat: number("lat"),
            long: number("long"),
            min_zoom: number("minZoom"),
            max_zoom: number("maxZoom"),
            default_zoom: number("defaultZoom"),
            scale: number("scale").filter(|s| *s > 0.0),
            unit: get("unit").and_then(value::scalar_text),
        }
    }

    /// Whether the directive resolved an image and can become a map.
    #[must_use]
    pub fn is_renderable(&self) -> bool {
        !self.image_path.is_empty()
    }
}

fn generate_id() -> String {
    rand::rng().random_range(0..GENERATED_ID_RANGE).to_string()
}

const fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "an empty document",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
