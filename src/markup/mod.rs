//! Placeholder markup.
//!
//! The placeholder element is the only contract between the build-time
//! transform and the in-page initializer: every normalized directive field
//! travels as a string attribute, and only resolved fields are emitted.

pub mod escape;

use std::fmt::Write as _;

use crate::directive::MapDirective;

pub use escape::{escape_attribute, slugify_id};

/// Attribute names shared by the transform and the initializer.
pub mod attr {
    pub const ID: &str = "id";
    pub const CLASS: &str = "class";
    pub const STYLE: &str = "style";
    pub const IMAGE: &str = "data-leaflet-image";
    pub const LAT: &str = "data-leaflet-lat";
    pub const LONG: &str = "data-leaflet-long";
    pub const MIN_ZOOM: &str = "data-leaflet-min-zoom";
    pub const MAX_ZOOM: &str = "data-leaflet-max-zoom";
    pub const DEFAULT_ZOOM: &str = "data-leaflet-default-zoom";
    pub const SCALE: &str = "data-leaflet-scale";
    pub const UNIT: &str = "data-leaflet-unit";
    /// Runtime-only initialization state; never emitted by the transform.
    pub const INIT: &str = "data-leaflet-init";
}

/// Class that flags an element as a map placeholder.
pub const PLACEHOLDER_CLASS: &str = "leaflet-map";

/// Prefix of generated element ids.
pub const ID_PREFIX: &str = "leaflet-map-";

/// A placeholder element ready to be serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    attributes: Vec<(&'static str, String)>,
}

impl Placeholder {
    /// Builds the placeholder for a parsed directive.
    ///
    /// Attribute order is fixed: `id`, `class`, `style`, then the data
    /// attributes in declaration order.
    #[must_use]
    pub fn from_directive(directive: &MapDirective) -> Self {
        let mut attributes = vec![
            (attr::ID, format!("{ID_PREFIX}{}", slugify_id(&directive.id))),
            (attr::CLASS, PLACEHOLDER_CLASS.to_string()),
            (attr::STYLE, format!("height:{};width:100%;", directive.height)),
        ];

        if directive.is_renderable() {
            attributes.push((attr::IMAGE, directive.image_path.clone()));
        }

        let numeric = [
            (attr::LAT, directive.lat),
            (attr::LONG, directive.long),
            (attr::MIN_ZOOM, directive.min_zoom),
            (attr::MAX_ZOOM, directive.max_zoom),
            (attr::DEFAULT_ZOOM, directive.default_zoom),
            (attr::SCALE, directive.scale),
        ];
        for (name, value) in numeric {
            if let Some(v) = value {
                attributes.push((name, v.to_string()));
            }
        }

        if let Some(unit) = &directive.unit {
            attributes.push((attr::UNIT, unit.clone()));
        }

        Self { attributes }
    }

    /// Looks up an attribute value by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// All attributes in emission order.
    #[must_use]
    pub fn attributes(&self) -> &[(&'static str, String)] {
        &self.attributes
    }

    /// Serializes the placeholder as a single-line `div`.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = String::from("<div");
        for (name, value) in &self.attributes {
            let _ = write!(html, " {name}=\"{}\"", escape_attribute(value));
        }
        html.push_str("></div>");
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::DirectiveOptions;

    fn placeholder(src: &str) -> Placeholder {
        let directive = MapDirective::parse(src, &DirectiveOptions::default()).unwrap();
        Placeholder::from_directive(&directive)
    }

    #[test]
    fn test_image_only_emits_minimal_attributes() {
        let p = placeholder("id: w\nimage: map.png\n");
        let names: Vec<&str> = p.attributes().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec![attr::ID, attr::CLASS, attr::STYLE, attr::IMAGE]);
        assert_eq!(p.attribute(attr::ID), Some("leaflet-map-w"));
        assert_eq!(p.attribute(attr::STYLE), Some("height:500px;width:100%;"));
        assert_eq!(p.attribute(attr::IMAGE), Some("/_Assets/map.png"));
    }

    #[test]
    fn test_full_attribute_set_in_order() {
        let p = placeholder(
            "id: w\nimage: m.png\nlat: 0.5\nlong: -20\nminZoom: 5\nmaxZoom: 12\n\
             defaultZoom: 8\nscale: 1.5\nunit: mi\n",
        );
        let names: Vec<&str> = p.attributes().iter().map(|(n, _)| *n).collect();
        assert_eq!(
            names,
            vec![
                attr::ID,
                attr::CLASS,
                attr::STYLE,
                attr::IMAGE,
                attr::LAT,
                attr::LONG,
                attr::MIN_ZOOM,
                attr::MAX_ZOOM,
                attr::DEFAULT_ZOOM,
                attr::SCALE,
                attr::UNIT,
            ]
        );
        assert_eq!(p.attribute(attr::LAT), Some("0.5"));
        assert_eq!(p.attribute(attr::LONG), Some("-20"));
        assert_eq!(p.attribute(attr::MIN_ZOOM), Some("5"));
        assert_eq!(p.attribute(attr::SCALE), Some("1.5"));
        assert_eq!(p.attribute(attr::UNIT), Some("mi"));
        assert_eq!(p.attribute(attr::INIT), None);
    }

    #[test]
    fn test_missing_image_has_no_image_attribute() {
        let p = placeholder("id: w\nimage: '/'\nlat: 10\n");
        assert_eq!(p.attribute(attr::IMAGE), None);
        assert_eq!(p.attribute(attr::LAT), Some("10"));
    }

    #[test]
    fn test_to_html_escapes_values() {
        let p = placeholder("id: w\nimage: m.png\nheight: '1px\" onmouseover=\"x'\n");
        let html = p.to_html();
        assert!(html.starts_with("<div id=\"leaflet-map-w\" class=\"leaflet-map\""));
        assert!(html.contains("style=\"height:1px&quot; onmouseover=&quot;x;width:100%;\""));
        assert!(html.ends_with("></div>"));
        assert!(!html.contains('\n'));
    }
}
