//! `leaflet-embed` - image maps in markdown
//!
//! Turns fenced `leaflet` code blocks holding a YAML map description into
//! placeholder `div`s, and drives a Leaflet-style mapping library to turn
//! those placeholders into zoomable image maps once a page is loaded.

pub mod cli;
pub mod config;
pub mod directive;
pub mod error;
pub mod markup;
pub mod observability;
pub mod runtime;
pub mod transform;
