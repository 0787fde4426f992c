//! Configuration module
//!
//! Loads and validates the settings shared by the markdown transform
//! (asset root, directive languages, default height) and the map
//! initializer (library URLs).

pub mod loader;
pub mod schema;

pub use loader::{ConfigLoader, LoadResult, LoadWarning, LoaderOptions};
pub use schema::*;
