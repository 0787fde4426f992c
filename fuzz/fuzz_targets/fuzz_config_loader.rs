#![no_main]

use libfuzzer_sys::fuzz_target;
use leaflet_embed::config::{ConfigLoader, LoaderOptions};

fuzz_target!(|data: &[u8]| {
    if let Ok(yaml_str) = std::str::from_utf8(data) {
        let loader = ConfigLoader::new(LoaderOptions {
            apply_env: false,
            ..LoaderOptions::default()
        });
        let _ = loader.load_from_str(yaml_str, std::path::Path::new("fuzz.yaml"));
    }
});
