#![no_main]

use libfuzzer_sys::fuzz_target;
use leaflet_embed::directive::{DirectiveOptions, MapDirective};
use leaflet_embed::markup::Placeholder;

fuzz_target!(|data: &[u8]| {
    if let Ok(source) = std::str::from_utf8(data) {
        if let Ok(directive) = MapDirective::parse(source, &DirectiveOptions::default()) {
            let html = Placeholder::from_directive(&directive).to_html();
            // Attribute values must never break out of the tag.
            assert_eq!(html.matches('<').count(), 2);
            assert!(html.ends_with("></div>"));
        }
    }
});
