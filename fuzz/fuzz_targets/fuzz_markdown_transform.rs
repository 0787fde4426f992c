#![no_main]

use libfuzzer_sys::fuzz_target;
use leaflet_embed::transform::Transformer;

fuzz_target!(|data: &[u8]| {
    if let Ok(source) = std::str::from_utf8(data) {
        let result = Transformer::default().transform(source);
        if result.blocks.is_empty() {
            assert_eq!(result.output, source);
        }
    }
});
