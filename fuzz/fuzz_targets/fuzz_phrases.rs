#![no_main]
use libfuzzer_sys::fuzz_target;

use astragate_core::phrases::{matches_any, DEFAULT_PHRASES};

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = matches_any(text, DEFAULT_PHRASES);
        let _ = astragate_core::config::GateConfig::default().classify(text);
    }
});
