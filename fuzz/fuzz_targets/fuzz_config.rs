#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(cfg) = serde_json::from_slice::<astragate_core::config::GateConfig>(data) {
        let _ = cfg.classify("Execute Command: send email");
    }
});
