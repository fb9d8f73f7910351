#![no_main]
use std::cell::Cell;
use std::rc::Rc;

use libfuzzer_sys::fuzz_target;

use astragate_core::config::GateConfig;
use astragate_core::operation::PendingOperation;
use astragate_engine::gate::SecurityGate;
use astragate_engine::voice::ScriptedCapability;

// Arbitrary event sequences must never run the action twice.
fuzz_target!(|data: &[u8]| {
    let hits = Rc::new(Cell::new(0u32));
    let h = hits.clone();
    let mut gate = SecurityGate::new(Box::new(ScriptedCapability::new()), GateConfig::default());
    let _ = gate.open(PendingOperation::new("Send message", "fuzz", move || {
        h.set(h.get() + 1)
    }));

    let mut last = None;
    for byte in data {
        match byte % 8 {
            0 => {
                gate.start_voice_capture();
                last = gate.active_session().or(last);
            }
            1 => {
                if let Some(id) = last {
                    gate.capture_result(id, if byte & 0x80 == 0 { "yes" } else { "no" });
                }
            }
            2 => {
                if let Some(id) = last {
                    gate.capture_error(id, "fuzz");
                }
            }
            3 => {
                gate.toggle_manual_override(byte & 0x80 == 0);
            }
            4 => {
                gate.confirm();
            }
            5 => {
                gate.cancel();
            }
            6 => {
                gate.stop_voice_capture();
            }
            _ => {
                gate.poll_timeout(chrono::Utc::now());
            }
        }
    }
    assert!(hits.get() <= 1);
});
