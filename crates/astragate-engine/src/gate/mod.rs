pub mod machine;

pub use machine::{GateSnapshot, SecurityGate};
