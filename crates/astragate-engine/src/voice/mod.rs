//! Speech-recognition capability providers.
//!
//! The platform layer picks one and injects it into a `SecurityGate`.

pub mod scripted;
pub mod unavailable;

pub use scripted::{ScriptedCapability, SessionRecord};
pub use unavailable::UnavailableCapability;
