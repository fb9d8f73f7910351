//! Gate event recording.

pub mod log;
pub mod sink;

pub use sink::{JsonlAuditSink, MemoryAuditSink};
