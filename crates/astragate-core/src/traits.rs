use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{AuditError, GateError};
use crate::types::{GateEventType, GateStatus};

/// Identifies one capture session so stale callbacks can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "capture-{}", self.0)
    }
}

/// One in-flight speech capture.
///
/// A session reports exactly one of result/error to its gate, then ends.
pub trait CaptureSession {
    fn id(&self) -> SessionId;

    /// Release the microphone. Safe to call at any time, including after the
    /// session already ended.
    fn stop(&mut self);
}

/// Platform speech-recognition capability.
pub trait VoiceCapability {
    fn is_available(&self) -> bool;

    fn start_capture(&self, locale: &str) -> Result<Box<dyn CaptureSession>, GateError>;
}

/// A single gate or dispatch event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateEvent {
    pub event_type: GateEventType,
    pub operation: String,
    pub status: GateStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub ts: DateTime<Utc>,
}

impl GateEvent {
    pub fn new(event_type: GateEventType, operation: &str, status: GateStatus) -> Self {
        Self {
            event_type,
            operation: operation.to_string(),
            status,
            detail: None,
            ts: Utc::now(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Receives gate events for persistence.
pub trait AuditSink {
    fn record(&self, event: &GateEvent) -> Result<(), AuditError>;
}
