use chrono::{DateTime, Utc};

use crate::errors::GateError;

/// Per-opening confirmation progress. Created fresh on every `open`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfirmationState {
    pub listening: bool,
    pub voice_confirmed: bool,
    pub manual_override: bool,
    pub last_error: Option<GateError>,
    /// When the active capture session must have produced a result.
    pub listen_deadline: Option<DateTime<Utc>>,
}

impl ConfirmationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the release guard is satisfied.
    pub fn is_satisfied(&self, requires_voice_confirmation: bool) -> bool {
        !requires_voice_confirmation || self.voice_confirmed || self.manual_override
    }

    /// Inline error text, if any.
    pub fn last_error_message(&self) -> Option<String> {
        self.last_error.as_ref().map(ToString::to_string)
    }
}
