/// Problems surfaced inside an open gate.
///
/// The `Display` text is what the user sees inline; `remedy()` names the fix.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    #[error("voice recognition not supported on this platform")]
    RecognitionUnavailable,
    #[error("{reason}")]
    RecognitionFailed { reason: String },
    #[error("said \"{heard}\". Please say \"{expected}\" to confirm")]
    PhraseMismatch { heard: String, expected: String },
    #[error("confirmation required")]
    ConfirmationMissing,
    #[error("no speech detected within {seconds}s")]
    CaptureTimedOut { seconds: u64 },
    #[error("a confirmation for '{operation}' is already in progress")]
    AlreadyOpen { operation: String },
}

impl GateError {
    /// The exact step the user can take to recover.
    pub fn remedy(&self) -> String {
        match self {
            GateError::RecognitionUnavailable => "use manual confirmation".into(),
            GateError::RecognitionFailed { .. } | GateError::CaptureTimedOut { .. } => {
                "try again or use manual confirmation".into()
            }
            GateError::PhraseMismatch { expected, .. } => {
                format!("say \"{expected}\" or use manual confirmation")
            }
            GateError::ConfirmationMissing => {
                "say the confirmation phrase or check the manual override box".into()
            }
            GateError::AlreadyOpen { .. } => "finish or cancel the pending confirmation".into(),
        }
    }

    /// Short machine-readable code for reports.
    pub fn code(&self) -> &'static str {
        match self {
            GateError::RecognitionUnavailable => "recognition_unavailable",
            GateError::RecognitionFailed { .. } => "recognition_failed",
            GateError::PhraseMismatch { .. } => "phrase_mismatch",
            GateError::ConfirmationMissing => "confirmation_missing",
            GateError::CaptureTimedOut { .. } => "capture_timed_out",
            GateError::AlreadyOpen { .. } => "already_open",
        }
    }
}

/// Reasons the dispatcher refuses an operation before any gate opens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("please sign in to execute tasks")]
    SignInRequired,
    #[error("permission denied: admin access required for '{operation}'")]
    PermissionDenied { operation: String },
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("write failure: {0}")]
    WriteFailure(String),
}
