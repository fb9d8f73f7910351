use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use astragate_core::config::GateConfig;
use astragate_core::errors::GateError;
use astragate_core::operation::PendingOperation;
use astragate_core::phrases;
use astragate_core::state::ConfirmationState;
use astragate_core::traits::{AuditSink, CaptureSession, GateEvent, SessionId, VoiceCapability};
use astragate_core::types::{GateEventType, GateStatus};

type Hook = Box<dyn FnMut(&str)>;

/// Confirmation gate for one sensitive operation at a time.
///
/// All transitions take `&mut self` and run to completion before returning,
/// so two `confirm()` calls can never both pass the guard. The pending
/// action is moved out on release and dropped on cancel.
pub struct SecurityGate {
    capability: Box<dyn VoiceCapability>,
    config: GateConfig,
    audit: Option<Box<dyn AuditSink>>,
    status: GateStatus,
    pending: Option<PendingOperation>,
    operation_name: String,
    requires_voice_confirmation: bool,
    confirmation: ConfirmationState,
    session: Option<Box<dyn CaptureSession>>,
    on_released: Option<Hook>,
    on_cancelled: Option<Hook>,
}

/// Serializable view of a gate for reports.
#[derive(Debug, Clone, Serialize)]
pub struct GateSnapshot {
    pub operation: String,
    pub status: GateStatus,
    pub listening: bool,
    pub voice_confirmed: bool,
    pub manual_override: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remedy: Option<String>,
}

impl SecurityGate {
    pub fn new(capability: Box<dyn VoiceCapability>, config: GateConfig) -> Self {
        Self {
            capability,
            config,
            audit: None,
            status: GateStatus::Closed,
            pending: None,
            operation_name: String::new(),
            requires_voice_confirmation: true,
            confirmation: ConfirmationState::new(),
            session: None,
            on_released: None,
            on_cancelled: None,
        }
    }

    pub fn with_audit(mut self, sink: Box<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    /// Called with the operation name after the action has run.
    pub fn on_released(mut self, hook: impl FnMut(&str) + 'static) -> Self {
        self.on_released = Some(Box::new(hook));
        self
    }

    /// Called with the operation name when the user cancels.
    pub fn on_cancelled(mut self, hook: impl FnMut(&str) + 'static) -> Self {
        self.on_cancelled = Some(Box::new(hook));
        self
    }

    pub fn status(&self) -> GateStatus {
        self.status
    }

    pub fn confirmation(&self) -> &ConfirmationState {
        &self.confirmation
    }

    pub fn last_error(&self) -> Option<&GateError> {
        self.confirmation.last_error.as_ref()
    }

    pub fn operation_name(&self) -> &str {
        &self.operation_name
    }

    pub fn active_session(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id())
    }

    pub fn snapshot(&self) -> GateSnapshot {
        let err = self.confirmation.last_error.as_ref();
        GateSnapshot {
            operation: self.operation_name.clone(),
            status: self.status,
            listening: self.confirmation.listening,
            voice_confirmed: self.confirmation.voice_confirmed,
            manual_override: self.confirmation.manual_override,
            last_error: err.map(ToString::to_string),
            error_code: err.map(GateError::code),
            remedy: err.map(GateError::remedy),
        }
    }

    /// Start a confirmation cycle. Only a closed or finished gate can open.
    pub fn open(&mut self, op: PendingOperation) -> Result<GateStatus, GateError> {
        if self.status.is_open() {
            return Err(GateError::AlreadyOpen {
                operation: self.operation_name.clone(),
            });
        }
        self.operation_name = op.operation_name.clone();
        self.requires_voice_confirmation = op.requires_voice_confirmation;
        self.pending = Some(op);
        self.confirmation = ConfirmationState::new();
        self.session = None;
        self.status = GateStatus::AwaitingConfirmation;
        tracing::info!(operation = %self.operation_name, "security gate opened");
        self.emit(GateEventType::Opened, None);
        Ok(self.status)
    }

    pub fn start_voice_capture(&mut self) -> GateStatus {
        if !matches!(
            self.status,
            GateStatus::AwaitingConfirmation | GateStatus::Rejected
        ) {
            return self.ignore("start_voice_capture");
        }
        self.confirmation.last_error = None;

        if !self.capability.is_available() {
            return self.reject(GateError::RecognitionUnavailable);
        }

        match self.capability.start_capture(&self.config.locale) {
            Ok(session) => {
                let id = session.id();
                self.session = Some(session);
                self.confirmation.listening = true;
                self.confirmation.listen_deadline = self.listen_deadline(Utc::now());
                self.status = GateStatus::Listening;
                tracing::debug!(session = %id, "voice capture started");
                self.emit(GateEventType::CaptureStarted, Some(id.to_string()));
            }
            Err(err) => {
                self.reject(err);
            }
        }
        self.status
    }

    /// Transcript delivered by the capture session `session`.
    pub fn capture_result(&mut self, session: SessionId, text: &str) -> GateStatus {
        if !self.is_current_session(session) {
            return self.ignore("capture_result");
        }
        self.end_session();

        if phrases::matches_any(text, &self.config.accepted_phrases) {
            self.confirmation.voice_confirmed = true;
            self.confirmation.last_error = None;
            self.status = GateStatus::Confirmed;
            tracing::info!(operation = %self.operation_name, "voice confirmation accepted");
            self.emit(GateEventType::VoiceConfirmed, Some(phrases::normalize(text)));
            self.status
        } else {
            self.reject(GateError::PhraseMismatch {
                heard: text.trim().to_string(),
                expected: self.config.prompt_phrase().to_string(),
            })
        }
    }

    /// Stop listening without a verdict. The gate stays open and any late
    /// result from the stopped session is ignored.
    pub fn stop_voice_capture(&mut self) -> GateStatus {
        if self.status != GateStatus::Listening {
            return self.ignore("stop_voice_capture");
        }
        self.end_session();
        self.status = GateStatus::AwaitingConfirmation;
        tracing::debug!(operation = %self.operation_name, "voice capture stopped");
        self.emit(GateEventType::CaptureStopped, None);
        self.status
    }

    /// Recognition failure reported by the capture session `session`.
    pub fn capture_error(&mut self, session: SessionId, reason: &str) -> GateStatus {
        if !self.is_current_session(session) {
            return self.ignore("capture_error");
        }
        self.end_session();
        self.reject(GateError::RecognitionFailed {
            reason: reason.to_string(),
        })
    }

    /// Reject a capture that outlived its deadline.
    pub fn poll_timeout(&mut self, now: DateTime<Utc>) -> GateStatus {
        if self.status != GateStatus::Listening {
            return self.status;
        }
        match self.confirmation.listen_deadline {
            Some(deadline) if now >= deadline => {
                let seconds = self.config.listen_timeout().unwrap_or_default();
                self.end_session();
                self.emit(GateEventType::TimedOut, Some(format!("{seconds}s")));
                self.reject(GateError::CaptureTimedOut { seconds })
            }
            _ => self.status,
        }
    }

    pub fn toggle_manual_override(&mut self, checked: bool) -> GateStatus {
        if !self.accepts_input() {
            return self.ignore("toggle_manual_override");
        }
        self.confirmation.manual_override = checked;
        if self.status == GateStatus::Rejected {
            self.status = GateStatus::AwaitingConfirmation;
        }
        self.emit(
            GateEventType::OverrideToggled,
            Some(if checked { "checked" } else { "unchecked" }.to_string()),
        );
        self.status
    }

    /// The only path to the guarded action.
    pub fn confirm(&mut self) -> GateStatus {
        if !self.accepts_input() {
            return self.ignore("confirm");
        }
        if !self
            .confirmation
            .is_satisfied(self.requires_voice_confirmation)
        {
            self.confirmation.last_error = Some(GateError::ConfirmationMissing);
            if self.status == GateStatus::Rejected {
                self.status = GateStatus::AwaitingConfirmation;
            }
            tracing::debug!(operation = %self.operation_name, "confirm without confirmation");
            self.emit(GateEventType::ConfirmationMissing, None);
            return self.status;
        }

        self.end_session();
        self.status = GateStatus::Released;
        let detail = if self.confirmation.voice_confirmed {
            "voice"
        } else if self.confirmation.manual_override {
            "manual_override"
        } else {
            "not_required"
        };
        tracing::info!(operation = %self.operation_name, via = detail, "operation released");
        self.emit(GateEventType::Released, Some(detail.to_string()));

        if let Some(action) = self.pending.take().and_then(|mut op| op.take_action()) {
            action();
        }
        if let Some(hook) = self.on_released.as_mut() {
            hook(&self.operation_name);
        }
        self.status
    }

    /// Abort the cycle. Idempotent once terminal.
    pub fn cancel(&mut self) -> GateStatus {
        if self.status.is_terminal() {
            return self.status;
        }
        if self.status == GateStatus::Closed {
            return self.ignore("cancel");
        }
        self.end_session();
        self.pending = None;
        self.status = GateStatus::Cancelled;
        tracing::info!(operation = %self.operation_name, "operation cancelled");
        self.emit(GateEventType::Cancelled, None);
        if let Some(hook) = self.on_cancelled.as_mut() {
            hook(&self.operation_name);
        }
        self.status
    }

    fn accepts_input(&self) -> bool {
        matches!(
            self.status,
            GateStatus::AwaitingConfirmation
                | GateStatus::Rejected
                | GateStatus::Listening
                | GateStatus::Confirmed
        )
    }

    /// `None` when no timeout is configured or the deadline is unrepresentable.
    fn listen_deadline(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let secs = self.config.listen_timeout()?;
        let window = i64::try_from(secs).ok().and_then(TimeDelta::try_seconds)?;
        now.checked_add_signed(window)
    }

    fn is_current_session(&self, id: SessionId) -> bool {
        self.status == GateStatus::Listening && self.active_session() == Some(id)
    }

    fn end_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.stop();
        }
        self.confirmation.listening = false;
        self.confirmation.listen_deadline = None;
    }

    fn reject(&mut self, err: GateError) -> GateStatus {
        self.end_session();
        tracing::debug!(operation = %self.operation_name, error = %err, "confirmation rejected");
        self.emit(GateEventType::Rejected, Some(err.to_string()));
        self.confirmation.last_error = Some(err);
        self.status = GateStatus::Rejected;
        self.status
    }

    fn ignore(&self, event: &str) -> GateStatus {
        tracing::debug!(event, status = %self.status, "event ignored");
        self.status
    }

    fn emit(&self, event_type: GateEventType, detail: Option<String>) {
        let Some(sink) = &self.audit else {
            return;
        };
        let mut event = GateEvent::new(event_type, &self.operation_name, self.status);
        if let Some(detail) = detail {
            event = event.with_detail(detail);
        }
        if let Err(e) = sink.record(&event) {
            tracing::warn!(error = %e, "audit write failed");
        }
    }
}

impl Drop for SecurityGate {
    fn drop(&mut self) {
        self.end_session();
    }
}
