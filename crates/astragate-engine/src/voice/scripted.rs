use std::cell::RefCell;
use std::rc::Rc;

use astragate_core::errors::GateError;
use astragate_core::traits::{CaptureSession, SessionId, VoiceCapability};

/// What happened to one capture session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub id: SessionId,
    pub locale: String,
    pub stop_calls: u32,
}

impl SessionRecord {
    pub fn stopped(&self) -> bool {
        self.stop_calls > 0
    }
}

#[derive(Debug, Default)]
struct Ledger {
    next_id: u64,
    sessions: Vec<SessionRecord>,
    fail_next: Option<String>,
}

/// Capability whose transcripts are supplied by the host rather than a
/// microphone: typed input, a test script, or an upstream recognizer.
///
/// Clones share one session ledger, so a caller can keep a handle after
/// injecting the capability into a gate.
#[derive(Debug, Clone, Default)]
pub struct ScriptedCapability {
    ledger: Rc<RefCell<Ledger>>,
}

impl ScriptedCapability {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `start_capture` fail with `reason`.
    pub fn fail_next_start(&self, reason: impl Into<String>) {
        self.ledger.borrow_mut().fail_next = Some(reason.into());
    }

    pub fn sessions(&self) -> Vec<SessionRecord> {
        self.ledger.borrow().sessions.clone()
    }

    pub fn session(&self, id: SessionId) -> Option<SessionRecord> {
        self.ledger
            .borrow()
            .sessions
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    /// Sessions started but never stopped.
    pub fn open_sessions(&self) -> usize {
        self.ledger
            .borrow()
            .sessions
            .iter()
            .filter(|s| !s.stopped())
            .count()
    }
}

impl VoiceCapability for ScriptedCapability {
    fn is_available(&self) -> bool {
        true
    }

    fn start_capture(&self, locale: &str) -> Result<Box<dyn CaptureSession>, GateError> {
        let mut ledger = self.ledger.borrow_mut();
        if let Some(reason) = ledger.fail_next.take() {
            return Err(GateError::RecognitionFailed { reason });
        }
        ledger.next_id += 1;
        let id = SessionId(ledger.next_id);
        ledger.sessions.push(SessionRecord {
            id,
            locale: locale.to_string(),
            stop_calls: 0,
        });
        tracing::debug!(%id, locale, "scripted capture started");
        Ok(Box::new(ScriptedSession {
            id,
            ledger: Rc::clone(&self.ledger),
        }))
    }
}

struct ScriptedSession {
    id: SessionId,
    ledger: Rc<RefCell<Ledger>>,
}

impl CaptureSession for ScriptedSession {
    fn id(&self) -> SessionId {
        self.id
    }

    fn stop(&mut self) {
        let mut ledger = self.ledger.borrow_mut();
        if let Some(record) = ledger.sessions.iter_mut().find(|s| s.id == self.id) {
            record.stop_calls += 1;
        }
    }
}
