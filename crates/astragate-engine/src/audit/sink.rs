use std::cell::RefCell;
use std::rc::Rc;

use astragate_core::errors::AuditError;
use astragate_core::traits::{AuditSink, GateEvent};

use super::log::append_audit;

/// Appends events to a hash-chained JSONL file.
#[derive(Debug, Clone)]
pub struct JsonlAuditSink {
    path: String,
}

impl JsonlAuditSink {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl AuditSink for JsonlAuditSink {
    fn record(&self, event: &GateEvent) -> Result<(), AuditError> {
        let value =
            serde_json::to_value(event).map_err(|e| AuditError::WriteFailure(e.to_string()))?;
        append_audit(&self.path, &value)
            .map(|_| ())
            .map_err(|e| AuditError::WriteFailure(format!("{e:#}")))
    }
}

/// Keeps events in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditSink {
    events: Rc<RefCell<Vec<GateEvent>>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<GateEvent> {
        self.events.borrow().clone()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: &GateEvent) -> Result<(), AuditError> {
        self.events.borrow_mut().push(event.clone());
        Ok(())
    }
}
