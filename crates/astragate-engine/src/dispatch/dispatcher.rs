use std::fmt;

use astragate_core::config::GateConfig;
use astragate_core::errors::DispatchError;
use astragate_core::operation::PendingOperation;
use astragate_core::profile::UserProfile;
use astragate_core::traits::{AuditSink, GateEvent};
use astragate_core::types::{GateEventType, GateStatus};

/// Outcome of routing an operation.
pub enum Dispatch {
    /// Not sensitive; the action already ran.
    Executed,
    /// Sensitive; open a `SecurityGate` with this record.
    Gated(PendingOperation),
    /// Refused before any gate was involved.
    Denied(DispatchError),
}

impl Dispatch {
    pub fn kind(&self) -> &'static str {
        match self {
            Dispatch::Executed => "executed",
            Dispatch::Gated(_) => "gated",
            Dispatch::Denied(_) => "denied",
        }
    }
}

impl fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dispatch::Executed => f.write_str("Executed"),
            Dispatch::Gated(op) => f.debug_tuple("Gated").field(op).finish(),
            Dispatch::Denied(e) => f.debug_tuple("Denied").field(e).finish(),
        }
    }
}

/// Classifies operations and enforces the permission check that precedes
/// any confirmation.
///
/// Order:
/// 1. No signed-in user: deny
/// 2. Admin-only keyword and the user is not an admin: deny
/// 3. Sensitive keyword: hand back a gated record
/// 4. Otherwise run the action immediately
pub struct Dispatcher {
    config: GateConfig,
    audit: Option<Box<dyn AuditSink>>,
}

impl Dispatcher {
    pub fn new(config: GateConfig) -> Self {
        Self {
            config,
            audit: None,
        }
    }

    pub fn with_audit(mut self, sink: Box<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn check_permissions(
        &self,
        user: Option<&UserProfile>,
        operation: &str,
    ) -> Result<(), DispatchError> {
        let user = user.ok_or(DispatchError::SignInRequired)?;
        if user.is_admin() {
            return Ok(());
        }
        if self.config.classify(operation).admin_only {
            return Err(DispatchError::PermissionDenied {
                operation: operation.to_string(),
            });
        }
        Ok(())
    }

    pub fn requires_gate(&self, operation: &str) -> bool {
        self.config.classify(operation).sensitive
    }

    pub fn dispatch(&self, user: Option<&UserProfile>, mut op: PendingOperation) -> Dispatch {
        if let Err(err) = self.check_permissions(user, &op.operation_name) {
            tracing::warn!(operation = %op.operation_name, error = %err, "operation denied");
            self.emit(GateEventType::Denied, &op.operation_name, Some(err.to_string()));
            return Dispatch::Denied(err);
        }

        if self.requires_gate(&op.operation_name) {
            if !self.config.require_voice_confirmation {
                op.requires_voice_confirmation = false;
            }
            tracing::debug!(operation = %op.operation_name, "operation needs confirmation");
            return Dispatch::Gated(op);
        }

        tracing::info!(operation = %op.operation_name, "executing operation");
        self.emit(GateEventType::Executed, &op.operation_name, None);
        if let Some(action) = op.take_action() {
            action();
        }
        Dispatch::Executed
    }

    fn emit(&self, event_type: GateEventType, operation: &str, detail: Option<String>) {
        let Some(sink) = &self.audit else {
            return;
        };
        let mut event = GateEvent::new(event_type, operation, GateStatus::Closed);
        if let Some(detail) = detail {
            event = event.with_detail(detail);
        }
        if let Err(e) = sink.record(&event) {
            tracing::warn!(error = %e, "audit write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::audit::MemoryAuditSink;
    use astragate_core::types::Role;

    fn op(name: &str, hits: &Rc<Cell<u32>>) -> PendingOperation {
        let h = hits.clone();
        PendingOperation::new(name, "test operation", move || h.set(h.get() + 1))
    }

    fn user() -> UserProfile {
        UserProfile::new("u1", Role::User)
    }

    fn admin() -> UserProfile {
        UserProfile::new("a1", Role::Admin)
    }

    #[test]
    fn signed_out_is_denied() {
        let d = Dispatcher::new(GateConfig::default());
        let hits = Rc::new(Cell::new(0));
        let out = d.dispatch(None, op("search jobs", &hits));
        assert!(matches!(out, Dispatch::Denied(DispatchError::SignInRequired)));
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn admin_only_denied_for_regular_user() {
        let d = Dispatcher::new(GateConfig::default());
        let hits = Rc::new(Cell::new(0));
        let u = user();
        let out = d.dispatch(Some(&u), op("Trigger emergency: Police", &hits));
        match out {
            Dispatch::Denied(DispatchError::PermissionDenied { operation }) => {
                assert_eq!(operation, "Trigger emergency: Police");
            }
            other => panic!("expected PermissionDenied, got {other:?}"),
        }
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn admin_gets_gated_not_denied() {
        let d = Dispatcher::new(GateConfig::default());
        let hits = Rc::new(Cell::new(0));
        let a = admin();
        let out = d.dispatch(Some(&a), op("Trigger emergency: Police", &hits));
        assert_eq!(out.kind(), "gated");
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn admin_only_but_not_sensitive_runs_for_admin() {
        let d = Dispatcher::new(GateConfig::default());
        let hits = Rc::new(Cell::new(0));
        let a = admin();
        let out = d.dispatch(Some(&a), op("Configure assistant", &hits));
        assert_eq!(out.kind(), "executed");
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn sensitive_operation_is_gated_with_action_intact() {
        let d = Dispatcher::new(GateConfig::default());
        let hits = Rc::new(Cell::new(0));
        let u = user();
        match d.dispatch(Some(&u), op("Execute Command: send email to Ravi", &hits)) {
            Dispatch::Gated(pending) => {
                assert!(pending.has_action());
                assert!(pending.requires_voice_confirmation);
            }
            other => panic!("expected Gated, got {other:?}"),
        }
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn relaxed_config_propagates_to_record() {
        let config = GateConfig {
            require_voice_confirmation: false,
            ..GateConfig::default()
        };
        let d = Dispatcher::new(config);
        let hits = Rc::new(Cell::new(0));
        let u = user();
        match d.dispatch(Some(&u), op("Delete reminder", &hits)) {
            Dispatch::Gated(pending) => assert!(!pending.requires_voice_confirmation),
            other => panic!("expected Gated, got {other:?}"),
        }
    }

    #[test]
    fn plain_operation_runs_immediately() {
        let sink = MemoryAuditSink::new();
        let d = Dispatcher::new(GateConfig::default()).with_audit(Box::new(sink.clone()));
        let hits = Rc::new(Cell::new(0));
        let u = user();
        let out = d.dispatch(Some(&u), op("Execute Command: remind me at 5pm", &hits));
        assert_eq!(out.kind(), "executed");
        assert_eq!(hits.get(), 1);
        assert_eq!(sink.events()[0].event_type, GateEventType::Executed);
    }

    #[test]
    fn denial_is_audited() {
        let sink = MemoryAuditSink::new();
        let d = Dispatcher::new(GateConfig::default()).with_audit(Box::new(sink.clone()));
        let hits = Rc::new(Cell::new(0));
        d.dispatch(None, op("Sign Out", &hits));
        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, GateEventType::Denied);
        assert!(events[0].detail.as_deref().unwrap().contains("sign in"));
    }
}
