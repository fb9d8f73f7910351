use std::fmt;

/// The guarded side effect of a pending operation.
pub type Action = Box<dyn FnOnce()>;

/// A sensitive action awaiting confirmation.
///
/// The action is consumed on release, so a pending operation can run its
/// side effect at most once.
pub struct PendingOperation {
    pub operation_name: String,
    pub description: String,
    pub requires_voice_confirmation: bool,
    action: Option<Action>,
}

impl PendingOperation {
    pub fn new(
        operation_name: impl Into<String>,
        description: impl Into<String>,
        action: impl FnOnce() + 'static,
    ) -> Self {
        Self {
            operation_name: operation_name.into(),
            description: description.into(),
            requires_voice_confirmation: true,
            action: Some(Box::new(action)),
        }
    }

    /// Record for a spoken assistant command.
    pub fn for_command(command: &str, action: impl FnOnce() + 'static) -> Self {
        Self::new(
            format!("Execute Command: {command}"),
            format!(
                "This will execute the voice command: \"{command}\". \
                 This may trigger actions like sending messages or creating reminders."
            ),
            action,
        )
    }

    pub fn with_voice_confirmation(mut self, required: bool) -> Self {
        self.requires_voice_confirmation = required;
        self
    }

    /// Remove the action, leaving `None` behind.
    pub fn take_action(&mut self) -> Option<Action> {
        self.action.take()
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }
}

impl fmt::Debug for PendingOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingOperation")
            .field("operation_name", &self.operation_name)
            .field("description", &self.description)
            .field(
                "requires_voice_confirmation",
                &self.requires_voice_confirmation,
            )
            .field("has_action", &self.action.is_some())
            .finish()
    }
}
