use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a security gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStatus {
    #[default]
    Closed,
    AwaitingConfirmation,
    Listening,
    Confirmed,
    Rejected,
    Released,
    Cancelled,
}

impl GateStatus {
    /// Released and Cancelled end the gate; no further event changes it.
    pub fn is_terminal(self) -> bool {
        matches!(self, GateStatus::Released | GateStatus::Cancelled)
    }

    /// States in which the user can still act on the pending operation.
    pub fn is_open(self) -> bool {
        !self.is_terminal() && self != GateStatus::Closed
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GateStatus::Closed => "closed",
            GateStatus::AwaitingConfirmation => "awaiting_confirmation",
            GateStatus::Listening => "listening",
            GateStatus::Confirmed => "confirmed",
            GateStatus::Rejected => "rejected",
            GateStatus::Released => "released",
            GateStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for GateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Privilege level of the acting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role \"{other}\" (expected user or admin)")),
        }
    }
}

/// Audit event taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateEventType {
    Opened,
    CaptureStarted,
    CaptureStopped,
    VoiceConfirmed,
    Rejected,
    OverrideToggled,
    ConfirmationMissing,
    TimedOut,
    Released,
    Cancelled,
    Executed,
    Denied,
}
