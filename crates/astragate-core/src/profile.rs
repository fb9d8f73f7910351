use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::types::Role;

/// The signed-in user as seen by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl UserProfile {
    pub fn new(uid: impl Into<String>, role: Role) -> Self {
        Self {
            uid: uid.into(),
            display_name: None,
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Name shown in messages: display name, falling back to uid.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.uid)
    }
}

/// Load a profile from a JSON file.
pub fn load_profile(path: &str) -> Result<UserProfile> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("cannot read profile {path}"))?;
    serde_json::from_str(&content).with_context(|| format!("{path}: invalid profile JSON"))
}
