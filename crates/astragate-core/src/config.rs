use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::classify::{self, Classification, DEFAULT_ADMIN_KEYWORDS, DEFAULT_SENSITIVE_KEYWORDS};
use crate::phrases::DEFAULT_PHRASES;

pub const WORKSPACE_CONFIG_PATH: &str = ".astragate/config.json";

/// Longest listen window a config may ask for (one day).
pub const MAX_LISTEN_TIMEOUT_SECONDS: u64 = 24 * 60 * 60;

/// Gate and dispatcher settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_phrases")]
    pub accepted_phrases: Vec<String>,
    #[serde(default = "default_sensitive")]
    pub sensitive_keywords: Vec<String>,
    #[serde(default = "default_admin")]
    pub admin_keywords: Vec<String>,
    /// `None` lets a capture session listen indefinitely.
    #[serde(default = "default_listen_timeout")]
    pub listen_timeout_seconds: Option<u64>,
    #[serde(default = "default_true")]
    pub require_voice_confirmation: bool,
}

fn default_locale() -> String {
    "en-US".to_string()
}

fn default_phrases() -> Vec<String> {
    DEFAULT_PHRASES.iter().map(|s| s.to_string()).collect()
}

fn default_sensitive() -> Vec<String> {
    DEFAULT_SENSITIVE_KEYWORDS.iter().map(|s| s.to_string()).collect()
}

fn default_admin() -> Vec<String> {
    DEFAULT_ADMIN_KEYWORDS.iter().map(|s| s.to_string()).collect()
}

fn default_listen_timeout() -> Option<u64> {
    Some(30)
}

fn default_true() -> bool {
    true
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            accepted_phrases: default_phrases(),
            sensitive_keywords: default_sensitive(),
            admin_keywords: default_admin(),
            listen_timeout_seconds: default_listen_timeout(),
            require_voice_confirmation: true,
        }
    }
}

impl GateConfig {
    pub fn classify(&self, operation: &str) -> Classification {
        classify::classify(operation, &self.sensitive_keywords, &self.admin_keywords)
    }

    /// Listen timeout in seconds, capped at [`MAX_LISTEN_TIMEOUT_SECONDS`].
    pub fn listen_timeout(&self) -> Option<u64> {
        self.listen_timeout_seconds
            .map(|secs| secs.min(MAX_LISTEN_TIMEOUT_SECONDS))
    }

    /// Phrase quoted back to the user when a capture does not match.
    pub fn prompt_phrase(&self) -> &str {
        self.accepted_phrases
            .iter()
            .map(|p| p.trim())
            .find(|p| !p.is_empty())
            .unwrap_or(DEFAULT_PHRASES[0])
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(secs) = self.listen_timeout_seconds {
            if secs > MAX_LISTEN_TIMEOUT_SECONDS {
                bail!(
                    "listen_timeout_seconds {secs} exceeds the maximum of {MAX_LISTEN_TIMEOUT_SECONDS}"
                );
            }
        }
        Ok(())
    }
}

/// Load config from a JSON file. Missing fields take defaults.
pub fn load_config(path: &str) -> Result<GateConfig> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("cannot read config {path}"))?;
    let config: GateConfig =
        serde_json::from_str(&content).with_context(|| format!("{path}: invalid config JSON"))?;
    config.validate().with_context(|| format!("{path}: invalid config"))?;
    Ok(config)
}

/// Explicit path wins; otherwise the workspace file if present; otherwise defaults.
pub fn resolve_config(explicit: Option<&str>) -> Result<GateConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    if std::path::Path::new(WORKSPACE_CONFIG_PATH).exists() {
        return load_config(WORKSPACE_CONFIG_PATH);
    }
    Ok(GateConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_defaults() {
        let cfg: GateConfig =
            serde_json::from_str(r#"{"locale": "en-GB", "listen_timeout_seconds": null}"#)
                .unwrap();
        assert_eq!(cfg.locale, "en-GB");
        assert_eq!(cfg.listen_timeout_seconds, None);
        assert_eq!(cfg.accepted_phrases.len(), DEFAULT_PHRASES.len());
        assert!(cfg.require_voice_confirmation);
    }

    #[test]
    fn empty_object_is_default() {
        let cfg: GateConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, GateConfig::default());
    }

    #[test]
    fn explicit_path_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gate.json");
        std::fs::write(&path, r#"{"sensitive_keywords": ["transfer"]}"#).unwrap();
        let cfg = resolve_config(Some(path.to_str().unwrap())).unwrap();
        assert!(cfg.classify("Transfer funds").sensitive);
        assert!(!cfg.classify("delete reminder").sensitive);
    }

    #[test]
    fn missing_explicit_path_errors() {
        assert!(resolve_config(Some("/nonexistent/astragate.json")).is_err());
    }

    #[test]
    fn oversized_listen_timeout_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gate.json");
        std::fs::write(
            &path,
            format!(r#"{{"listen_timeout_seconds": {}}}"#, u64::MAX),
        )
        .unwrap();
        let err = load_config(path.to_str().unwrap()).unwrap_err();
        assert!(format!("{err:#}").contains("listen_timeout_seconds"));
    }

    #[test]
    fn listen_timeout_is_capped() {
        let cfg = GateConfig {
            listen_timeout_seconds: Some(1 << 63),
            ..GateConfig::default()
        };
        assert_eq!(cfg.listen_timeout(), Some(MAX_LISTEN_TIMEOUT_SECONDS));
        assert!(cfg.validate().is_err());
        assert_eq!(GateConfig::default().listen_timeout(), Some(30));
    }

    #[test]
    fn prompt_phrase_follows_config() {
        assert_eq!(GateConfig::default().prompt_phrase(), "yes, execute");
        let cfg = GateConfig {
            accepted_phrases: vec!["  ".into(), "Do it".into()],
            ..GateConfig::default()
        };
        assert_eq!(cfg.prompt_phrase(), "Do it");
        let empty = GateConfig {
            accepted_phrases: vec![],
            ..GateConfig::default()
        };
        assert_eq!(empty.prompt_phrase(), "yes, execute");
    }
}
