use std::collections::BTreeMap;
use std::io::Write;

use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};

const GENESIS: &str = "genesis";

fn line_hash(line: &str) -> String {
    format!("sha256:{:x}", Sha256::digest(line.as_bytes()))
}

fn last_line(content: &str) -> Option<&str> {
    content.lines().rev().find(|line| !line.trim().is_empty())
}

/// Append an entry to a JSONL audit log, maintaining the hash chain.
///
/// Each entry gets a `prev_hash` field holding the SHA-256 of the previous
/// line; the first entry uses "genesis". Returns the hash of the new line.
pub fn append_audit(path: &str, entry: &serde_json::Value) -> Result<String> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e).with_context(|| format!("cannot read audit {path}")),
    };
    let prev_hash = last_line(&content)
        .map(line_hash)
        .unwrap_or_else(|| GENESIS.to_string());

    let mut entry = entry.clone();
    let Some(obj) = entry.as_object_mut() else {
        bail!("audit entry must be a JSON object");
    };
    obj.insert("prev_hash".into(), serde_json::Value::String(prev_hash));
    if !obj.contains_key("ts") {
        obj.insert(
            "ts".into(),
            serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
        );
    }

    let entry_json = serde_json::to_string(&entry)?;
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open audit {path}"))?;
    if !content.is_empty() && !content.ends_with('\n') {
        file.write_all(b"\n")?;
    }
    writeln!(file, "{entry_json}").with_context(|| format!("cannot write audit {path}"))?;

    Ok(line_hash(&entry_json))
}

/// Verify the hash chain in an audit log file. Returns the number of entries.
pub fn verify_chain(path: &str) -> Result<u64> {
    verify_chain_from(path, 0)
}

/// Verify the chain starting at entry `from_entry` (0-based).
///
/// Earlier entries are walked to build chain state but their `prev_hash`
/// is not checked.
pub fn verify_chain_from(path: &str, from_entry: u64) -> Result<u64> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("cannot read audit {path}"))?;

    let mut count = 0u64;
    let mut prev_hash = GENESIS.to_string();

    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let entry: serde_json::Value = serde_json::from_str(line)
            .with_context(|| format!("invalid JSON at line {}", i + 1))?;

        if count >= from_entry {
            let entry_prev = entry
                .get("prev_hash")
                .and_then(serde_json::Value::as_str)
                .unwrap_or(GENESIS);
            if entry_prev != prev_hash {
                bail!(
                    "hash chain broken at entry {count}: expected prev_hash '{prev_hash}', got '{entry_prev}'"
                );
            }
        }

        prev_hash = line_hash(line);
        count += 1;
    }

    Ok(count)
}

/// Count entries per `event_type`.
pub fn summarize(path: &str) -> Result<BTreeMap<String, u64>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("cannot read audit {path}"))?;

    let mut counts = BTreeMap::new();
    for line in content.lines().filter(|l| !l.trim().is_empty()) {
        if let Ok(entry) = serde_json::from_str::<serde_json::Value>(line) {
            if let Some(et) = entry.get("event_type").and_then(|v| v.as_str()) {
                *counts.entry(et.to_string()).or_insert(0) += 1;
            }
        }
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_log() -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gate.audit.jsonl");
        let path = path.to_str().unwrap().to_string();
        (dir, path)
    }

    #[test]
    fn append_and_verify_chain() {
        let (_dir, path) = temp_log();
        for event in ["Opened", "Rejected", "Released"] {
            append_audit(&path, &serde_json::json!({"event_type": event})).unwrap();
        }
        assert_eq!(verify_chain(&path).unwrap(), 3);

        let first: serde_json::Value =
            serde_json::from_str(std::fs::read_to_string(&path).unwrap().lines().next().unwrap())
                .unwrap();
        assert_eq!(first["prev_hash"], "genesis");
        assert!(first["ts"].is_string());
    }

    #[test]
    fn verify_detects_tampering() {
        let (_dir, path) = temp_log();
        append_audit(&path, &serde_json::json!({"event_type": "Opened", "operation": "Send"}))
            .unwrap();
        append_audit(&path, &serde_json::json!({"event_type": "Released"})).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        std::fs::write(&path, content.replacen("Send", "Delete", 1)).unwrap();

        assert!(verify_chain(&path).is_err());
    }

    #[test]
    fn verify_suffix_skips_earlier_prev_hash() {
        let (_dir, path) = temp_log();
        std::fs::write(&path, "{\"event_type\":\"Opened\",\"prev_hash\":\"bogus\"}\n").unwrap();
        append_audit(&path, &serde_json::json!({"event_type": "Cancelled"})).unwrap();

        assert!(verify_chain(&path).is_err());
        assert_eq!(verify_chain_from(&path, 1).unwrap(), 2);
    }

    #[test]
    fn empty_file_is_zero_entries() {
        let (_dir, path) = temp_log();
        std::fs::write(&path, "").unwrap();
        assert_eq!(verify_chain(&path).unwrap(), 0);
    }

    #[test]
    fn non_object_entry_rejected() {
        let (_dir, path) = temp_log();
        assert!(append_audit(&path, &serde_json::json!(["not", "an", "object"])).is_err());
    }

    #[test]
    fn summary_counts_event_types() {
        let (_dir, path) = temp_log();
        append_audit(&path, &serde_json::json!({"event_type": "Opened"})).unwrap();
        append_audit(&path, &serde_json::json!({"event_type": "Rejected"})).unwrap();
        append_audit(&path, &serde_json::json!({"event_type": "Rejected"})).unwrap();

        let counts = summarize(&path).unwrap();
        assert_eq!(counts["Rejected"], 2);
        assert_eq!(counts["Opened"], 1);
    }
}
