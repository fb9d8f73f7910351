use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Write content atomically: temp file in the same directory, fsync, rename.
pub fn atomic_write(path: &str, content: &[u8]) -> Result<()> {
    let target = Path::new(path);
    let dir = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let temp_path = dir.join(format!(".{}.tmp", temp_suffix()));

    let mut file = std::fs::File::create(&temp_path)
        .with_context(|| format!("cannot create temp file for {path}"))?;
    file.write_all(content)?;
    file.sync_all()?;
    drop(file);

    std::fs::rename(&temp_path, target).with_context(|| format!("cannot rename temp to {path}"))?;
    Ok(())
}

/// Pretty-print `value` as JSON and write it atomically, creating parent
/// directories as needed.
pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(value)?;
    atomic_write(path, json.as_bytes())
}

fn temp_suffix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("{nanos:x}-{}", std::process::id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn atomic_write_replaces_content() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();

        atomic_write(path, b"version 1").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "version 1");

        atomic_write(path, b"version 2").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "version 2");
    }

    #[test]
    fn write_json_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".astragate").join("config.json");
        let path = path.to_str().unwrap();

        write_json(path, &astragate_core::config::GateConfig::default()).unwrap();
        let back = astragate_core::config::load_config(path).unwrap();
        assert_eq!(back, astragate_core::config::GateConfig::default());

        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join(".astragate"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
