use std::path::PathBuf;

use anyhow::Context;

pub fn default_dsn() -> String {
    "sqlite://gatewire.db?mode=rwc".to_string()
}

pub fn ensure_sqlite_parent_dir(dsn: &str) -> anyhow::Result<()> {
    let Some(db_path) = sqlite_file_path_from_dsn(dsn) else {
        return Ok(());
    };
    let Some(parent) = db_path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).with_context(|| format!("create sqlite parent dir {}", parent.display()))?;
    Ok(())
}

fn sqlite_file_path_from_dsn(dsn: &str) -> Option<PathBuf> {
    let rest = dsn.strip_prefix("sqlite:")?;
    let path_part = rest.split(['?', '#']).next()?.trim();
    if path_part.is_empty() {
        return None;
    }
    let mut normalized = path_part;
    if let Some(stripped) = normalized.strip_prefix("//") {
        normalized = stripped;
    }
    if normalized.to_ascii_lowercase() == ":memory:" {
        return None;
    }
    Some(PathBuf::from(normalized))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_sqlite_path() {
        let path = sqlite_file_path_from_dsn("sqlite://gatewire.db?mode=rwc").unwrap();
        assert_eq!(path.to_string_lossy(), "gatewire.db");
    }

    #[test]
    fn resolves_absolute_sqlite_path() {
        let path = sqlite_file_path_from_dsn("sqlite://app/data/gatewire.db?mode=rwc").unwrap();
        assert_eq!(path.to_string_lossy(), "/app/data/gatewire.db");
    }

    #[test]
    fn memory_dsn_has_no_parent_dir_to_create() {
        assert!(sqlite_file_path_from_dsn("sqlite::memory:").is_none());
        assert!(sqlite_file_path_from_dsn("sqlite://:memory:").is_none());
    }
}
