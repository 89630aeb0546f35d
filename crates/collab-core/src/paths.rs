use crate::error::{CollabError, Result};
use std::path::{Path, PathBuf};

pub const DATA_DIR: &str = ".plan-collab";
pub const CONFIG_FILE: &str = "config.json";
pub const QUEUE_SNAPSHOT_FILE: &str = "queue.json";

/// `~/.plan-collab` — config and registry snapshot live here.
pub fn data_dir() -> Result<PathBuf> {
    let home = home::home_dir().ok_or(CollabError::HomeNotFound)?;
    Ok(home.join(DATA_DIR))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(data_dir()?.join(CONFIG_FILE))
}

pub fn queue_snapshot_path() -> Result<PathBuf> {
    Ok(data_dir()?.join(QUEUE_SNAPSHOT_FILE))
}

/// Sidecar feedback file for a plan: `<dir>/<stem>.feedback.json`.
pub fn feedback_path(plan_path: &Path) -> PathBuf {
    let stem = plan_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "plan".to_string());
    plan_path
        .parent()
        .unwrap_or(Path::new("."))
        .join(format!("{stem}.feedback.json"))
}

/// Expand a leading `~` and resolve to an absolute path.
pub fn resolve_plan_path(raw: &str) -> PathBuf {
    let expanded = if let Some(rest) = raw.strip_prefix("~") {
        match home::home_dir() {
            Some(home) => format!("{}{}", home.display(), rest),
            None => raw.to_string(),
        }
    } else {
        raw.to_string()
    };
    let path = PathBuf::from(expanded);
    if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(&path))
            .unwrap_or(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_path_sits_next_to_plan() {
        let p = feedback_path(Path::new("/tmp/plans/auth.md"));
        assert_eq!(p, PathBuf::from("/tmp/plans/auth.feedback.json"));
    }

    #[test]
    fn feedback_path_strips_extension_only() {
        let p = feedback_path(Path::new("/tmp/release.plan.md"));
        assert_eq!(p, PathBuf::from("/tmp/release.plan.feedback.json"));
    }

    #[test]
    fn resolve_keeps_absolute_paths() {
        assert_eq!(resolve_plan_path("/tmp/p.md"), PathBuf::from("/tmp/p.md"));
    }

    #[test]
    fn resolve_expands_tilde() {
        let p = resolve_plan_path("~/p.md");
        assert!(!p.to_string_lossy().starts_with('~'));
        assert!(p.is_absolute());
    }
}
