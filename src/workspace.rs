// ABOUTME: Local project directory preparation before a create run.
// ABOUTME: Backs up a previous run's directory and saves the effective cluster spec.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;

use crate::config::ClusterSpec;
use crate::error::Result;

/// File the effective spec is saved to inside the project directory.
pub const SAVED_SPEC_FILENAME: &str = "config.yml";

/// Backup directory name for `project` taken at `now`.
pub fn backup_name(project: &str, now: &DateTime<Local>) -> String {
    format!("{project}-backup-{}", now.format("%Y%m%d-%H%M%S"))
}

/// Give `spec` a fresh project directory.
///
/// An existing directory is renamed to a timestamped backup next to it.
/// Returns the backup path when one was made.
pub fn prepare_project_dir(spec: &ClusterSpec, now: DateTime<Local>) -> Result<Option<PathBuf>> {
    let dir = spec.project_dir();
    let mut backup = None;

    if dir.exists() {
        let target = backup_path(&dir, &backup_name(spec.project.as_str(), &now));
        info!(from = %dir.display(), to = %target.display(), "backing up project directory");
        fs::rename(&dir, &target)?;
        backup = Some(target);
    }

    fs::create_dir_all(&dir)?;
    fs::write(dir.join(SAVED_SPEC_FILENAME), spec.to_yaml()?)?;

    Ok(backup)
}

fn backup_path(dir: &Path, name: &str) -> PathBuf {
    match dir.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn backup_name_uses_sortable_timestamp() {
        let now = Local.with_ymd_and_hms(2026, 3, 7, 14, 5, 9).unwrap();
        assert_eq!(backup_name("demo", &now), "demo-backup-20260307-140509");
    }

    #[test]
    fn existing_dir_is_moved_aside() {
        let root = tempfile::tempdir().unwrap();
        let mut spec = ClusterSpec::from_yaml("project: demo\nhosts:\n  - name: web\n").unwrap();
        spec.projects_dir = root.path().to_path_buf();

        assert!(prepare_project_dir(&spec, Local::now()).unwrap().is_none());
        fs::write(spec.project_dir().join("demo_ssh"), "old key").unwrap();

        let now = Local.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let backup = prepare_project_dir(&spec, now).unwrap().unwrap();

        assert_eq!(backup, root.path().join("demo-backup-20260102-030405"));
        assert!(backup.join("demo_ssh").exists());
        assert!(!spec.project_dir().join("demo_ssh").exists());
        assert!(spec.project_dir().join(SAVED_SPEC_FILENAME).exists());
    }
}
