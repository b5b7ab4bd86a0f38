use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// A lock older than this is assumed to belong to a crashed run
const STALE_AFTER: Duration = Duration::from_secs(10 * 60);

/// Guards the snapshot file against concurrent applies. Released on drop.
pub struct SnapshotLock {
    lock_file_path: PathBuf,
}

impl SnapshotLock {
    pub fn acquire(root_dir: &Path) -> Result<Self> {
        let lock_file_path = root_dir.join(".permshift_apply.lock");
        if lock_file_path.exists() {
            let elapsed = fs::metadata(&lock_file_path)
                .and_then(|m| m.modified())
                .ok()
                .and_then(|modified| modified.elapsed().ok());
            match elapsed {
                Some(elapsed) if elapsed > STALE_AFTER => {
                    warn!("Removing stale lock file {}", lock_file_path.display());
                    let _ = fs::remove_file(&lock_file_path);
                }
                _ => bail!(
                    "Another permshift apply is currently running.\n\n💡 If you're sure no other apply is running, remove: {}",
                    lock_file_path.display()
                ),
            }
        }

        let lock_content = format!(
            "PID: {}\nStarted: {}",
            std::process::id(),
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        );
        fs::write(&lock_file_path, lock_content)
            .with_context(|| format!("Failed to create lock file {}", lock_file_path.display()))?;
        Ok(Self { lock_file_path })
    }

    pub fn path(&self) -> &Path {
        &self.lock_file_path
    }
}

impl Drop for SnapshotLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_file_path);
    }
}
