use crate::migration::CompiledMigration;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Write `<dir>/<version>_<name>/up.yaml` and `down.yaml`.
///
/// Returns the migration directory.
pub fn write_migration_files(
    dir: &Path,
    version: i64,
    migration: &CompiledMigration,
) -> Result<PathBuf> {
    let target = dir.join(format!("{}_{}", version, migration.name));
    fs::create_dir_all(&target)
        .with_context(|| format!("Failed to create {}", target.display()))?;

    let up = serde_yaml::to_string(&migration.forward)?;
    let down = serde_yaml::to_string(&migration.backward)?;
    fs::write(target.join("up.yaml"), up)
        .with_context(|| format!("Failed to write up.yaml in {}", target.display()))?;
    fs::write(target.join("down.yaml"), down)
        .with_context(|| format!("Failed to write down.yaml in {}", target.display()))?;

    info!("Wrote migration files to {}", target.display());
    Ok(target)
}
