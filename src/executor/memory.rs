use super::MigrationExecutor;
use crate::catalog::{Catalog, SchemaSnapshot};
use crate::diff::operations::Operation;
use crate::migration::CompiledMigration;
use crate::render::{PermissionOperation, decode_operation};
use anyhow::{Context, Result, bail};
use chrono::Utc;
use tracing::{debug, warn};

/// A migration that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMigration {
    /// Millisecond timestamp, strictly increasing per executor
    pub version: i64,
    pub name: String,
}

/// Applies metadata operations to an in-memory [`Catalog`].
///
/// Dropping a permission that is not there is a no-op, as is creating one
/// that already exists with identical contents. Creating over a different
/// spec fails, like the metadata API does.
#[derive(Debug, Clone, Default)]
pub struct MemoryExecutor {
    catalog: Catalog,
    history: Vec<AppliedMigration>,
}

impl MemoryExecutor {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            history: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn into_catalog(self) -> Catalog {
        self.catalog
    }

    pub fn history(&self) -> &[AppliedMigration] {
        &self.history
    }

    fn apply(&mut self, operation: &Operation) -> Result<()> {
        match decode_operation(operation)? {
            PermissionOperation::Create { key, spec } => {
                match self.catalog.permission(&key) {
                    Some(existing) if *existing == spec => {
                        debug!("{} already present", key);
                        return Ok(());
                    }
                    Some(_) => bail!("Permission {} already exists", key),
                    None => {}
                }
                if !self.catalog.set_permission(&key, spec) {
                    bail!("Table {} is not tracked", key.table);
                }
            }
            PermissionOperation::Drop { key } => {
                if self.catalog.remove_permission(&key).is_none() {
                    debug!("{} was not present", key);
                }
            }
        }
        Ok(())
    }

    fn next_version(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        match self.history.last() {
            Some(last) if last.version >= now => last.version + 1,
            _ => now,
        }
    }
}

impl MigrationExecutor for MemoryExecutor {
    async fn run(&mut self, migration: &CompiledMigration) -> Result<()> {
        for (index, operation) in migration.forward.iter().enumerate() {
            debug!(
                "Applying {} ({}/{})",
                operation.op_type,
                index + 1,
                migration.forward.len()
            );
            if let Err(e) = self.apply(operation) {
                // undo exactly the applied prefix, newest first
                let start = migration.backward.len().saturating_sub(index);
                for undo in &migration.backward[start..] {
                    if let Err(undo_err) = self.apply(undo) {
                        warn!("Rollback of {} failed: {:#}", undo.op_type, undo_err);
                    }
                }
                return Err(e).with_context(|| {
                    format!(
                        "Migration {} failed at operation {}",
                        migration.name,
                        index + 1
                    )
                });
            }
        }

        let version = self.next_version();
        self.history.push(AppliedMigration {
            version,
            name: migration.name.clone(),
        });
        Ok(())
    }
}
