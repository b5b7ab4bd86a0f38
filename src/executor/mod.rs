//! Submitting compiled migrations
//!
//! The compilers never talk to a backend. An executor runs the forward list
//! of a [`CompiledMigration`] and, if any operation fails, undoes what it
//! already applied.

pub mod files;
pub mod memory;

pub use files::write_migration_files;
pub use memory::MemoryExecutor;

use crate::error::PermissionError;
use crate::migration::CompiledMigration;
use std::future::Future;
use tracing::{info, warn};

pub trait MigrationExecutor {
    /// Run `migration.forward` in order. On failure the applied prefix must be
    /// reverted before the error is returned.
    fn run(&mut self, migration: &CompiledMigration) -> impl Future<Output = anyhow::Result<()>>;
}

/// How a submitted migration ended
#[derive(Debug)]
pub enum SubmitOutcome {
    Applied,
    /// Nothing to run; the executor was not called
    Skipped,
    Failed(anyhow::Error),
}

impl SubmitOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, SubmitOutcome::Applied)
    }
}

/// Hand a migration to `executor` and invoke exactly one of the callbacks
/// once it settles. Empty migrations are skipped without calling either.
pub async fn submit<E, S, F>(
    executor: &mut E,
    migration: &CompiledMigration,
    on_success: S,
    on_failure: F,
) -> Result<SubmitOutcome, PermissionError>
where
    E: MigrationExecutor,
    S: FnOnce(),
    F: FnOnce(&anyhow::Error),
{
    if !migration.is_balanced() {
        return Err(PermissionError::UnbalancedMigration {
            forward: migration.forward.len(),
            backward: migration.backward.len(),
        });
    }
    if migration.is_empty() {
        info!("Nothing to apply for {}", migration.name);
        return Ok(SubmitOutcome::Skipped);
    }

    info!("{}", migration.messages.pending);
    match executor.run(migration).await {
        Ok(()) => {
            info!("{}", migration.messages.success);
            on_success();
            Ok(SubmitOutcome::Applied)
        }
        Err(e) => {
            warn!("{}: {:#}", migration.messages.failure, e);
            on_failure(&e);
            Ok(SubmitOutcome::Failed(e))
        }
    }
}
