pub mod lock;

pub use lock::SnapshotLock;

use crate::catalog::Catalog;
use crate::commands::compile::{compile_request, render_summary};
use crate::config::Config;
use crate::executor::{MemoryExecutor, SubmitOutcome, submit, write_migration_files};
use anyhow::{Result, bail};
use console::style;
use dialoguer::Confirm;
use std::path::Path;
use tracing::{debug, info};

/// Execution mode for apply operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Preview the migration without applying it
    DryRun,
    /// Apply without asking
    Force,
    /// Fail instead of prompting (default in non-TTY)
    RequireApproval,
    /// Ask before applying (default in TTY)
    Interactive,
}

/// Outcome of an apply operation, used for exit code determination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The request compiled to an empty migration
    NoChanges,
    Applied,
    DryRun,
    /// User declined the confirmation prompt
    Cancelled,
}

/// Compile a change request, run it against the snapshot and persist the result.
pub async fn cmd_apply(
    config: &Config,
    root_dir: &Path,
    request_file: &Path,
    execution_mode: ExecutionMode,
) -> Result<ApplyOutcome> {
    let _lock = SnapshotLock::acquire(root_dir)?;

    let snapshot_path = config.snapshot_path(root_dir);
    let catalog = Catalog::load(&snapshot_path)?;
    let (change, migration) = compile_request(config, &catalog, request_file)?;

    if migration.is_empty() {
        println!("✅ No permission changes - snapshot is up to date");
        return Ok(ApplyOutcome::NoChanges);
    }

    print!("{}", render_summary(&migration));
    println!();

    match execution_mode {
        ExecutionMode::DryRun => {
            println!("✅ Dry run completed - no changes applied");
            return Ok(ApplyOutcome::DryRun);
        }
        ExecutionMode::RequireApproval => {
            bail!(
                "Refusing to apply {} without confirmation.\n\n💡 Re-run with --yes to apply",
                migration.name
            );
        }
        ExecutionMode::Interactive => {
            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "Apply {} operation{}?",
                    migration.forward.len(),
                    if migration.forward.len() == 1 { "" } else { "s" }
                ))
                .default(false)
                .interact()?;
            if !confirmed {
                println!("Cancelled");
                return Ok(ApplyOutcome::Cancelled);
            }
        }
        ExecutionMode::Force => {}
    }

    let mut executor = MemoryExecutor::new(catalog);
    let outcome = submit(
        &mut executor,
        &migration,
        || println!("✅ {}", style(&migration.messages.success).green()),
        |e| eprintln!("❌ {}: {:#}", style(&migration.messages.failure).red(), e),
    )
    .await?;

    match outcome {
        SubmitOutcome::Applied => {
            executor.catalog().save(&snapshot_path)?;
            info!("Saved snapshot to {}", snapshot_path.display());

            if config.migrations.write_files {
                let version = executor
                    .history()
                    .last()
                    .map(|m| m.version)
                    .unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
                let dir = write_migration_files(
                    &config.migrations_path(root_dir),
                    version,
                    &migration,
                )?;
                println!("📁 {}", dir.display());
            }

            debug!("Follow-up effects: {:?}", change.effects());
            Ok(ApplyOutcome::Applied)
        }
        SubmitOutcome::Skipped => Ok(ApplyOutcome::NoChanges),
        SubmitOutcome::Failed(e) => Err(e.context(migration.messages.failure.clone())),
    }
}
