//! Compile permission changes into reversible migrations
//!
//! Each user-facing change walks its set of (table, role, operation) triples,
//! asks [`permissions::diff`] for the operation pairs of every triple, and
//! collects them in one [`MigrationBuilder`](crate::migration::MigrationBuilder).
//! All validation and snapshot lookups happen before the first pair is built.

pub mod apply_same;
pub mod copy;
pub mod operations;
pub mod permissions;
pub mod roles;
pub mod single;

pub use copy::{ActionScope, TableScope};
pub use permissions::{ChangeKind, diff};

use crate::catalog::id::TableRef;
use crate::catalog::{SchemaSnapshot, Table};
use crate::diff::operations::OperationSource;
use crate::draft::{BulkSelection, PermissionDraft, SessionEffect};
use crate::error::{CompilationError, Result};
use crate::migration::CompiledMigration;
use tracing::info;

/// Everything a compiler reads. Passed explicitly into every call.
#[derive(Clone, Copy)]
pub struct CompileContext<'a> {
    pub snapshot: &'a dyn SchemaSnapshot,
    pub ops: OperationSource<'a>,
    /// Schema that bare table names and "all tables" refer to
    pub schema: &'a str,
}

impl<'a> CompileContext<'a> {
    pub fn new(
        snapshot: &'a dyn SchemaSnapshot,
        ops: OperationSource<'a>,
        schema: &'a str,
    ) -> Self {
        Self {
            snapshot,
            ops,
            schema,
        }
    }

    pub fn table(&self, table: &TableRef) -> Result<&'a Table, CompilationError> {
        let snapshot: &'a dyn SchemaSnapshot = self.snapshot;
        snapshot
            .table(table)
            .ok_or_else(|| CompilationError::TableNotFound(table.clone()))
    }
}

/// A user edit, one variant per compiler.
#[derive(Debug, Clone)]
pub enum PermissionChange {
    /// Save or delete the draft's edited permission
    Single {
        draft: PermissionDraft,
        change: ChangeKind,
    },
    /// Drop every permission one role has on one table
    RemoveRole { table: TableRef, role: String },
    /// Grant full access for every operation to the selected roles
    BulkGrant {
        table: TableRef,
        roles: BulkSelection,
    },
    /// Drop every permission the selected roles have on one table
    BulkRevoke {
        table: TableRef,
        roles: BulkSelection,
    },
    /// Replicate the draft's edited permission onto its apply-same targets
    ApplyToMany { draft: PermissionDraft },
    /// Copy one role's permissions onto other roles
    CopyRole {
        from_role: String,
        tables: TableScope,
        actions: ActionScope,
        to_roles: Vec<String>,
    },
    /// Drop every permission of a role across the schema
    DeleteRoleGlobally { role: String },
}

impl PermissionChange {
    pub fn compile(&self, ctx: &CompileContext<'_>) -> Result<CompiledMigration> {
        info!("Compiling {} change", self.label());
        let migration = match self {
            PermissionChange::Single { draft, change } => single::compile(ctx, draft, *change)?,
            PermissionChange::RemoveRole { table, role } => roles::remove_role(ctx, table, role)?,
            PermissionChange::BulkGrant { table, roles } => roles::bulk_grant(ctx, table, roles)?,
            PermissionChange::BulkRevoke { table, roles } => {
                roles::bulk_revoke(ctx, table, roles)?
            }
            PermissionChange::ApplyToMany { draft } => apply_same::compile(ctx, draft)?,
            PermissionChange::CopyRole {
                from_role,
                tables,
                actions,
                to_roles,
            } => copy::compile(ctx, from_role, tables, actions, to_roles)?,
            PermissionChange::DeleteRoleGlobally { role } => {
                roles::delete_role_globally(ctx, role)?
            }
        };
        info!(
            "Compiled migration {} with {} operations",
            migration.name,
            migration.forward.len()
        );
        Ok(migration)
    }

    /// What the editor does after this change was applied successfully
    pub fn effects(&self) -> &'static [SessionEffect] {
        use SessionEffect::*;
        match self {
            PermissionChange::Single {
                change: ChangeKind::Save,
                ..
            } => &[
                MarkSaved,
                ClearRole,
                CloseEditor,
                ReloadMetadata,
                ReloadInconsistentObjects,
            ],
            PermissionChange::Single {
                change: ChangeKind::Delete,
                ..
            } => &[
                MarkRemoved,
                ClearRole,
                CloseEditor,
                ReloadMetadata,
                ReloadInconsistentObjects,
            ],
            PermissionChange::RemoveRole { .. } => {
                &[MarkRemoved, ClearRole, CloseEditor, ReloadMetadata]
            }
            PermissionChange::BulkGrant { .. } | PermissionChange::BulkRevoke { .. } => {
                &[ClearRole, CloseEditor, ResetBulkSelection, ReloadMetadata]
            }
            PermissionChange::ApplyToMany { .. } => {
                &[ClearRole, CloseEditor, ResetApplySame, ReloadMetadata]
            }
            PermissionChange::CopyRole { .. } | PermissionChange::DeleteRoleGlobally { .. } => {
                &[ReloadMetadata]
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PermissionChange::Single {
                change: ChangeKind::Save,
                ..
            } => "save",
            PermissionChange::Single {
                change: ChangeKind::Delete,
                ..
            } => "delete",
            PermissionChange::RemoveRole { .. } => "remove-role",
            PermissionChange::BulkGrant { .. } => "bulk-grant",
            PermissionChange::BulkRevoke { .. } => "bulk-revoke",
            PermissionChange::ApplyToMany { .. } => "apply-to-many",
            PermissionChange::CopyRole { .. } => "copy-role",
            PermissionChange::DeleteRoleGlobally { .. } => "delete-role-globally",
        }
    }
}
