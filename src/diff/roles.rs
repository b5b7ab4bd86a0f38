//! Role-wide changes: remove a role from a table, bulk grant/revoke, and
//! global role deletion.

use crate::catalog::id::{OperationKind, PermissionKey, TableRef, normalize_role};
use crate::catalog::permission::PermissionSpec;
use crate::diff::CompileContext;
use crate::diff::permissions::{ChangeKind, diff};
use crate::draft::BulkSelection;
use crate::error::{Result, ValidationError};
use crate::migration::{CompiledMigration, MigrationBuilder, MigrationMessages};
use itertools::Itertools;
use tracing::debug;

pub fn remove_role(
    ctx: &CompileContext<'_>,
    table_ref: &TableRef,
    role: &str,
) -> Result<CompiledMigration> {
    let role = normalize_role(role)?;
    let table = ctx.table(table_ref)?;

    let mut builder = MigrationBuilder::new();
    for kind in table.kinds_for(&role) {
        let key = PermissionKey::new(table_ref.clone(), role.clone(), kind);
        builder.extend(diff(
            &ctx.ops,
            &key,
            table.permission(&role, kind),
            None,
            ChangeKind::Delete,
        ));
    }

    let name = format!(
        "remove_permission_{}_{}_table_{}",
        role, table_ref.schema, table_ref.name
    );
    Ok(builder.finish(
        name,
        MigrationMessages::new(
            "Removing permissions...",
            "Permission removed",
            "Removing permissions failed",
        ),
    ))
}

/// Give every selected role full access for all four operations.
///
/// Existing specs are dropped first; those drops lead the whole migration so
/// no recreate runs while an old spec for the same key is still in place.
pub fn bulk_grant(
    ctx: &CompileContext<'_>,
    table_ref: &TableRef,
    roles: &BulkSelection,
) -> Result<CompiledMigration> {
    let roles = selected_roles(roles)?;
    let table = ctx.table(table_ref)?;
    let columns = table.column_names();

    let mut builder = MigrationBuilder::new();
    for role in &roles {
        for kind in OperationKind::ALL {
            let key = PermissionKey::new(table_ref.clone(), role.clone(), kind);
            let existing = table.permission(role, kind);
            let granted = PermissionSpec::full_access(kind, columns.iter().cloned());

            for pair in diff(&ctx.ops, &key, existing, None, ChangeKind::Delete) {
                builder.add_leading(pair);
            }
            builder.extend(diff(&ctx.ops, &key, None, Some(&granted), ChangeKind::Save));
        }
    }
    debug!("Bulk grant on {} for {} roles", table_ref, roles.len());

    let name = format!(
        "add_permissions_roles_{}_table_{}",
        table_ref.schema, table_ref.name
    );
    Ok(builder.finish(
        name,
        MigrationMessages::new(
            "Adding permissions...",
            "Permissions added",
            "Adding permissions failed",
        ),
    ))
}

pub fn bulk_revoke(
    ctx: &CompileContext<'_>,
    table_ref: &TableRef,
    roles: &BulkSelection,
) -> Result<CompiledMigration> {
    let roles = selected_roles(roles)?;
    let table = ctx.table(table_ref)?;

    let mut builder = MigrationBuilder::new();
    for role in &roles {
        for kind in table.kinds_for(role) {
            let key = PermissionKey::new(table_ref.clone(), role.clone(), kind);
            builder.extend(diff(
                &ctx.ops,
                &key,
                table.permission(role, kind),
                None,
                ChangeKind::Delete,
            ));
        }
    }

    let name = format!("remove_roles_{}_table_{}", table_ref.schema, table_ref.name);
    Ok(builder.finish(
        name,
        MigrationMessages::new(
            "Removing permissions...",
            "Permissions removed",
            "Removing permissions failed",
        ),
    ))
}

/// Drop every spec `role` holds on any table of the current schema.
pub fn delete_role_globally(ctx: &CompileContext<'_>, role: &str) -> Result<CompiledMigration> {
    let role = normalize_role(role)?;

    let mut builder = MigrationBuilder::new();
    for table in ctx.snapshot.tables_in_schema(ctx.schema) {
        for kind in OperationKind::ALL {
            let Some(existing) = table.permission(&role, kind) else {
                continue;
            };
            let key = PermissionKey::new(table.id(), role.clone(), kind);
            builder.extend(diff(&ctx.ops, &key, Some(existing), None, ChangeKind::Delete));
        }
    }
    debug!("Role {} holds {} permissions", role, builder.len());

    Ok(builder.finish(
        format!("delete_role_{}", role),
        MigrationMessages::new("Deleting role", "Role Deleted", "Role deletion failed"),
    ))
}

fn selected_roles(selection: &BulkSelection) -> Result<Vec<String>> {
    if selection.is_empty() {
        return Err(ValidationError::NoTargets("roles").into());
    }
    let roles = selection
        .roles()
        .iter()
        .map(|r| normalize_role(r))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(roles.into_iter().unique().collect())
}
