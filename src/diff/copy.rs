use crate::catalog::id::{OperationKind, PermissionKey, TableRef, normalize_role};
use crate::catalog::table::Table;
use crate::diff::CompileContext;
use crate::diff::permissions::{ChangeKind, diff};
use crate::error::{Result, ValidationError};
use crate::migration::{CompiledMigration, MigrationBuilder, MigrationMessages};
use itertools::Itertools;
use tracing::debug;

/// Which tables a role copy covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableScope {
    /// Every table of the current schema
    All,
    One(TableRef),
}

/// Which operations a role copy covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionScope {
    All,
    One(OperationKind),
}

/// Make each destination role hold exactly what `from_role` holds.
///
/// Where the source role has no spec the destination's spec is dropped.
pub fn compile(
    ctx: &CompileContext<'_>,
    from_role: &str,
    scope: &TableScope,
    actions: &ActionScope,
    to_roles: &[String],
) -> Result<CompiledMigration> {
    let from_role = normalize_role(from_role)?;
    let to_roles: Vec<String> = to_roles
        .iter()
        .map(|r| normalize_role(r))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .unique()
        .collect();
    if to_roles.is_empty() {
        return Err(ValidationError::NoTargets("roles").into());
    }

    let tables: Vec<&Table> = match scope {
        TableScope::All => ctx.snapshot.tables_in_schema(ctx.schema),
        TableScope::One(table) => vec![ctx.table(table)?],
    };
    let kinds = match actions {
        ActionScope::All => OperationKind::ALL.to_vec(),
        ActionScope::One(kind) => vec![*kind],
    };

    let mut builder = MigrationBuilder::new();
    for table in &tables {
        for to_role in &to_roles {
            for &kind in &kinds {
                let key = PermissionKey::new(table.id(), to_role.clone(), kind);
                let existing = table.permission(to_role, kind);
                let copied = table.permission(&from_role, kind);

                builder.extend(diff(&ctx.ops, &key, existing, None, ChangeKind::Delete));
                builder.extend(diff(&ctx.ops, &key, None, copied, ChangeKind::Save));
            }
        }
    }
    debug!(
        "Copying {} across {} tables produced {} operations",
        from_role,
        tables.len(),
        builder.len()
    );

    let table_label = match scope {
        TableScope::All => "all".to_string(),
        TableScope::One(table) => table.slug(),
    };
    let action_label = match actions {
        ActionScope::All => "all".to_string(),
        ActionScope::One(kind) => kind.to_string(),
    };
    let name = format!(
        "copy_role_{}_{}_query_permissions_for_{}_table_to_{}",
        from_role,
        action_label,
        table_label,
        to_roles.iter().join("_")
    );

    Ok(builder.finish(
        name,
        MigrationMessages::new(
            "Copying permissions",
            "Permissions copied",
            "Permissions copy failed",
        ),
    ))
}
