use crate::catalog::id::{PermissionKey, normalize_role};
use crate::diff::permissions::{ChangeKind, diff, strip_disabled_limit};
use crate::diff::CompileContext;
use crate::draft::PermissionDraft;
use crate::error::{Result, ValidationError};
use crate::migration::{CompiledMigration, MigrationBuilder, MigrationMessages};
use tracing::debug;

/// Save or delete the permission the draft is editing.
pub fn compile(
    ctx: &CompileContext<'_>,
    draft: &PermissionDraft,
    change: ChangeKind,
) -> Result<CompiledMigration> {
    let role = normalize_role(&draft.role)?;
    let kind = draft.kind;

    let desired = match change {
        ChangeKind::Save => {
            let spec = draft
                .current()
                .cloned()
                .ok_or(ValidationError::MissingPermission(kind))?;
            let spec = strip_disabled_limit(spec, kind, draft.limit_enabled);
            spec.validate(kind, draft.limit_enabled)?;
            Some(spec)
        }
        ChangeKind::Delete => None,
    };

    let table = ctx.table(&draft.table)?;
    let key = PermissionKey::new(draft.table.clone(), role.clone(), kind);
    let existing = table.permission(&role, kind);
    debug!(
        "{} {}: existing={} desired={}",
        change.verb(),
        key,
        existing.is_some(),
        desired.is_some()
    );

    let mut builder = MigrationBuilder::new();
    builder.extend(diff(&ctx.ops, &key, existing, desired.as_ref(), change));

    let name = format!(
        "{}_permission_{}_{}_table_{}",
        change.verb(),
        role,
        draft.table.schema,
        draft.table.name
    );
    Ok(builder.finish(name, messages(change)))
}

fn messages(change: ChangeKind) -> MigrationMessages {
    match change {
        ChangeKind::Save => MigrationMessages::new(
            "Updating permissions...",
            "Permissions updated",
            "Updating permissions failed",
        ),
        ChangeKind::Delete => MigrationMessages::new(
            "Deleting permissions...",
            "Permissions deleted",
            "Deleting permissions failed",
        ),
    }
}
