use crate::catalog::id::{PermissionKey, normalize_role};
use crate::diff::CompileContext;
use crate::diff::permissions::{ChangeKind, diff, retarget, strip_disabled_limit};
use crate::draft::{ApplySameTarget, PermissionDraft};
use crate::error::{Result, ValidationError};
use crate::migration::{CompiledMigration, MigrationBuilder, MigrationMessages};
use tracing::debug;

/// Replicate the draft's edited spec onto every complete apply-same row, and
/// onto the draft's own key when the draft was modified.
///
/// A target that already has a spec gets its own drop pair ahead of the
/// create pair, so the whole migration reverts as one unit.
pub fn compile(ctx: &CompileContext<'_>, draft: &PermissionDraft) -> Result<CompiledMigration> {
    let mut targets = draft.apply_same.valid_targets(ctx.schema)?;
    if draft.is_modified() {
        targets.push(ApplySameTarget {
            table: draft.table.clone(),
            kind: draft.kind,
            role: normalize_role(&draft.role)?,
        });
    }
    if targets.is_empty() {
        return Err(ValidationError::NoTargets("targets").into());
    }

    let edited = draft
        .current()
        .cloned()
        .ok_or(ValidationError::MissingPermission(draft.kind))?;
    let edited = strip_disabled_limit(edited, draft.kind, draft.limit_enabled);
    edited.validate(draft.kind, draft.limit_enabled)?;

    // resolve every table up front so a missing one aborts before any diff
    let tables = targets
        .iter()
        .map(|target| ctx.table(&target.table))
        .collect::<Result<Vec<_>, _>>()?;

    let mut builder = MigrationBuilder::new();
    for (target, table) in targets.iter().zip(tables) {
        let key = PermissionKey::new(target.table.clone(), target.role.clone(), target.kind);
        let existing = table.permission(&target.role, target.kind);
        let desired = retarget(&edited, &draft.table, draft.kind, &key);
        debug!("Applying {} permission to {}", draft.kind, key);

        builder.extend(diff(&ctx.ops, &key, existing, None, ChangeKind::Delete));
        builder.extend(diff(&ctx.ops, &key, None, Some(&desired), ChangeKind::Save));
    }

    let name = format!(
        "apply_same_permissions_{}_table_{}",
        draft.table.schema, draft.table.name
    );
    Ok(builder.finish(
        name,
        MigrationMessages::new(
            "Applying permissions",
            "Permission changes applied",
            "Permission changes failed",
        ),
    ))
}
