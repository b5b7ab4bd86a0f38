use crate::catalog::id::{OperationKind, PermissionKey, TableRef};
use crate::catalog::permission::PermissionSpec;
use crate::diff::operations::{OperationPair, OperationSource};

/// What a single edit does to its permission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Save,
    Delete,
}

impl ChangeKind {
    /// Verb used in migration names and messages
    pub fn verb(&self) -> &'static str {
        match self {
            ChangeKind::Save => "update",
            ChangeKind::Delete => "delete",
        }
    }
}

/// Diff a single permission.
///
/// A save over an existing spec always drops and recreates, even when nothing
/// changed: the engine cannot alter a permission in place, and each half must
/// be revertible on its own.
pub fn diff(
    ops: &OperationSource<'_>,
    key: &PermissionKey,
    existing: Option<&PermissionSpec>,
    desired: Option<&PermissionSpec>,
    change: ChangeKind,
) -> Vec<OperationPair> {
    let desired = match change {
        ChangeKind::Save => desired,
        ChangeKind::Delete => None,
    };

    match (existing, desired) {
        // CREATE: undone by a drop alone
        (None, Some(new)) => vec![ops.create_pair(key, new)],

        // REPLACE: drop-then-recreate
        (Some(old), Some(new)) => vec![ops.drop_pair(key, old), ops.create_pair(key, new)],

        // DROP: undone by recreating the old spec
        (Some(old), None) => vec![ops.drop_pair(key, old)],

        (None, None) => vec![],
    }
}

/// A select spec whose limit toggle is off carries no limit at all.
pub fn strip_disabled_limit(
    spec: PermissionSpec,
    kind: OperationKind,
    limit_enabled: bool,
) -> PermissionSpec {
    if kind == OperationKind::Select && !limit_enabled {
        spec.without_limit()
    } else {
        spec
    }
}

/// Prepare a spec authored on `(from_table, from_kind)` for `to`.
///
/// The predicate is renamed for the target kind, and column-bound fields are
/// cleared when the target is a different table.
pub fn retarget(
    spec: &PermissionSpec,
    from_table: &TableRef,
    from_kind: OperationKind,
    to: &PermissionKey,
) -> PermissionSpec {
    let spec = spec.clone().translated(from_kind, to.kind);
    if from_table != &to.table {
        spec.without_schema_fields()
    } else {
        spec
    }
}
