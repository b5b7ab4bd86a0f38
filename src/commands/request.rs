//! Change-request files
//!
//! A request is one YAML document tagged by `change:`. It names tables and
//! roles the way a user types them and is turned into a [`PermissionChange`]
//! against the loaded snapshot.

use crate::catalog::id::{OperationKind, TableRef, normalize_role};
use crate::catalog::permission::PermissionSpec;
use crate::catalog::{SchemaSnapshot, Table};
use crate::diff::{ActionScope, ChangeKind, PermissionChange, TableScope};
use crate::draft::{ApplySameField, ApplySameRow, BulkSelection, PermissionDraft};
use crate::error::CompilationError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum ChangeRequest {
    Save {
        table: String,
        role: String,
        action: OperationKind,
        permission: PermissionSpec,
        /// Defaults to whether `permission` carries a limit
        #[serde(default)]
        limit_enabled: Option<bool>,
    },
    Delete {
        table: String,
        role: String,
        action: OperationKind,
    },
    RemoveRole {
        table: String,
        role: String,
    },
    BulkGrant {
        table: String,
        roles: Vec<String>,
    },
    BulkRevoke {
        table: String,
        roles: Vec<String>,
    },
    ApplySame {
        table: String,
        role: String,
        action: OperationKind,
        /// Edited spec; the role's current spec is replicated when absent
        #[serde(default)]
        permission: Option<PermissionSpec>,
        #[serde(default)]
        targets: Vec<ApplySameRow>,
    },
    CopyRole {
        from_role: String,
        /// Every table of the current schema when absent
        #[serde(default)]
        table: Option<String>,
        /// Every action when absent
        #[serde(default)]
        action: Option<OperationKind>,
        to_roles: Vec<String>,
    },
    DeleteRole {
        role: String,
    },
}

impl ChangeRequest {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read change request {}", path.display()))?;
        serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse change request {}", path.display()))
    }

    /// Resolve table names against `snapshot` and build the change.
    pub fn into_change(
        self,
        snapshot: &dyn SchemaSnapshot,
        schema: &str,
    ) -> Result<PermissionChange> {
        let change = match self {
            ChangeRequest::Save {
                table,
                role,
                action,
                permission,
                limit_enabled,
            } => {
                let limit_enabled = limit_enabled.unwrap_or(permission.limit.is_some());
                let draft = open_draft(snapshot, &table, schema, &role, action)?
                    .set_spec(permission)
                    .set_limit_enabled(limit_enabled);
                PermissionChange::Single {
                    draft,
                    change: ChangeKind::Save,
                }
            }
            ChangeRequest::Delete {
                table,
                role,
                action,
            } => PermissionChange::Single {
                draft: open_draft(snapshot, &table, schema, &role, action)?,
                change: ChangeKind::Delete,
            },
            ChangeRequest::RemoveRole { table, role } => PermissionChange::RemoveRole {
                table: TableRef::parse(&table, schema)?,
                role,
            },
            ChangeRequest::BulkGrant { table, roles } => PermissionChange::BulkGrant {
                table: TableRef::parse(&table, schema)?,
                roles: roles.into_iter().collect::<BulkSelection>(),
            },
            ChangeRequest::BulkRevoke { table, roles } => PermissionChange::BulkRevoke {
                table: TableRef::parse(&table, schema)?,
                roles: roles.into_iter().collect::<BulkSelection>(),
            },
            ChangeRequest::ApplySame {
                table,
                role,
                action,
                permission,
                targets,
            } => {
                let mut draft = open_draft(snapshot, &table, schema, &role, action)?;
                if let Some(permission) = permission {
                    let limit_enabled = permission.limit.is_some();
                    draft = draft.set_spec(permission).set_limit_enabled(limit_enabled);
                } else if draft.current().is_none() {
                    return Err(CompilationError::PermissionNotFound {
                        table: draft.table.clone(),
                        role: draft.role.clone(),
                        kind: action,
                    }
                    .into());
                }
                for (index, row) in targets.iter().enumerate() {
                    draft = draft
                        .set_apply_same(index, ApplySameField::Table, &row.table)?
                        .set_apply_same(index, ApplySameField::Action, &row.action)?
                        .set_apply_same(index, ApplySameField::Role, &row.role)?;
                }
                PermissionChange::ApplyToMany { draft }
            }
            ChangeRequest::CopyRole {
                from_role,
                table,
                action,
                to_roles,
            } => PermissionChange::CopyRole {
                from_role,
                tables: match table {
                    Some(table) => TableScope::One(TableRef::parse(&table, schema)?),
                    None => TableScope::All,
                },
                actions: action.map_or(ActionScope::All, ActionScope::One),
                to_roles,
            },
            ChangeRequest::DeleteRole { role } => PermissionChange::DeleteRoleGlobally { role },
        };
        Ok(change)
    }
}

fn open_draft(
    snapshot: &dyn SchemaSnapshot,
    table: &str,
    schema: &str,
    role: &str,
    action: OperationKind,
) -> Result<PermissionDraft> {
    let table_ref = TableRef::parse(table, schema)?;
    let table: &Table = snapshot
        .table(&table_ref)
        .ok_or(CompilationError::TableNotFound(table_ref))?;
    let role = normalize_role(role)?;
    let is_new_role = table.role_permissions(&role).is_none();
    Ok(PermissionDraft::open(table, &role, action, is_new_role))
}
