//! In-memory edit session for one role on one table
//!
//! Every edit consumes the draft and returns the next one. The snapshot the
//! draft was opened from is never touched.

pub mod targets;

pub use targets::{ApplySameField, ApplySameList, ApplySameRow, ApplySameTarget, BulkSelection};

use crate::catalog::id::{OperationKind, TableRef};
use crate::catalog::permission::{BoolExp, PermissionSpec};
use crate::catalog::table::Table;
use crate::error::ValidationError;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Follow-up the UI performs once a migration succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEffect {
    MarkSaved,
    MarkRemoved,
    ClearRole,
    CloseEditor,
    ResetBulkSelection,
    ResetApplySame,
    ReloadMetadata,
    ReloadInconsistentObjects,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PermissionDraft {
    pub table: TableRef,
    pub role: String,
    /// The operation kind being edited
    pub kind: OperationKind,
    pub specs: BTreeMap<OperationKind, PermissionSpec>,
    /// Specs as they were when the draft was opened
    pub previous: BTreeMap<OperationKind, PermissionSpec>,
    pub limit_enabled: bool,
    pub new_role: Option<String>,
    pub bulk_select: BulkSelection,
    pub apply_same: ApplySameList,
}

impl PermissionDraft {
    /// Start editing `kind` for `role` on `table`.
    pub fn open(table: &Table, role: &str, kind: OperationKind, is_new_role: bool) -> Self {
        let specs = table
            .role_permissions(role)
            .map(|p| p.permissions.clone())
            .unwrap_or_default();

        let limit_enabled = specs
            .get(&OperationKind::Select)
            .is_some_and(|s| s.limit.is_some());

        Self {
            table: table.id(),
            role: role.to_string(),
            kind,
            previous: specs.clone(),
            specs,
            limit_enabled,
            new_role: is_new_role.then(|| role.to_string()),
            bulk_select: BulkSelection::default(),
            apply_same: ApplySameList::default(),
        }
    }

    /// The spec for the edited kind
    pub fn current(&self) -> Option<&PermissionSpec> {
        self.specs.get(&self.kind)
    }

    pub fn previous_spec(&self) -> Option<&PermissionSpec> {
        self.previous.get(&self.kind)
    }

    pub fn is_modified(&self) -> bool {
        self.current() != self.previous_spec()
    }

    fn edit(mut self, f: impl FnOnce(&mut PermissionSpec)) -> Self {
        let kind = self.kind;
        let spec = self
            .specs
            .entry(kind)
            .or_insert_with(|| PermissionSpec::default().with_predicate(kind, empty_predicate()));
        f(spec);
        self
    }

    pub fn set_role(mut self, role: &str) -> Self {
        self.role = role.to_string();
        self
    }

    /// Replace the spec for the edited kind wholesale.
    pub fn set_spec(self, spec: PermissionSpec) -> Self {
        self.edit(|current| *current = spec)
    }

    pub fn set_predicate(self, predicate: BoolExp) -> Self {
        let kind = self.kind;
        self.edit(|spec| *spec = std::mem::take(spec).with_predicate(kind, predicate))
    }

    /// Predicate that lets every row through
    pub fn allow_all(self) -> Self {
        self.set_predicate(empty_predicate())
    }

    pub fn toggle_column(self, column: &str) -> Self {
        self.edit(|spec| {
            if !spec.columns.remove(column) {
                spec.columns.insert(column.to_string());
            }
        })
    }

    pub fn toggle_computed_field(self, field: &str) -> Self {
        self.edit(|spec| {
            if !spec.computed_fields.remove(field) {
                spec.computed_fields.insert(field.to_string());
            }
        })
    }

    /// Select every column and computed field, or clear them all if every
    /// one is already selected.
    pub fn toggle_all_columns(self, columns: &[String], computed_fields: &[String]) -> Self {
        let columns: BTreeSet<String> = columns.iter().cloned().collect();
        let computed_fields: BTreeSet<String> = computed_fields.iter().cloned().collect();
        self.edit(|spec| {
            if spec.columns == columns && spec.computed_fields == computed_fields {
                spec.columns.clear();
                spec.computed_fields.clear();
            } else {
                spec.columns = columns;
                spec.computed_fields = computed_fields;
            }
        })
    }

    pub fn set_limit(self, limit: Option<u64>) -> Self {
        self.edit(|spec| spec.limit = limit)
    }

    pub fn set_limit_enabled(mut self, enabled: bool) -> Self {
        self.limit_enabled = enabled;
        self
    }

    pub fn set_preset(self, column: &str, value: Value) -> Self {
        self.edit(|spec| {
            spec.set.insert(column.to_string(), value);
        })
    }

    pub fn delete_preset(self, column: &str) -> Self {
        self.edit(|spec| {
            spec.set.remove(column);
        })
    }

    pub fn set_allow_upsert(self, allow: bool) -> Self {
        self.edit(|spec| spec.allow_upsert = allow)
    }

    pub fn set_allow_aggregations(self, allow: bool) -> Self {
        self.edit(|spec| spec.allow_aggregations = allow)
    }

    pub fn toggle_backend_only(self) -> Result<Self, ValidationError> {
        if !self.kind.is_backend_only_compatible() {
            return Err(ValidationError::IncompatibleField {
                kind: self.kind,
                field: "backend_only",
            });
        }
        Ok(self.edit(|spec| spec.backend_only = !spec.backend_only))
    }

    pub fn set_comment(self, comment: &str) -> Self {
        let comment = (!comment.is_empty()).then(|| comment.to_string());
        self.edit(|spec| spec.comment = comment)
    }

    /// Drop the spec for the edited kind from the draft.
    pub fn remove_current(mut self) -> Self {
        self.specs.remove(&self.kind);
        self
    }

    pub fn select_bulk(mut self, role: &str, selected: bool) -> Self {
        self.bulk_select = if selected {
            self.bulk_select.select(role)
        } else {
            self.bulk_select.deselect(role)
        };
        self
    }

    pub fn set_apply_same(
        mut self,
        index: usize,
        field: ApplySameField,
        value: &str,
    ) -> Result<Self, ValidationError> {
        self.apply_same = self
            .apply_same
            .set(index, field, value, &self.table, self.kind)?;
        Ok(self)
    }

    pub fn remove_apply_same(mut self, index: usize) -> Self {
        self.apply_same = self.apply_same.remove(index);
        self
    }

    /// Apply the draft-local part of a success follow-up. Effects that belong
    /// to the surrounding UI leave the draft unchanged.
    pub fn apply_effect(mut self, effect: SessionEffect) -> Self {
        match effect {
            SessionEffect::MarkSaved => {
                match self.specs.get(&self.kind) {
                    Some(spec) => {
                        self.previous.insert(self.kind, spec.clone());
                    }
                    None => {
                        self.previous.remove(&self.kind);
                    }
                }
                self.new_role = None;
            }
            SessionEffect::MarkRemoved => {
                self.specs.remove(&self.kind);
                self.previous.remove(&self.kind);
            }
            SessionEffect::ClearRole => self.role.clear(),
            SessionEffect::ResetBulkSelection => self.bulk_select.reset(),
            SessionEffect::ResetApplySame => self.apply_same.reset(),
            SessionEffect::CloseEditor
            | SessionEffect::ReloadMetadata
            | SessionEffect::ReloadInconsistentObjects => {}
        }
        self
    }

    pub fn apply_effects(self, effects: &[SessionEffect]) -> Self {
        effects
            .iter()
            .fold(self, |draft, effect| draft.apply_effect(*effect))
    }
}

fn empty_predicate() -> BoolExp {
    Value::Object(Default::default())
}
