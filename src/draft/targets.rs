//! Session-scoped selections for bulk and apply-to-many changes

use crate::catalog::id::{OperationKind, TableRef};
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Roles chosen for a bulk change on one table, in the order they were picked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkSelection {
    roles: Vec<String>,
}

impl BulkSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Roles are stored trimmed, so `" reviewer"` and `"reviewer"` are one pick.
    pub fn select(mut self, role: impl Into<String>) -> Self {
        let role = role.into().trim().to_string();
        if !self.roles.contains(&role) {
            self.roles.push(role);
        }
        self
    }

    pub fn deselect(mut self, role: &str) -> Self {
        let role = role.trim();
        self.roles.retain(|r| r != role);
        self
    }

    pub fn reset(&mut self) {
        self.roles.clear();
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for BulkSelection {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        iter.into_iter().fold(Self::new(), |selection, role| selection.select(role))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplySameField {
    Table,
    Action,
    Role,
}

/// One editable row of the apply-to-many form, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplySameRow {
    pub table: String,
    pub action: String,
    pub role: String,
}

impl ApplySameRow {
    fn is_complete(&self) -> bool {
        !self.table.trim().is_empty()
            && !self.action.trim().is_empty()
            && !self.role.trim().is_empty()
    }
}

/// A resolved (table, operation, role) destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplySameTarget {
    pub table: TableRef,
    pub kind: OperationKind,
    pub role: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplySameList {
    rows: Vec<ApplySameRow>,
}

impl ApplySameList {
    pub fn rows(&self) -> &[ApplySameRow] {
        &self.rows
    }

    /// Set one field of row `index`. Writing to `index == len` appends a row
    /// seeded with `seed_table` and `seed_kind` and an empty role.
    pub fn set(
        mut self,
        index: usize,
        field: ApplySameField,
        value: &str,
        seed_table: &TableRef,
        seed_kind: OperationKind,
    ) -> Result<Self, ValidationError> {
        if index > self.rows.len() {
            return Err(ValidationError::InvalidTarget {
                index,
                reason: format!("only {} rows exist", self.rows.len()),
            });
        }
        if index == self.rows.len() {
            self.rows.push(ApplySameRow {
                table: seed_table.to_string(),
                action: seed_kind.to_string(),
                role: String::new(),
            });
        }

        let row = &mut self.rows[index];
        let slot = match field {
            ApplySameField::Table => &mut row.table,
            ApplySameField::Action => &mut row.action,
            ApplySameField::Role => &mut row.role,
        };
        *slot = value.to_string();
        Ok(self)
    }

    pub fn remove(mut self, index: usize) -> Self {
        if index < self.rows.len() {
            self.rows.remove(index);
        }
        self
    }

    pub fn reset(&mut self) {
        self.rows.clear();
    }

    /// Complete rows, parsed. Incomplete rows are skipped; a complete row
    /// that does not parse is an error.
    pub fn valid_targets(
        &self,
        default_schema: &str,
    ) -> Result<Vec<ApplySameTarget>, ValidationError> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.is_complete())
            .map(|(index, row)| {
                let invalid = |e: ValidationError| ValidationError::InvalidTarget {
                    index,
                    reason: e.to_string(),
                };
                Ok(ApplySameTarget {
                    table: TableRef::parse(&row.table, default_schema).map_err(invalid)?,
                    kind: row.action.parse().map_err(invalid)?,
                    role: row.role.trim().to_string(),
                })
            })
            .collect()
    }
}

impl FromIterator<ApplySameRow> for ApplySameList {
    fn from_iter<T: IntoIterator<Item = ApplySameRow>>(iter: T) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}
