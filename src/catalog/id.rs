use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Schema-qualified table identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableRef {
    pub schema: String,
    pub name: String,
}

impl TableRef {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Parse `schema.table`, or a bare `table` qualified with `default_schema`.
    pub fn parse(value: &str, default_schema: &str) -> Result<Self, ValidationError> {
        let value = value.trim();
        let (schema, name) = match value.split_once('.') {
            Some((schema, name)) => (schema.trim(), name.trim()),
            None => (default_schema, value),
        };

        if schema.is_empty() || name.is_empty() || name.contains('.') {
            return Err(ValidationError::InvalidTableName(value.to_string()));
        }

        Ok(Self::new(schema, name))
    }

    /// `schema_table`, used inside migration names
    pub fn slug(&self) -> String {
        format!("{}_{}", self.schema, self.name)
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// The CRUD action a permission rule governs.
///
/// Declaration order is the iteration order used by every compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl OperationKind {
    pub const ALL: [OperationKind; 4] = [
        OperationKind::Select,
        OperationKind::Insert,
        OperationKind::Update,
        OperationKind::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Select => "select",
            OperationKind::Insert => "insert",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
        }
    }

    /// Only mutations can be restricted to trusted backends.
    pub fn is_backend_only_compatible(&self) -> bool {
        matches!(
            self,
            OperationKind::Insert | OperationKind::Update | OperationKind::Delete
        )
    }

    /// Name of the predicate slot that is active for this kind.
    pub fn predicate_field(&self) -> &'static str {
        match self {
            OperationKind::Insert => "check",
            _ => "filter",
        }
    }

    pub fn has_columns(&self) -> bool {
        !matches!(self, OperationKind::Delete)
    }

    pub fn has_presets(&self) -> bool {
        matches!(self, OperationKind::Insert | OperationKind::Update)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "select" => Ok(OperationKind::Select),
            "insert" => Ok(OperationKind::Insert),
            "update" => Ok(OperationKind::Update),
            "delete" => Ok(OperationKind::Delete),
            other => Err(ValidationError::UnknownOperationKind(other.to_string())),
        }
    }
}

/// Identifies at most one permission spec in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PermissionKey {
    pub table: TableRef,
    pub role: String,
    pub kind: OperationKind,
}

impl PermissionKey {
    pub fn new(table: TableRef, role: impl Into<String>, kind: OperationKind) -> Self {
        Self {
            table,
            role: role.into(),
            kind,
        }
    }
}

impl fmt::Display for PermissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {} for role {}", self.kind, self.table, self.role)
    }
}

/// Trim a role name and reject it when nothing is left.
pub fn normalize_role(role: &str) -> Result<String, ValidationError> {
    let role = role.trim();
    if role.is_empty() {
        return Err(ValidationError::EmptyRole);
    }
    Ok(role.to_string())
}
