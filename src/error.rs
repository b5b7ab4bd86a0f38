//! Error taxonomy for permission compilation
//!
//! Validation and compilation failures are raised before any operation is
//! built, so a caller that sees one of these knows nothing was submitted.
//! Failures of the executor itself travel as `anyhow::Error`.

use crate::catalog::id::{OperationKind, TableRef};

pub type Result<T, E = PermissionError> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PermissionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Compilation(#[from] CompilationError),

    #[error(
        "Refusing to submit migration with {forward} forward and {backward} backward operations"
    )]
    UnbalancedMigration { forward: usize, backward: usize },
}

/// Rejected input. Nothing has been built yet.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Role name cannot be empty")]
    EmptyRole,

    #[error("No {0} selected")]
    NoTargets(&'static str),

    #[error("Nothing to save for the {0} permission")]
    MissingPermission(OperationKind),

    #[error("Malformed limit for {kind} permission: {reason}")]
    MalformedLimit {
        kind: OperationKind,
        reason: &'static str,
    },

    #[error("'{field}' is not allowed on {kind} permissions")]
    IncompatibleField {
        kind: OperationKind,
        field: &'static str,
    },

    #[error("Invalid target at row {index}: {reason}")]
    InvalidTarget { index: usize, reason: String },

    #[error("Unknown operation kind '{0}' (expected select, insert, update or delete)")]
    UnknownOperationKind(String),

    #[error("Invalid table name '{0}'")]
    InvalidTableName(String),
}

/// The snapshot does not contain something a compiler walked to.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CompilationError {
    #[error("Table {0} not found in schema snapshot")]
    TableNotFound(TableRef),

    #[error("No {kind} permission for role '{role}' on table {table}")]
    PermissionNotFound {
        table: TableRef,
        role: String,
        kind: OperationKind,
    },
}
