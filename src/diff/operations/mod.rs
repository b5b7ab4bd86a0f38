//! Transport-level operations and the factory that builds them
//!
//! The compiler never looks inside an `Operation`; it only asks an
//! `OperationFactory` for the apply/revoke pair of a permission and keeps the
//! two sides together.

use crate::catalog::id::{OperationKind, PermissionKey, TableRef};
use crate::catalog::permission::PermissionSpec;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single metadata API call, e.g. `pg_create_select_permission`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "type")]
    pub op_type: String,
    pub args: Value,
}

impl Operation {
    pub fn new(op_type: impl Into<String>, args: Value) -> Self {
        Self {
            op_type: op_type.into(),
            args,
        }
    }
}

/// Builds idempotent apply/revoke operations for one data source driver.
///
/// `build_revoke` must undo exactly what the matching `build_apply` did.
pub trait OperationFactory {
    fn build_apply(
        &self,
        kind: OperationKind,
        table: &TableRef,
        role: &str,
        spec: &PermissionSpec,
        source: &str,
    ) -> Operation;

    fn build_revoke(
        &self,
        kind: OperationKind,
        table: &TableRef,
        role: &str,
        source: &str,
    ) -> Operation;
}

/// A forward operation and the operation that undoes it.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationPair {
    pub forward: Operation,
    pub backward: Operation,
}

/// Factory plus the data source every operation targets.
#[derive(Clone, Copy)]
pub struct OperationSource<'a> {
    pub factory: &'a dyn OperationFactory,
    pub source: &'a str,
}

impl<'a> OperationSource<'a> {
    pub fn new(factory: &'a dyn OperationFactory, source: &'a str) -> Self {
        Self { factory, source }
    }

    /// forward = create(spec), backward = drop(key)
    pub fn create_pair(&self, key: &PermissionKey, spec: &PermissionSpec) -> OperationPair {
        OperationPair {
            forward: self.apply(key, spec),
            backward: self.revoke(key),
        }
    }

    /// forward = drop(key), backward = create(existing)
    pub fn drop_pair(&self, key: &PermissionKey, existing: &PermissionSpec) -> OperationPair {
        OperationPair {
            forward: self.revoke(key),
            backward: self.apply(key, existing),
        }
    }

    fn apply(&self, key: &PermissionKey, spec: &PermissionSpec) -> Operation {
        self.factory
            .build_apply(key.kind, &key.table, &key.role, spec, self.source)
    }

    fn revoke(&self, key: &PermissionKey) -> Operation {
        self.factory
            .build_revoke(key.kind, &key.table, &key.role, self.source)
    }
}
