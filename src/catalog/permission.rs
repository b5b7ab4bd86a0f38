use crate::catalog::id::OperationKind;
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Boolean predicate tree, kept opaque (`{"author_id": {"_eq": "X-Hasura-User-Id"}}`)
pub type BoolExp = Value;

/// One role's declared rule for one operation on one table.
///
/// `filter` and `check` are the same logical slot: insert rules use `check`,
/// everything else uses `filter`. Only the slot matching the kind is active.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PermissionSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<BoolExp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check: Option<BoolExp>,

    /// Explicit column list. Empty does not mean "all columns".
    #[serde(default)]
    pub columns: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub computed_fields: BTreeSet<String>,

    /// Column presets (insert/update)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub set: BTreeMap<String, Value>,

    /// Row limit (select), present only while limiting is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub allow_aggregations: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub allow_upsert: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub backend_only: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl PermissionSpec {
    /// Template used when granting full access in bulk: an always-true
    /// predicate and every column of the table.
    pub fn full_access<I, S>(kind: OperationKind, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut spec =
            PermissionSpec::default().with_predicate(kind, Value::Object(Default::default()));
        if kind.has_columns() {
            spec.columns = columns.into_iter().map(Into::into).collect();
        }
        spec
    }

    /// The predicate active for `kind`
    pub fn predicate(&self, kind: OperationKind) -> Option<&BoolExp> {
        match kind {
            OperationKind::Insert => self.check.as_ref(),
            _ => self.filter.as_ref(),
        }
    }

    pub fn with_predicate(mut self, kind: OperationKind, predicate: BoolExp) -> Self {
        match kind {
            OperationKind::Insert => self.check = Some(predicate),
            _ => self.filter = Some(predicate),
        }
        self
    }

    /// Re-target a spec authored for `from` onto `to`.
    ///
    /// The active predicate moves to the slot `to` reads, the other slot is
    /// left empty, and fields `to` cannot carry are dropped.
    pub fn translated(self, from: OperationKind, to: OperationKind) -> Self {
        if from == to {
            return self;
        }

        let mut spec = self;
        let predicate = match from {
            OperationKind::Insert => spec.check.take(),
            _ => spec.filter.take(),
        };
        spec.filter = None;
        spec.check = None;
        if let Some(predicate) = predicate {
            spec = spec.with_predicate(to, predicate);
        }

        if to != OperationKind::Select {
            spec.limit = None;
            spec.allow_aggregations = false;
            spec.computed_fields.clear();
        }
        if !to.has_columns() {
            spec.columns.clear();
        }
        if !to.has_presets() {
            spec.set.clear();
        }
        if to != OperationKind::Insert {
            spec.allow_upsert = false;
        }
        if !to.is_backend_only_compatible() {
            spec.backend_only = false;
        }
        spec
    }

    /// Drop the fields that name columns of a particular table.
    pub fn without_schema_fields(mut self) -> Self {
        self.columns.clear();
        self.computed_fields.clear();
        self.set.clear();
        self
    }

    pub fn without_limit(mut self) -> Self {
        self.limit = None;
        self
    }

    pub fn validate(
        &self,
        kind: OperationKind,
        limit_enabled: bool,
    ) -> Result<(), ValidationError> {
        if kind == OperationKind::Select && limit_enabled && self.limit.is_none() {
            return Err(ValidationError::MalformedLimit {
                kind,
                reason: "limit is enabled but has no value",
            });
        }
        if kind != OperationKind::Select {
            if self.limit.is_some() {
                return Err(ValidationError::MalformedLimit {
                    kind,
                    reason: "only select permissions can be limited",
                });
            }
            if self.allow_aggregations {
                return Err(ValidationError::IncompatibleField {
                    kind,
                    field: "allow_aggregations",
                });
            }
        }
        if self.backend_only && !kind.is_backend_only_compatible() {
            return Err(ValidationError::IncompatibleField {
                kind,
                field: "backend_only",
            });
        }
        if !self.set.is_empty() && !kind.has_presets() {
            return Err(ValidationError::IncompatibleField { kind, field: "set" });
        }
        if self.allow_upsert && kind != OperationKind::Insert {
            return Err(ValidationError::IncompatibleField {
                kind,
                field: "allow_upsert",
            });
        }
        Ok(())
    }
}

/// All specs one role holds on one table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RolePermissions {
    pub role_name: String,
    #[serde(default)]
    pub permissions: BTreeMap<OperationKind, PermissionSpec>,
}

impl RolePermissions {
    pub fn new(role_name: impl Into<String>) -> Self {
        Self {
            role_name: role_name.into(),
            permissions: BTreeMap::new(),
        }
    }

    pub fn with(mut self, kind: OperationKind, spec: PermissionSpec) -> Self {
        self.permissions.insert(kind, spec);
        self
    }

    pub fn kinds(&self) -> impl Iterator<Item = OperationKind> + '_ {
        self.permissions.keys().copied()
    }
}
