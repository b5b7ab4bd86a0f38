use crate::catalog::id::{OperationKind, TableRef};
use crate::catalog::permission::{PermissionSpec, RolePermissions};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: None,
        }
    }
}

/// A tracked table with its columns and role permissions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub schema: String,
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub permissions: Vec<RolePermissions>,
}

impl Table {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            columns: Vec::new(),
            permissions: Vec::new(),
        }
    }

    pub fn id(&self) -> TableRef {
        TableRef::new(self.schema.clone(), self.name.clone())
    }

    pub fn is(&self, table: &TableRef) -> bool {
        self.schema == table.schema && self.name == table.name
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn role_permissions(&self, role: &str) -> Option<&RolePermissions> {
        self.permissions.iter().find(|p| p.role_name == role)
    }

    pub fn permission(&self, role: &str, kind: OperationKind) -> Option<&PermissionSpec> {
        self.role_permissions(role)
            .and_then(|p| p.permissions.get(&kind))
    }

    /// Operation kinds `role` currently holds, in kind order.
    pub fn kinds_for(&self, role: &str) -> Vec<OperationKind> {
        self.role_permissions(role)
            .map(|p| p.kinds().collect())
            .unwrap_or_default()
    }

    pub fn set_permission(&mut self, role: &str, kind: OperationKind, spec: PermissionSpec) {
        match self.permissions.iter_mut().find(|p| p.role_name == role) {
            Some(existing) => {
                existing.permissions.insert(kind, spec);
            }
            None => self
                .permissions
                .push(RolePermissions::new(role).with(kind, spec)),
        }
    }

    /// Remove one spec; a role left with nothing is dropped entirely.
    pub fn remove_permission(&mut self, role: &str, kind: OperationKind) -> Option<PermissionSpec> {
        let position = self.permissions.iter().position(|p| p.role_name == role)?;
        let removed = self.permissions[position].permissions.remove(&kind);
        if self.permissions[position].permissions.is_empty() {
            self.permissions.remove(position);
        }
        removed
    }
}
