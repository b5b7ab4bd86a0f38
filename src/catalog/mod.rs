use crate::catalog::id::{PermissionKey, TableRef};
use crate::catalog::permission::PermissionSpec;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

pub mod id;
pub mod permission;
pub mod table;

pub use id::{OperationKind, normalize_role};
pub use permission::{BoolExp, RolePermissions};
pub use table::{Column, Table};

/// Read-only view of the persisted schema.
///
/// Compilers only ever read through this; writes belong to the executor.
pub trait SchemaSnapshot {
    fn table(&self, table: &TableRef) -> Option<&Table>;

    /// Tables of one schema, in snapshot order
    fn tables_in_schema(&self, schema: &str) -> Vec<&Table>;

    fn permission(&self, key: &PermissionKey) -> Option<&PermissionSpec> {
        self.table(&key.table)
            .and_then(|t| t.permission(&key.role, key.kind))
    }
}

/// Snapshot of tracked tables and their permissions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub tables: Vec<Table>,
}

impl Catalog {
    pub fn new(tables: Vec<Table>) -> Self {
        Self { tables }
    }

    /// Load a snapshot file (YAML or JSON).
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading schema snapshot from {}", path.display());
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        let catalog: Catalog = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;
        info!("Loaded {} tables", catalog.tables.len());
        Ok(catalog)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_yaml::to_string(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        Ok(())
    }

    pub fn table_mut(&mut self, table: &TableRef) -> Option<&mut Table> {
        self.tables.iter_mut().find(|t| t.is(table))
    }

    /// Every role holding at least one permission anywhere
    pub fn roles(&self) -> BTreeSet<String> {
        self.tables
            .iter()
            .flat_map(|t| t.permissions.iter().map(|p| p.role_name.clone()))
            .collect()
    }

    /// Store `spec` at `key`. Returns false if the table is unknown.
    pub fn set_permission(&mut self, key: &PermissionKey, spec: PermissionSpec) -> bool {
        match self.table_mut(&key.table) {
            Some(table) => {
                table.set_permission(&key.role, key.kind, spec);
                true
            }
            None => false,
        }
    }

    pub fn remove_permission(&mut self, key: &PermissionKey) -> Option<PermissionSpec> {
        self.table_mut(&key.table)
            .and_then(|t| t.remove_permission(&key.role, key.kind))
    }
}

impl SchemaSnapshot for Catalog {
    fn table(&self, table: &TableRef) -> Option<&Table> {
        self.tables.iter().find(|t| t.is(table))
    }

    fn tables_in_schema(&self, schema: &str) -> Vec<&Table> {
        self.tables.iter().filter(|t| t.schema == schema).collect()
    }
}
