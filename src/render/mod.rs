//! Metadata API rendering of permission operations

use crate::catalog::id::{OperationKind, PermissionKey, TableRef};
use crate::catalog::permission::PermissionSpec;
use crate::diff::operations::{Operation, OperationFactory};
use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Data source driver; decides the operation prefix and table addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    #[default]
    Postgres,
    Citus,
    Cockroach,
    Mssql,
    Bigquery,
}

impl Driver {
    pub fn prefix(&self) -> &'static str {
        match self {
            Driver::Postgres => "pg",
            Driver::Citus => "citus",
            Driver::Cockroach => "cockroach",
            Driver::Mssql => "mssql",
            Driver::Bigquery => "bigquery",
        }
    }

    fn table_def(&self, table: &TableRef) -> Value {
        match self {
            Driver::Bigquery => json!({ "dataset": table.schema, "name": table.name }),
            _ => json!({ "schema": table.schema, "name": table.name }),
        }
    }
}

/// Default factory producing `<prefix>_create_<kind>_permission` and
/// `<prefix>_drop_<kind>_permission` calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataFactory {
    pub driver: Driver,
}

impl MetadataFactory {
    pub fn new(driver: Driver) -> Self {
        Self { driver }
    }
}

impl OperationFactory for MetadataFactory {
    fn build_apply(
        &self,
        kind: OperationKind,
        table: &TableRef,
        role: &str,
        spec: &PermissionSpec,
        source: &str,
    ) -> Operation {
        // The comment travels next to the permission, not inside it
        let mut permission = spec.clone();
        let comment = permission.comment.take();

        let mut args = Map::new();
        args.insert("source".to_string(), json!(source));
        args.insert("table".to_string(), self.driver.table_def(table));
        args.insert("role".to_string(), json!(role));
        // PermissionSpec has only string map keys, so it always serializes
        let permission = serde_json::to_value(&permission).unwrap_or_default();
        args.insert("permission".to_string(), permission);
        if let Some(comment) = comment {
            args.insert("comment".to_string(), json!(comment));
        }

        Operation::new(
            format!("{}_create_{}_permission", self.driver.prefix(), kind),
            Value::Object(args),
        )
    }

    fn build_revoke(
        &self,
        kind: OperationKind,
        table: &TableRef,
        role: &str,
        source: &str,
    ) -> Operation {
        Operation::new(
            format!("{}_drop_{}_permission", self.driver.prefix(), kind),
            json!({
                "source": source,
                "table": self.driver.table_def(table),
                "role": role,
            }),
        )
    }
}

/// A metadata operation read back into permission terms.
#[derive(Debug, Clone, PartialEq)]
pub enum PermissionOperation {
    Create {
        key: PermissionKey,
        spec: PermissionSpec,
    },
    Drop {
        key: PermissionKey,
    },
}

impl PermissionOperation {
    pub fn key(&self) -> &PermissionKey {
        match self {
            PermissionOperation::Create { key, .. } | PermissionOperation::Drop { key } => key,
        }
    }
}

/// Parse an operation built by [`MetadataFactory`] for any driver.
pub fn decode_operation(operation: &Operation) -> Result<PermissionOperation> {
    let op_type = operation.op_type.as_str();
    let body = op_type
        .strip_suffix("_permission")
        .ok_or_else(|| anyhow!("Not a permission operation: {}", op_type))?;
    let (action, kind) = body
        .rsplit_once('_')
        .ok_or_else(|| anyhow!("Malformed operation type: {}", op_type))?;
    let kind: OperationKind = kind
        .parse()
        .with_context(|| format!("Malformed operation type: {}", op_type))?;

    let args = &operation.args;
    let table = args.get("table").context("Operation is missing 'table'")?;
    let schema = table
        .get("schema")
        .or_else(|| table.get("dataset"))
        .and_then(Value::as_str)
        .context("Operation table has no schema")?;
    let name = table
        .get("name")
        .and_then(Value::as_str)
        .context("Operation table has no name")?;
    let role = args
        .get("role")
        .and_then(Value::as_str)
        .context("Operation is missing 'role'")?;
    let key = PermissionKey::new(TableRef::new(schema, name), role, kind);

    if action.ends_with("_create") {
        let mut spec: PermissionSpec = match args.get("permission") {
            Some(permission) => serde_json::from_value(permission.clone())
                .with_context(|| format!("Invalid permission in {}", op_type))?,
            None => PermissionSpec::default(),
        };
        spec.comment = args
            .get("comment")
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(PermissionOperation::Create { key, spec })
    } else if action.ends_with("_drop") {
        Ok(PermissionOperation::Drop { key })
    } else {
        bail!("Unsupported permission operation: {}", op_type)
    }
}
