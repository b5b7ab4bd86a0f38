use crate::catalog::id::{OperationKind, TableRef};
use crate::catalog::permission::PermissionSpec;
use crate::catalog::{Catalog, SchemaSnapshot};
use crate::config::Config;
use anyhow::{Result, bail};
use console::style;
use itertools::Itertools;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ShowFormat {
    Text,
    Json,
}

#[derive(Debug, Serialize)]
struct PermissionRow<'a> {
    table: String,
    role: &'a str,
    action: OperationKind,
    permission: &'a PermissionSpec,
}

/// List the permissions in the snapshot, optionally narrowed to one table or role.
pub fn cmd_show(
    config: &Config,
    root_dir: &Path,
    table: Option<&str>,
    role: Option<&str>,
    format: ShowFormat,
) -> Result<()> {
    let catalog = Catalog::load(&config.snapshot_path(root_dir))?;

    let table_ref = table
        .map(|t| TableRef::parse(t, &config.metadata.schema))
        .transpose()?;
    if let Some(table_ref) = &table_ref
        && catalog.table(table_ref).is_none()
    {
        bail!("Table {} not found in schema snapshot", table_ref);
    }

    let rows: Vec<PermissionRow> = catalog
        .tables
        .iter()
        .filter(|t| table_ref.as_ref().is_none_or(|r| t.is(r)))
        .flat_map(|t| {
            t.permissions
                .iter()
                .filter(move |p| role.is_none_or(|r| p.role_name == r))
                .flat_map(move |p| {
                    p.permissions.iter().map(move |(kind, spec)| PermissionRow {
                        table: t.id().to_string(),
                        role: &p.role_name,
                        action: *kind,
                        permission: spec,
                    })
                })
        })
        .collect();

    match format {
        ShowFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        ShowFormat::Text => {
            print_rows(&rows);
            if table_ref.is_none() && role.is_none() {
                println!();
                println!("Roles: {}", catalog.roles().iter().join(", "));
            }
        }
    }
    Ok(())
}

fn print_rows(rows: &[PermissionRow]) {
    if rows.is_empty() {
        println!("No permissions found");
        return;
    }

    for (table, group) in &rows.iter().chunk_by(|r| r.table.clone()) {
        println!("{}", style(&table).bold());
        for row in group {
            println!(
                "  {:<12} {:<7} {}",
                style(row.role).cyan(),
                row.action,
                describe(row.action, row.permission)
            );
        }
    }
}

/// One-line summary like `2 columns, filter, limit 20`
fn describe(kind: OperationKind, spec: &PermissionSpec) -> String {
    let mut parts = Vec::new();
    if kind.has_columns() {
        parts.push(format!("{} columns", spec.columns.len()));
    }
    match spec.predicate(kind) {
        Some(p) if p.as_object().is_some_and(|o| o.is_empty()) => {
            parts.push(format!("{} all rows", kind.predicate_field()))
        }
        Some(_) => parts.push(kind.predicate_field().to_string()),
        None => {}
    }
    if !spec.set.is_empty() {
        parts.push(format!("presets {}", spec.set.keys().join(",")));
    }
    if let Some(limit) = spec.limit {
        parts.push(format!("limit {}", limit));
    }
    if spec.allow_aggregations {
        parts.push("aggregations".to_string());
    }
    if spec.allow_upsert {
        parts.push("upsert".to_string());
    }
    if spec.backend_only {
        parts.push("backend only".to_string());
    }
    if let Some(comment) = &spec.comment {
        parts.push(format!("\"{}\"", comment));
    }
    parts.join(", ")
}
