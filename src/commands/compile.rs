use crate::catalog::Catalog;
use crate::commands::request::ChangeRequest;
use crate::config::Config;
use crate::diff::operations::OperationSource;
use crate::diff::{CompileContext, PermissionChange};
use crate::migration::CompiledMigration;
use crate::render::MetadataFactory;
use anyhow::{Context, Result};
use console::style;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Name, messages and operation types
    Summary,
    Json,
    Yaml,
}

/// Load the snapshot and compile one change request against it.
pub fn compile_request(
    config: &Config,
    catalog: &Catalog,
    request_file: &Path,
) -> Result<(PermissionChange, CompiledMigration)> {
    let request = ChangeRequest::load(request_file)?;
    let change = request.into_change(catalog, &config.metadata.schema)?;

    let factory = MetadataFactory::new(config.metadata.driver);
    let ops = OperationSource::new(&factory, &config.metadata.source);
    let ctx = CompileContext::new(catalog, ops, &config.metadata.schema);
    let migration = change
        .compile(&ctx)
        .with_context(|| format!("Failed to compile {} change", change.label()))?;
    Ok((change, migration))
}

pub fn cmd_compile(
    config: &Config,
    root_dir: &Path,
    request_file: &Path,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let catalog = Catalog::load(&config.snapshot_path(root_dir))?;
    let (_, migration) = compile_request(config, &catalog, request_file)?;

    let rendered = match format {
        OutputFormat::Summary => render_summary(&migration),
        OutputFormat::Json => serde_json::to_string_pretty(&migration)?,
        OutputFormat::Yaml => serde_yaml::to_string(&migration)?,
    };

    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote migration {} to {}", migration.name, path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

pub fn render_summary(migration: &CompiledMigration) -> String {
    let mut out = format!(
        "{} {}\n",
        style("Migration").bold(),
        style(&migration.name).cyan()
    );
    if migration.is_empty() {
        out.push_str("  (no changes)\n");
        return out;
    }

    out.push_str(&format!("  {}\n", style("up:").green()));
    for op in &migration.forward {
        out.push_str(&format!("    {}\n", describe_operation(op)));
    }
    out.push_str(&format!("  {}\n", style("down:").yellow()));
    for op in &migration.backward {
        out.push_str(&format!("    {}\n", describe_operation(op)));
    }
    out
}

/// `pg_create_select_permission public.articles user`
fn describe_operation(op: &crate::diff::operations::Operation) -> String {
    let args = &op.args;
    let table = &args["table"];
    let schema = table["schema"]
        .as_str()
        .or_else(|| table["dataset"].as_str())
        .unwrap_or("?");
    let name = table["name"].as_str().unwrap_or("?");
    let role = args["role"].as_str().unwrap_or("?");
    format!("{} {}.{} {}", op.op_type, schema, name, role)
}
