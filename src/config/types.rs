use crate::render::Driver;
use clap::Args;
use serde::{Deserialize, Serialize};

/// Raw configuration input - all fields Optional for merging
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConfigInput {
    pub metadata: Option<MetadataInput>,
    pub migrations: Option<MigrationsInput>,
}

/// Resolved configuration with all defaults applied
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub metadata: Metadata,
    pub migrations: Migrations,
}

// Metadata source configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MetadataInput {
    pub source: Option<String>,
    pub driver: Option<Driver>,
    pub schema: Option<String>,
    pub snapshot_file: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Metadata {
    /// Data source name every operation targets
    pub source: String,
    pub driver: Driver,
    /// Schema for bare table names and schema-wide changes
    pub schema: String,
    pub snapshot_file: String,
}

// Migration output configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MigrationsInput {
    pub dir: Option<String>,
    pub write_files: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct Migrations {
    pub dir: String,
    /// Write up/down files for every applied migration
    pub write_files: bool,
}

// CLI argument structures

#[derive(Debug, Clone, Default, Args)]
pub struct MetadataArgs {
    #[arg(long, help = "Data source name")]
    pub source: Option<String>,

    #[arg(long, value_enum, help = "Data source driver")]
    pub driver: Option<Driver>,

    #[arg(long, help = "Default schema for table names")]
    pub schema: Option<String>,

    #[arg(long, help = "Metadata snapshot file path")]
    pub snapshot_file: Option<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct MigrationArgs {
    #[arg(long, help = "Migrations directory path")]
    pub migrations_dir: Option<String>,

    #[arg(long, help = "Do not write migration files")]
    pub no_write_files: bool,
}

impl From<MetadataArgs> for MetadataInput {
    fn from(args: MetadataArgs) -> Self {
        MetadataInput {
            source: args.source,
            driver: args.driver,
            schema: args.schema,
            snapshot_file: args.snapshot_file,
        }
    }
}

impl From<MigrationArgs> for MigrationsInput {
    fn from(args: MigrationArgs) -> Self {
        MigrationsInput {
            dir: args.migrations_dir,
            write_files: args.no_write_files.then_some(false),
        }
    }
}
