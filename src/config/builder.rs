use crate::config::{merge::Merge, types::*};
use anyhow::{Result, bail};

/// Environment fallback for the snapshot file when neither file nor CLI set it
pub const SNAPSHOT_ENV: &str = "PERMSHIFT_SNAPSHOT";

pub struct ConfigBuilder {
    config_input: ConfigInput,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config_input: ConfigInput::default(),
        }
    }

    pub fn with_file(mut self, file_input: ConfigInput) -> Self {
        self.config_input = self.config_input.merge(file_input);
        self
    }

    pub fn with_cli_args(mut self, cli_input: ConfigInput) -> Self {
        self.config_input = self.config_input.merge(cli_input);
        self
    }

    pub fn resolve(self) -> Result<Config> {
        let defaults = Config::default();

        Ok(Config {
            metadata: self.resolve_metadata(&defaults.metadata)?,
            migrations: self.resolve_migrations(&defaults.migrations),
        })
    }

    fn resolve_metadata(&self, defaults: &Metadata) -> Result<Metadata> {
        let input = self.config_input.metadata.as_ref();

        let source = input
            .and_then(|m| m.source.as_ref())
            .cloned()
            .unwrap_or_else(|| defaults.source.clone());
        if source.trim().is_empty() {
            bail!("metadata.source cannot be empty");
        }

        let schema = input
            .and_then(|m| m.schema.as_ref())
            .cloned()
            .unwrap_or_else(|| defaults.schema.clone());
        if schema.trim().is_empty() {
            bail!("metadata.schema cannot be empty");
        }

        let snapshot_file = input
            .and_then(|m| m.snapshot_file.as_ref())
            .cloned()
            .or_else(|| std::env::var(SNAPSHOT_ENV).ok())
            .unwrap_or_else(|| defaults.snapshot_file.clone());

        Ok(Metadata {
            source,
            driver: input.and_then(|m| m.driver).unwrap_or(defaults.driver),
            schema,
            snapshot_file,
        })
    }

    fn resolve_migrations(&self, defaults: &Migrations) -> Migrations {
        let input = self.config_input.migrations.as_ref();

        Migrations {
            dir: input
                .and_then(|m| m.dir.as_ref())
                .cloned()
                .unwrap_or_else(|| defaults.dir.clone()),
            write_files: input
                .and_then(|m| m.write_files)
                .unwrap_or(defaults.write_files),
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
