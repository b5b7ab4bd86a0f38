use crate::config::types::*;
use crate::render::Driver;

impl Default for Metadata {
    fn default() -> Self {
        Self {
            source: "default".to_string(),
            driver: Driver::Postgres,
            schema: "public".to_string(),
            snapshot_file: "metadata.yaml".to_string(),
        }
    }
}

impl Default for Migrations {
    fn default() -> Self {
        Self {
            dir: "migrations".to_string(),
            write_files: true,
        }
    }
}
