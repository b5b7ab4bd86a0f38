use crate::config::types::*;

/// Trait for merging optional configuration values
pub trait Merge<T> {
    fn merge(self, other: T) -> T;
}

impl<T> Merge<Option<T>> for Option<T> {
    fn merge(self, other: Option<T>) -> Option<T> {
        other.or(self)
    }
}

impl Merge<ConfigInput> for ConfigInput {
    fn merge(self, other: ConfigInput) -> ConfigInput {
        ConfigInput {
            metadata: match (self.metadata, other.metadata) {
                (None, None) => None,
                (Some(a), None) => Some(a),
                (None, Some(b)) => Some(b),
                (Some(a), Some(b)) => Some(a.merge_with(b)),
            },
            migrations: match (self.migrations, other.migrations) {
                (None, None) => None,
                (Some(a), None) => Some(a),
                (None, Some(b)) => Some(b),
                (Some(a), Some(b)) => Some(a.merge_with(b)),
            },
        }
    }
}

impl MetadataInput {
    pub fn merge_with(self, other: MetadataInput) -> MetadataInput {
        MetadataInput {
            source: self.source.merge(other.source),
            driver: self.driver.merge(other.driver),
            schema: self.schema.merge(other.schema),
            snapshot_file: self.snapshot_file.merge(other.snapshot_file),
        }
    }
}

impl MigrationsInput {
    pub fn merge_with(self, other: MigrationsInput) -> MigrationsInput {
        MigrationsInput {
            dir: self.dir.merge(other.dir),
            write_files: self.write_files.merge(other.write_files),
        }
    }
}
