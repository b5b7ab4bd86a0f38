//! Compile permission edits on tracked tables into reversible metadata migrations.

pub mod catalog;
pub mod commands;
pub mod config;
pub mod diff;
pub mod draft;
pub mod error;
pub mod executor;
pub mod migration;
pub mod render;

pub use error::{CompilationError, PermissionError, ValidationError};
