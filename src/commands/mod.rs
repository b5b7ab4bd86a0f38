pub mod apply;
pub mod compile;
pub mod request;
pub mod show;

// Re-export all command functions
pub use apply::{ApplyOutcome, ExecutionMode, cmd_apply};
pub use compile::{OutputFormat, cmd_compile};
pub use request::ChangeRequest;
pub use show::{ShowFormat, cmd_show};
