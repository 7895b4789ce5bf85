//! CLI commands

mod build;
mod completions;
mod init;
mod list;
mod validate;

pub use build::{BuildCommand, VariantsFailed};
pub use completions::CompletionsCommand;
pub use init::InitCommand;
pub use list::ListCommand;
pub use validate::ValidateCommand;
