//! Command handlers for CLI subcommands
//!
//! One module per subcommand; each handler receives its parsed arguments,
//! the loaded configuration and the output writer.

mod completions;
mod config;
mod serve;
mod validate;

pub use completions::handle_completions;
pub use config::handle_config;
pub use serve::handle_serve;
pub use validate::handle_validate;
