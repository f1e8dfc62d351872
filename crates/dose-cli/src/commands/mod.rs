//! CLI subcommand implementations.

pub mod generate;
pub mod util;
pub mod validate;
