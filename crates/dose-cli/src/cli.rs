//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::generate::GenerateArgs;
use crate::commands::validate::ValidateArgs;

/// Medication dose scheduler.
///
/// Expands medication orders into concrete dose events over a multi-day
/// horizon, keeping doses of the same exclusion group apart.
#[derive(Debug, Parser)]
#[command(name = "dosesched", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate dose events for a horizon.
    Generate(GenerateArgs),

    /// Check orders without scheduling them.
    Validate(ValidateArgs),
}
