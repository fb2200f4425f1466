//! CLI module for the metagen generator
//!
//! This module provides the command-line interface for the generator.
//!
//! ## Commands
//!
//! - `check <model.json>` - Analyze every repository and report diagnostics
//! - `generate <model.json> [-o DIR]` - Analyze and write the generated classes
//! - `explain <model.json> <Repository> <method>` - Show how one method is classified and generated
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use crate::config::GeneratorConfig;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Metamodel and repository generator for annotated data-access interfaces
#[derive(Parser, Debug)]
#[command(name = "metagen")]
#[command(version = VERSION)]
#[command(about = "Generate repository implementations from an entity model", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Do not annotate generated parameters and fields with @Nonnull
    #[arg(long = "no-nonnull", global = true)]
    pub no_nonnull: bool,

    /// Annotate generated repository constructors with @Inject
    #[arg(long, global = true)]
    pub inject: bool,

    /// Rounds to run before giving up on unresolved methods
    #[arg(long = "max-rounds", value_name = "N", global = true)]
    pub max_rounds: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze every repository and report diagnostics
    Check {
        /// Model file (JSON)
        #[arg(value_name = "MODEL")]
        model: PathBuf,
    },

    /// Analyze and write the generated classes
    Generate {
        /// Model file (JSON)
        #[arg(value_name = "MODEL")]
        model: PathBuf,
        /// Output directory (default: generated)
        #[arg(short = 'o', long = "output", value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Show how one repository method is classified and generated
    Explain {
        /// Model file (JSON)
        #[arg(value_name = "MODEL")]
        model: PathBuf,
        /// Repository, by qualified or simple name
        #[arg(value_name = "REPOSITORY")]
        repository: String,
        /// Method name
        #[arg(value_name = "METHOD")]
        method: String,
    },
}

impl Cli {
    pub fn config(&self) -> GeneratorConfig {
        let config = GeneratorConfig::new()
            .with_nonnull_annotation(!self.no_nonnull)
            .with_inject_annotation(self.inject);
        match self.max_rounds {
            Some(rounds) => config.with_max_rounds(rounds),
            None => config,
        }
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    let config = cli.config();
    match cli.command {
        Command::Check { model } => commands::check_model(&model, &config),
        Command::Generate { model, output_dir } => {
            let out = output_dir.unwrap_or_else(|| PathBuf::from("generated"));
            commands::generate(&model, &out, &config)
        }
        Command::Explain {
            model,
            repository,
            method,
        } => commands::explain(&model, &repository, &method, &config),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_check() {
        let cli = Cli::try_parse_from(["metagen", "check", "model.json"]).unwrap();
        assert!(matches!(cli.command, Command::Check { .. }));
        assert!(cli.config().add_nonnull_annotation);
    }

    #[test]
    fn test_cli_parse_generate_with_output() {
        let cli = Cli::try_parse_from(["metagen", "generate", "model.json", "-o", "out"]).unwrap();
        if let Command::Generate { output_dir, .. } = cli.command {
            assert_eq!(output_dir, Some(PathBuf::from("out")));
        } else {
            panic!("Expected Generate command");
        }
    }

    #[test]
    fn test_cli_parse_explain() {
        let cli = Cli::try_parse_from(["metagen", "explain", "model.json", "Library", "byIsbn"]).unwrap();
        if let Command::Explain { repository, method, .. } = cli.command {
            assert_eq!(repository, "Library");
            assert_eq!(method, "byIsbn");
        } else {
            panic!("Expected Explain command");
        }
    }

    #[test]
    fn test_global_flags_shape_the_config() {
        let cli = Cli::try_parse_from(["metagen", "check", "model.json", "--no-nonnull", "--inject", "--max-rounds", "2"])
            .unwrap();
        let config = cli.config();
        assert!(!config.add_nonnull_annotation);
        assert!(config.add_inject_annotation);
        assert_eq!(config.max_rounds, 2);
    }

    #[test]
    fn test_missing_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["metagen"]).is_err());
    }
}
