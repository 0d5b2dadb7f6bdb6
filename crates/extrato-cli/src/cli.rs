//! CLI argument definitions using clap
//!
//! This module contains the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Extrato - Parse Brazilian bank statements
#[derive(Parser)]
#[command(name = "extrato")]
#[command(about = "Bank statement parser for Brazilian institutions", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Parser config file (defaults to the data-dir override, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse statements and preview their transactions
    Parse {
        /// Statement files (.csv, .txt, .xlsx, .xls, .ofx, .pdf)
        #[arg(short, long, required = true, num_args = 1..)]
        file: Vec<PathBuf>,

        /// Print the parse outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// List known institutions in detection order
    Institutions {
        /// Show a single institution by name (case-insensitive)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Show which institution a statement is detected as
    Identify {
        /// Statement file
        #[arg(short, long)]
        file: PathBuf,
    },
}
