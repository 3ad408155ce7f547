use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "aidtrack-api")]
#[command(about = "Aid project tracking backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Serve the REST API
    Serve,
    /// Import a tab-separated project export
    Import {
        /// Path to the export file (header line first)
        path: PathBuf,
    },
    /// Create reference data and the demo project
    Seed,
}
