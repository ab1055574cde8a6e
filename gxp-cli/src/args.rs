//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gxp_rag::RagConfig;

/// GxP validation assistant over regulatory PDF guidance.
#[derive(Parser, Debug)]
#[command(name = "gxp", version, about, long_about = None)]
pub struct Cli {
    /// Directory scanned for PDF documents (overrides DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Directory holding the vector index (overrides VECTOR_DB_DIR)
    #[arg(long, global = true)]
    pub index_dir: Option<PathBuf>,

    /// Passages retrieved per question (overrides TOP_K)
    #[arg(long, global = true, value_parser = parse_top_k)]
    pub top_k: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Build the vector index from the PDF documents in the data directory
    Init {
        /// Clear and rebuild an existing index without asking
        #[arg(short, long)]
        yes: bool,
    },
    /// Start the interactive chat console
    Chat,
    /// Answer a single question and exit
    Ask {
        /// The question to answer
        query: String,
        /// Print the response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the number of indexed passages
    Status,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut RagConfig) {
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(dir) = &self.index_dir {
            config.index_dir = dir.clone();
        }
        if let Some(top_k) = self.top_k {
            config.top_k = top_k;
        }
    }
}

fn parse_top_k(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be greater than zero".to_string()),
        Ok(k) => Ok(k),
        Err(e) => Err(e.to_string()),
    }
}
