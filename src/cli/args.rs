//! Command-line argument parsing for estatebuddy

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// estatebuddy - ask questions about a real estate listing corpus
#[derive(Parser, Debug)]
#[command(name = "estatebuddy")]
#[command(version)]
#[command(about = "Retrieval-augmented real estate assistant", long_about = None)]
pub struct Args {
    /// Question to ask about the listings
    #[arg(value_name = "QUERY")]
    pub query: Option<String>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Listings JSON file (overrides the configured dataset path)
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// Number of listings to retrieve (overrides the configured default)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Verbosity: -v (debug), -vv (trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Retrieve the nearest listings without generating an answer
    Search {
        /// Query text
        query: String,
    },

    /// Display the resolved configuration
    Config,
}
