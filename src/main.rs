//! HIndex: Hybrid Search Index for Long-Form Content

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use hindex::config::{Config, LogFormat};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hindex")]
#[command(about = "Hybrid semantic + lexical search index for long-form content")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index bundle from a directory of markdown documents
    Index {
        /// Directory containing markdown posts
        content_dir: PathBuf,
    },

    /// Search the index
    Search {
        /// Search query
        query: String,

        /// Number of results
        #[arg(short, long, default_value = "10")]
        top_k: usize,

        /// Restrict results to chunks carrying any of these tags
        #[arg(short = 'g', long = "tag")]
        tags: Vec<String>,

        /// Output format (json, text)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show index bundle statistics
    Stats,

    /// Write a default configuration file
    Init {
        /// Output directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Init { path } = &cli.command {
        return commands::init::run(path);
    }

    let config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::default()
    };
    init_logging(&config);

    match cli.command {
        Commands::Index { content_dir } => commands::index::run(config, &content_dir),
        Commands::Search {
            query,
            top_k,
            tags,
            format,
        } => commands::search::run(config, &query, top_k, tags, &format),
        Commands::Stats => commands::stats::run(config),
        Commands::Init { .. } => unreachable!("handled before config load"),
    }
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.logging.level.as_str()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    match config.logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}
