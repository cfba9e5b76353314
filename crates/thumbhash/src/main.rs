//! ThumbHash CLI - generate, cache and render image placeholders.
//!
//! A ThumbHash is a tiny summary of an image that decodes into a blurry
//! preview. This tool hashes local images, caches the results on disk, and
//! prints placeholders ready to drop into markup.
//!
//! # Usage
//!
//! ```bash
//! # Hash a directory of images
//! thumbhash encode ./photos/ --format jsonl --output hashes.jsonl
//!
//! # Placeholder data URI for one image
//! thumbhash placeholder cover.jpg --blur-radius 2
//!
//! # Average color as CSS
//! thumbhash color cover.jpg --format rgba
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;

/// ThumbHash - compact image placeholders.
#[derive(Parser, Debug)]
#[command(name = "thumbhash")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "THUMBHASH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Hash images and print one record per file
    Encode(cli::encode::EncodeArgs),

    /// Decode a hash into a PNG placeholder
    Decode(cli::decode::DecodeArgs),

    /// Print the placeholder data URI for an image
    Placeholder(cli::placeholder::PlaceholderArgs),

    /// Print the average color of an image
    Color(cli::color::ColorArgs),

    /// Forget cached hashes for an image
    Invalidate(cli::invalidate::InvalidateArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match cli::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `thumbhash config path`."
            );
            thumbhash_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("ThumbHash v{}", thumbhash_core::VERSION);

    match cli.command {
        Commands::Encode(args) => cli::encode::execute(args, config),
        Commands::Decode(args) => cli::decode::execute(args, config),
        Commands::Placeholder(args) => cli::placeholder::execute(args, config),
        Commands::Color(args) => cli::color::execute(args, config),
        Commands::Invalidate(args) => cli::invalidate::execute(args, config),
        Commands::Config(args) => cli::config::execute(args, cli.config, config),
    }
}
