//! The `thumbhash invalidate` command.

use clap::Args;
use std::path::PathBuf;
use thumbhash_core::Config;

/// Arguments for the `invalidate` command.
#[derive(Args, Debug)]
pub struct InvalidateArgs {
    /// Image file whose cached hashes should be dropped
    pub file: PathBuf,
}

/// Execute the invalidate command.
pub fn execute(args: InvalidateArgs, config: Config) -> anyhow::Result<()> {
    let image = super::open_image(&args.file, &config)?;
    let service = super::build_service(config)?;
    service.invalidate(&image);
    tracing::info!("Invalidated cached hashes for {:?}", args.file);
    Ok(())
}
