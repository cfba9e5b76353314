//! The `thumbhash decode` command.

use clap::Args;
use thumbhash_core::Config;

/// Arguments for the `decode` command.
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Base64 ThumbHash
    pub hash: String,

    /// Print compact JSON on a single line
    #[arg(long)]
    pub compact: bool,
}

/// Execute the decode command.
pub fn execute(args: DecodeArgs, config: Config) -> anyhow::Result<()> {
    let service = super::build_service(config)?;
    let placeholder = service.decode(&args.hash)?;
    let json = if args.compact {
        serde_json::to_string(&placeholder)?
    } else {
        serde_json::to_string_pretty(&placeholder)?
    };
    println!("{json}");
    Ok(())
}
