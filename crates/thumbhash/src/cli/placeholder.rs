//! The `thumbhash placeholder` command.

use clap::Args;
use std::path::PathBuf;
use thumbhash_core::Config;

/// Arguments for the `placeholder` command.
#[derive(Args, Debug)]
pub struct PlaceholderArgs {
    /// Image file
    pub file: PathBuf,

    /// Aspect ratio (width / height) to sample at; defaults to the image's own
    #[arg(short, long)]
    pub ratio: Option<f64>,

    /// Gaussian blur radius; 0 prints the bare PNG data URI
    #[arg(short, long)]
    pub blur_radius: Option<f64>,
}

/// Execute the placeholder command.
pub fn execute(args: PlaceholderArgs, config: Config) -> anyhow::Result<()> {
    if let Some(radius) = args.blur_radius {
        if !radius.is_finite() || radius < 0.0 {
            anyhow::bail!("--blur-radius must be a finite number >= 0, got {radius}");
        }
    }

    let image = super::open_image(&args.file, &config)?;
    let service = super::build_service(config)?;
    match service.render_placeholder(&image, args.ratio, args.blur_radius)? {
        Some(uri) => {
            println!("{uri}");
            Ok(())
        }
        None => anyhow::bail!(
            "No placeholder could be generated for {:?}\n\n  Hint: Re-run with --verbose for details.",
            args.file
        ),
    }
}
