//! The `thumbhash color` command.

use clap::{Args, ValueEnum};
use std::path::PathBuf;
use thumbhash_core::{ColorFormat, Config};

/// Arguments for the `color` command.
#[derive(Args, Debug)]
pub struct ColorArgs {
    /// Image file
    pub file: PathBuf,

    /// CSS color syntax
    #[arg(short, long, value_enum, default_value = "hex")]
    pub format: CssFormat,

    /// Aspect ratio (width / height) to sample at; defaults to the image's own
    #[arg(short, long)]
    pub ratio: Option<f64>,
}

/// CSS color syntaxes.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CssFormat {
    /// #RRGGBBAA
    Hex,
    /// rgb(R G B / A)
    Rgb,
    /// rgba(R, G, B, A)
    Rgba,
}

impl From<CssFormat> for ColorFormat {
    fn from(format: CssFormat) -> Self {
        match format {
            CssFormat::Hex => ColorFormat::Hex,
            CssFormat::Rgb => ColorFormat::Rgb,
            CssFormat::Rgba => ColorFormat::Rgba,
        }
    }
}

/// Execute the color command.
pub fn execute(args: ColorArgs, config: Config) -> anyhow::Result<()> {
    let image = super::open_image(&args.file, &config)?;
    let service = super::build_service(config)?;
    match service.average_color(&image, args.format.into(), args.ratio)? {
        Some(color) => {
            println!("{color}");
            Ok(())
        }
        None => anyhow::bail!(
            "No average color could be computed for {:?}\n\n  Hint: Re-run with --verbose for details.",
            args.file
        ),
    }
}
