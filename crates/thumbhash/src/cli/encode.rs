//! The `thumbhash encode` command.

use clap::{Args, ValueEnum};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thumbhash_core::source::SourceImage;
use thumbhash_core::{
    discover_images, ColorFormat, Config, EncodeRecord, OutputFormat, OutputWriter,
    ThumbHashService,
};

/// Arguments for the `encode` command.
#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Image file or directory to hash
    #[arg(required = true)]
    pub input: PathBuf,

    /// Aspect ratio (width / height) to sample at; defaults to each image's own
    #[arg(short, long)]
    pub ratio: Option<f64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: RecordFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Record output formats.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RecordFormat {
    /// A JSON array
    Json,
    /// One JSON object per line
    Jsonl,
}

impl From<RecordFormat> for OutputFormat {
    fn from(format: RecordFormat) -> Self {
        match format {
            RecordFormat::Json => OutputFormat::Json,
            RecordFormat::Jsonl => OutputFormat::JsonLines,
        }
    }
}

/// Execute the encode command.
pub fn execute(args: EncodeArgs, config: Config) -> anyhow::Result<()> {
    if !args.input.exists() {
        anyhow::bail!(
            "Input path does not exist: {:?}\n\n  Hint: Check the file path and try again.",
            args.input
        );
    }

    let files = discover_images(&args.input);
    if files.is_empty() {
        tracing::warn!("No supported image files found at {:?}", args.input);
        return Ok(());
    }
    tracing::info!("Found {} image(s) to hash", files.len());

    let single = args.input.is_file();
    let service = super::build_service(config)?;
    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = OutputWriter::new(sink, args.format.into(), true);

    let progress = (!single).then(|| create_progress_bar(files.len() as u64));
    let start_time = std::time::Instant::now();
    let (mut succeeded, mut failed) = (0u64, 0u64);

    for path in &files {
        if let Some(pb) = &progress {
            pb.set_message(display_name(path));
        }
        match encode_file(&service, path, args.ratio) {
            Ok(Some(record)) => {
                writer.write(&record)?;
                succeeded += 1;
            }
            Ok(None) => failed += 1,
            Err(e) if single => return Err(e),
            Err(e) => {
                tracing::error!("{:?}: {e:#}", path);
                failed += 1;
            }
        }
        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }

    writer.finish()?;
    if let Some(pb) = progress {
        pb.finish_and_clear();
        print_summary(succeeded, failed, start_time.elapsed());
    } else if failed > 0 {
        anyhow::bail!(
            "No hash could be generated for {:?}\n\n  Hint: Re-run with --verbose for details.",
            args.input
        );
    }
    if let Some(path) = &args.output {
        tracing::info!("Output written to {:?}", path);
    }

    Ok(())
}

/// Hash one file; `Ok(None)` if the service could not produce a hash.
fn encode_file(
    service: &ThumbHashService,
    path: &Path,
    ratio: Option<f64>,
) -> anyhow::Result<Option<EncodeRecord>> {
    let image = super::open_image(path, service.config())?;
    let Some(hash) = service.encode(&image, ratio)? else {
        return Ok(None);
    };
    // Served from the encode cache populated just above
    let Some(average_color) = service.average_color(&image, ColorFormat::Hex, ratio)? else {
        return Ok(None);
    };
    let ratio = match ratio {
        Some(ratio) => ratio,
        None => image.aspect_ratio()?,
    };

    Ok(Some(EncodeRecord {
        file: path.to_path_buf(),
        identity: image.identity(),
        ratio,
        hash,
        average_color,
    }))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string()
}

/// Create a progress bar for batch hashing.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Print a summary table after batch hashing.
fn print_summary(succeeded: u64, failed: u64, elapsed: std::time::Duration) {
    let rate = if elapsed.as_secs_f64() > 0.0 {
        succeeded as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Hashed:       {:>8}", succeeded);
    if failed > 0 {
        eprintln!("    Failed:       {:>8}", failed);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", succeeded + failed);
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("    Rate:         {:>7.1} img/sec", rate);
    eprintln!("  ====================================");
}
