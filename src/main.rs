use clap::{Args, Parser, Subcommand};
use imgpress::archive::{write_archive_file, write_files};
use imgpress::batch::{BatchOutcome, compress_batch};
use imgpress::config::{self, ConfigOverrides};
use imgpress::imaging::{ImageBackend, RustBackend};
use imgpress::output::{self, CheckedInput};
use imgpress::settings::CompressionMode;
use imgpress::source::{Skipped, collect_sources};
use imgpress::types::ResultReport;
use std::path::{Path, PathBuf};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once; called exactly once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "imgpress")]
#[command(about = "Batch image compressor: JPEG, PNG and WebP in, smaller files out")]
#[command(long_about = "\
Batch image compressor: JPEG, PNG and WebP in, smaller files out

Each input is decoded, optionally resized to an exact size, and re-encoded.
Images are processed one at a time, in the order given.

Modes:
  lossless   PNG stays PNG at maximum compression; others become JPEG q100
  balanced   JPEG at the requested quality (default)
  high       JPEG at a reduced quality: min(quality x high_factor,
             high_ceiling), both set under [policy] in imgpress.toml

If the first encode is not smaller than the input (lossy modes only), the
image is re-encoded once at a lower quality and that result is kept.

Output files are named compressed_<original name>. With --archive, all
results are also bundled into compressed_images.zip.

Settings can be stored in imgpress.toml; run 'imgpress gen-config' for a
documented template. Command-line flags override the file.")]
#[command(version = version_string())]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Flags shared by commands that take input paths.
#[derive(Args, Clone)]
struct InputArgs {
    /// Image files or directories
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Descend into subdirectories of directory inputs
    #[arg(long, short)]
    recursive: bool,
}

#[derive(Args, Clone)]
struct CompressArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Compression mode
    #[arg(long, short, value_enum)]
    mode: Option<CompressionMode>,

    /// Requested quality, 10-100
    #[arg(long, short)]
    quality: Option<u32>,

    /// Resize to this exact width (requires --height)
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Resize to this exact height (requires --width)
    #[arg(long, requires = "width")]
    height: Option<u32>,

    /// Directory for compressed files and the archive
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Also bundle all results into a ZIP archive
    #[arg(long)]
    archive: bool,

    /// Do not write individual files (use with --archive)
    #[arg(long)]
    no_files: bool,

    /// Print a JSON report instead of progress lines
    #[arg(long)]
    json: bool,

    /// Config file (default: ./imgpress.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Compress images and write the results
    Compress(CompressArgs),
    /// List inputs with their type and dimensions without encoding
    Check(InputArgs),
    /// Print a stock imgpress.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Compress(args) => run_compress(args)?,
        Command::Check(args) => run_check(&args)?,
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

impl CompressArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            mode: self.mode,
            quality: self.quality,
            width: self.width,
            height: self.height,
            directory: self.output.clone(),
            archive: self.archive,
            no_files: self.no_files,
        }
    }
}

fn run_compress(args: CompressArgs) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = config::load_config(Path::new("."), args.config.as_deref())?;
    let config = loaded.with_overrides(&args.overrides())?;
    let settings = config.to_settings()?;

    let collected = collect_sources(&args.input.inputs, args.input.recursive)?;
    if !args.json {
        output::print_skipped(&collected.skipped);
    }
    if collected.images.is_empty() {
        return Err("no supported images among the inputs".into());
    }

    let backend = RustBackend::new();
    let outcome = if args.json {
        compress_batch(&backend, &collected.images, &settings, &config.policy, None)?
    } else {
        let (tx, rx) = std::sync::mpsc::channel();
        let printer = std::thread::spawn(move || {
            for event in rx {
                for line in output::format_batch_event(&event) {
                    println!("{}", line);
                }
            }
        });
        let outcome = compress_batch(
            &backend,
            &collected.images,
            &settings,
            &config.policy,
            Some(tx),
        );
        printer
            .join()
            .map_err(|_| "progress printer thread panicked")?;
        outcome?
    };

    let written = if config.output.write_files {
        write_files(&outcome.results, &config.output.directory)?
    } else {
        Vec::new()
    };
    let archive = if config.output.archive && !outcome.results.is_empty() {
        let path = config.archive_path();
        write_archive_file(&outcome.results, &path)?;
        Some(path)
    } else {
        None
    };

    if args.json {
        print_json_report(&outcome, &collected.skipped, &written, archive.as_deref())?;
    } else {
        println!();
        output::print_written(&written, archive.as_deref());
    }

    if outcome.results.is_empty() {
        return Err("no image could be compressed".into());
    }
    Ok(())
}

fn print_json_report(
    outcome: &BatchOutcome,
    skipped: &[Skipped],
    written: &[PathBuf],
    archive: Option<&Path>,
) -> Result<(), serde_json::Error> {
    let results: Vec<ResultReport> = outcome.results.iter().map(ResultReport::from).collect();
    let failures: Vec<serde_json::Value> = outcome
        .failures
        .iter()
        .map(|f| {
            serde_json::json!({
                "index": f.index,
                "name": f.name,
                "error": f.error.to_string(),
            })
        })
        .collect();
    let report = serde_json::json!({
        "results": results,
        "failures": failures,
        "skipped": skipped,
        "summary": outcome.summary,
        "written": written,
        "archive": archive,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_check(args: &InputArgs) -> Result<(), Box<dyn std::error::Error>> {
    let collected = collect_sources(&args.inputs, args.recursive)?;
    let backend = RustBackend::new();
    let checked: Vec<CheckedInput> = collected
        .images
        .iter()
        .map(|image| CheckedInput {
            name: image.name().to_string(),
            format: image.format(),
            size: image.size(),
            dimensions: backend
                .decode(image.data())
                .map(|surface| backend.dimensions(&surface))
                .map_err(|e| e.to_string()),
        })
        .collect();
    output::print_check_output(&checked, &collected.skipped);

    if checked.iter().any(|c| c.dimensions.is_err()) {
        return Err("some inputs could not be decoded".into());
    }
    Ok(())
}
