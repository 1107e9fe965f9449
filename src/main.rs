//! CLI tool that splits `.cppx` sources into header and implementation files.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use cppx_split::options::{HEADER_EXTENSION, INPUT_EXTENSION, SOURCE_EXTENSION};
use cppx_split::{Layout, convert_file, discover};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "cppx-split")]
#[command(version)]
#[command(about = "Split extended C++ sources into header and implementation files")]
struct Cli {
    /// Directory searched recursively for input files
    #[arg(value_name = "DIR", default_value = ".")]
    dir: PathBuf,

    /// Extension of input files
    #[arg(long, default_value = INPUT_EXTENSION)]
    input_ext: String,

    /// Extension of generated header files
    #[arg(long, default_value = HEADER_EXTENSION)]
    header_ext: String,

    /// Extension of generated implementation files
    #[arg(long, default_value = SOURCE_EXTENSION)]
    source_ext: String,

    /// Do not include the generated header from the implementation file
    #[arg(long)]
    no_include: bool,

    /// Convert and report without writing any file
    #[arg(long)]
    dry_run: bool,

    /// Log per-file details
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    const fn level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}

/// `RUST_LOG` overrides the level chosen on the command line.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let layer = tracing_subscriber::fmt::layer()
        .without_time()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .compact();

    tracing_subscriber::registry().with(filter).with(layer).init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.level());

    if !cli.dir.is_dir() {
        error!(dir = %cli.dir.display(), "not an accessible directory");
        return ExitCode::from(2);
    }

    let layout = Layout::new(&cli.input_ext, &cli.header_ext, &cli.source_ext);
    info!(dir = %cli.dir.display(), "processing directory");

    let discovery = discover(&cli.dir, &layout);
    for e in &discovery.errors {
        warn!("{e}");
    }
    if discovery.files.is_empty() {
        warn!(
            dir = %cli.dir.display(),
            "no .{} files found",
            layout.input_extension
        );
        return ExitCode::SUCCESS;
    }
    info!("found {} file(s) to process", discovery.files.len());

    let mut failed = 0_usize;

    for file in &discovery.files {
        let path = file.path.display();
        match file.size {
            Some(bytes) => info!(bytes, "processing {path}"),
            None => info!("processing {path}"),
        }

        match convert_file(&file.path, &layout, !cli.no_include, !cli.dry_run) {
            Ok(converted) => {
                let verb = if cli.dry_run { "would write" } else { "wrote" };
                info!(
                    "{verb} {} and {}",
                    converted.header.display(),
                    converted.implementation.display()
                );
            }
            Err(e) => {
                error!("{path}: {e}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        error!("{failed} of {} file(s) failed", discovery.files.len());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
