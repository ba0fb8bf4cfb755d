//! docstat CLI - document statistics tool

use std::fs::File;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use docstat::{
    options::{DEFAULT_MAX_FILE_SIZE, DEFAULT_TOP_WORDS},
    to_json, to_report, Docstat, FileFormat, JsonFormat,
};

const BYTES_PER_MB: u64 = 1024 * 1024;

#[derive(Parser)]
#[command(name = "docstat")]
#[command(version)]
#[command(about = "Statistics for text, PDF and DOCX documents", long_about = None)]
struct Cli {
    /// Input file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Write log output to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a document and print its statistics
    Analyze(AnalyzeArgs),

    /// List supported file formats
    Formats,

    /// Show version information
    Version,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Input file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output JSON instead of the plain report
    #[arg(long)]
    json: bool,

    /// Output compact JSON (implies --json)
    #[arg(long)]
    compact: bool,

    /// Number of most frequent words to list for text files
    #[arg(long, env = "DOCSTAT_TOP_WORDS", default_value_t = DEFAULT_TOP_WORDS)]
    top_words: usize,

    /// Largest accepted file in MiB (0 = no limit)
    #[arg(long, env = "DOCSTAT_MAX_SIZE_MB", default_value_t = DEFAULT_MAX_FILE_SIZE / BYTES_PER_MB)]
    max_size_mb: u64,
}

impl AnalyzeArgs {
    fn with_defaults(input: PathBuf) -> Self {
        Self {
            input,
            json: false,
            compact: false,
            top_words: DEFAULT_TOP_WORDS,
            max_size_mb: DEFAULT_MAX_FILE_SIZE / BYTES_PER_MB,
        }
    }

    fn json_format(&self) -> Option<JsonFormat> {
        if self.compact {
            Some(JsonFormat::Compact)
        } else if self.json {
            Some(JsonFormat::Pretty)
        } else {
            None
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_file.as_deref()) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }

    let result = match cli.command {
        Some(Commands::Analyze(args)) => cmd_analyze(&args),
        Some(Commands::Formats) => {
            cmd_formats();
            Ok(true)
        }
        Some(Commands::Version) => {
            cmd_version();
            Ok(true)
        }
        None => {
            // Default behavior: analyze if input is provided
            if let Some(input) = cli.input {
                cmd_analyze(&AnalyzeArgs::with_defaults(input))
            } else {
                println!("{}", "Usage: docstat <FILE>".yellow());
                println!("       docstat --help for more information");
                Ok(true)
            }
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Install the process-wide logger once; `RUST_LOG` overrides the `info` default.
fn init_logging(log_file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    if let Some(path) = log_file {
        let file = File::options().create(true).append(true).open(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.try_init()?;
    Ok(())
}

/// Print the analysis; `Ok(false)` when the result is an error entry.
fn cmd_analyze(args: &AnalyzeArgs) -> Result<bool, Box<dyn std::error::Error>> {
    let docstat = Docstat::new()
        .with_top_words(args.top_words)
        .with_max_size_mb(args.max_size_mb);

    log::debug!("Analyzing {}", args.input.display());
    let result = docstat.analyze(&args.input);

    match args.json_format() {
        Some(format) => println!("{}", to_json(&result, format)?),
        None if result.is_error() => eprintln!("{}", to_report(&result).red()),
        None => println!("{}", to_report(&result)),
    }

    Ok(!result.is_error())
}

fn cmd_formats() {
    println!("{}", "Supported formats".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let docstat = Docstat::new();
    for ext in docstat.registry().supported_extensions() {
        let description = FileFormat::from_extension(ext)
            .map(|f| f.description())
            .unwrap_or("Custom analyzer");
        println!("  {:<6} {}", format!(".{}", ext).bold(), description);
    }
}

fn cmd_version() {
    println!("{} {}", "docstat".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Document statistics tool");
    println!();
    println!("License: MIT");
}
