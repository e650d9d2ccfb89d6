use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use sqlstrip_batch::{
    BatchConfig, BatchReport, Destination, FileFailure, OutputFormat, collect_script_paths,
    format_report, strip_files, write_outcomes,
};
use sqlstrip_core::{CommentStrippingReader, StripOptions};
use tracing::info;

const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(name = "sqlstrip", version)]
#[command(about = "Strip /* ... */ block comments from SQL scripts")]
struct Cli {
    /// Log at debug level (otherwise RUST_LOG, default warn).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Strip comments from stdin, one file, or many files.
    Strip(StripArgs),
    /// Report what stripping would remove, without writing anything.
    Stats(StatsArgs),
    /// Write a default YAML configuration file.
    InitConfig(InitConfigArgs),
}

/// Options shared by commands that strip scripts.
#[derive(Debug, Args)]
struct SelectionArgs {
    /// YAML configuration file; flags given here override it.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Extension picked up from directories (repeatable, default: sql).
    #[arg(long = "ext", value_name = "EXT")]
    extensions: Vec<String>,
    /// Keep line breaks from inside comments so line numbers still match.
    #[arg(long)]
    preserve_line_breaks: bool,
    /// Number of parallel jobs (default: number of CPUs, at most 12).
    #[arg(long)]
    jobs: Option<usize>,
}

#[derive(Debug, Args)]
struct StripArgs {
    /// Script files and/or directories. `-` or nothing reads stdin.
    inputs: Vec<PathBuf>,
    #[command(flatten)]
    selection: SelectionArgs,
    /// Directory to write cleaned scripts into.
    #[arg(long, value_name = "DIR", conflicts_with = "in_place")]
    output: Option<PathBuf>,
    /// Overwrite each script with its cleaned text.
    #[arg(long)]
    in_place: bool,
    /// Also write a batch report to this file.
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
    /// Format of the --report file (default: json).
    #[arg(long, requires = "report")]
    format: Option<OutputFormat>,
}

#[derive(Debug, Args)]
struct StatsArgs {
    /// Script files and/or directories.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    #[command(flatten)]
    selection: SelectionArgs,
    /// Output format.
    #[arg(long, default_value = "table")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct InitConfigArgs {
    /// Path of the configuration file to create.
    path: PathBuf,
    /// Overwrite an existing file.
    #[arg(long)]
    force: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Strip(args) => run_strip(args),
        Command::Stats(args) => run_stats(args),
        Command::InitConfig(args) => run_init_config(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::filter::{EnvFilter, LevelFilter};
    use tracing_subscriber::prelude::*;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .from_env_lossy()
    };
    // A second init (e.g. from tests) is harmless.
    let _ = tracing_subscriber::Registry::default()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .try_init();
}

fn run_strip(args: StripArgs) -> Result<(), String> {
    let config = resolve_config(&args.selection)?;

    if reads_stdin(&args.inputs)? {
        if args.output.is_some() || args.in_place || args.report.is_some() {
            return Err("--output, --in-place and --report need file inputs".to_string());
        }
        return strip_stdin(config.strip_options());
    }

    let paths = collect_script_paths(&args.inputs, &config).map_err(|e| e.to_string())?;
    let destination = match (&args.output, args.in_place) {
        (Some(dir), _) => Some(Destination::Directory(dir.clone())),
        (None, true) => Some(Destination::InPlace),
        (None, false) if paths.len() == 1 => None,
        (None, false) => {
            return Err(format!(
                "{} scripts matched; pass --output <DIR> or --in-place",
                paths.len()
            ));
        }
    };

    let outcome =
        strip_files(&paths, config.strip_options(), config.jobs).map_err(|e| e.to_string())?;

    match &destination {
        Some(destination) => {
            let written =
                write_outcomes(&outcome.outcomes, destination).map_err(|e| e.to_string())?;
            let comments: u64 = outcome
                .outcomes
                .iter()
                .map(|file| file.report.stats.comments_removed)
                .sum();
            println!("Stripped {comments} comment(s) from {written} script(s).");
        }
        None => {
            if let Some(file) = outcome.outcomes.first() {
                let mut stdout = io::stdout().lock();
                stdout
                    .write_all(file.cleaned.as_bytes())
                    .and_then(|()| stdout.flush())
                    .map_err(|err| format!("Failed to write to stdout: {err}"))?;
            }
        }
    }

    if let Some(report_path) = &args.report {
        let report = BatchReport::new(PACKAGE_VERSION, &outcome);
        let format = args.format.unwrap_or(OutputFormat::Json);
        let raw = format_report(&report, format).map_err(|e| e.to_string())?;
        write_file(report_path, &raw)?;
    }

    failures_to_result(&outcome.failures)
}

/// Streams stdin to stdout without buffering the whole script.
fn strip_stdin(options: StripOptions) -> Result<(), String> {
    let stdin = io::stdin();
    let mut reader = CommentStrippingReader::new(stdin.lock()).with_options(options);
    let mut out = BufWriter::new(io::stdout().lock());
    let mut buf = [0u8; 4];

    for ch in reader.by_ref() {
        let ch = ch.map_err(|err| format!("Failed to read stdin: {err}"))?;
        out.write_all(ch.encode_utf8(&mut buf).as_bytes())
            .map_err(|err| format!("Failed to write to stdout: {err}"))?;
    }
    out.flush()
        .map_err(|err| format!("Failed to write to stdout: {err}"))?;

    let stats = reader.stats();
    info!(
        comments = stats.comments_removed,
        removed = stats.chars_removed(),
        unterminated = stats.unterminated,
        "stripped stdin"
    );
    Ok(())
}

fn run_stats(args: StatsArgs) -> Result<(), String> {
    let config = resolve_config(&args.selection)?;
    let paths = collect_script_paths(&args.inputs, &config).map_err(|e| e.to_string())?;
    let outcome =
        strip_files(&paths, config.strip_options(), config.jobs).map_err(|e| e.to_string())?;

    let report = BatchReport::new(PACKAGE_VERSION, &outcome);
    let raw = format_report(&report, args.format).map_err(|e| e.to_string())?;
    print!("{raw}");
    if !raw.ends_with('\n') {
        println!();
    }

    failures_to_result(&outcome.failures)
}

fn run_init_config(args: InitConfigArgs) -> Result<(), String> {
    if args.path.exists() && !args.force {
        return Err(format!(
            "'{}' already exists; pass --force to overwrite",
            args.path.display()
        ));
    }
    BatchConfig::default()
        .save(&args.path)
        .map_err(|err| format!("Failed to write '{}': {err}", args.path.display()))?;
    println!("Wrote default configuration to '{}'.", args.path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Loads the config file (if any) and applies command-line overrides.
fn resolve_config(args: &SelectionArgs) -> Result<BatchConfig, String> {
    let mut config = match &args.config {
        Some(path) => BatchConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => BatchConfig::default(),
    };

    if !args.extensions.is_empty() {
        config.extensions = args.extensions.clone();
    }
    if args.preserve_line_breaks {
        config.preserve_line_breaks = true;
    }
    if args.jobs.is_some() {
        config.jobs = args.jobs;
    }
    Ok(config)
}

/// `true` when the inputs select stdin; `-` may not be mixed with paths.
fn reads_stdin(inputs: &[PathBuf]) -> Result<bool, String> {
    let dash = Path::new("-");
    match inputs {
        [] => Ok(true),
        [only] if only == dash => Ok(true),
        _ if inputs.iter().any(|input| input == dash) => {
            Err("'-' (stdin) cannot be mixed with file inputs".to_string())
        }
        _ => Ok(false),
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }
    fs::write(path, contents).map_err(|err| format!("Failed to write '{}': {err}", path.display()))
}

fn failures_to_result(failures: &[FileFailure]) -> Result<(), String> {
    if failures.is_empty() {
        return Ok(());
    }
    for failure in failures {
        eprintln!("{}: {}", failure.path.display(), failure.error);
    }
    Err(format!("{} script(s) could not be stripped", failures.len()))
}
