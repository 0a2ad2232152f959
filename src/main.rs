use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use hashwatch::config::{validate_size_cap, Config};
use hashwatch::hash::{
    AlgorithmChoice, AlgorithmRegistry, BaselineStore, ChecksumEngine, ChecksumError, ChecksumMapping,
    CompareReport, Comparator, ComparisonVerdict, ScanOutcome,
};

/// Hash a directory tree, save the digests as a baseline, and report
/// altered or new files on later runs.
#[derive(Parser, Debug)]
#[command(name = "hashwatch", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute and print digests for every file under a directory.
    Hash(RunArgs),

    /// Compute digests and save them as a baseline.
    Save {
        #[command(flatten)]
        run: RunArgs,

        /// Baseline file to write (default: <DIR>/checksum<ext>).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compute digests and compare them against a saved baseline.
    Compare {
        #[command(flatten)]
        run: RunArgs,

        /// Baseline file to read (default: <DIR>/checksum<ext>).
        #[arg(short, long)]
        baseline: Option<PathBuf>,

        /// Also list files present in the baseline but missing now.
        #[arg(long)]
        show_deleted: bool,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the digests stored in a baseline file.
    Show {
        /// Baseline file to read.
        baseline: PathBuf,
    },

    /// List supported algorithms.
    List,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Directory to hash.
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Hash algorithm (blake2b, blake2s, md5, sha1, sha256, sha3-512, blake3, ...).
    #[arg(short, long)]
    algorithm: Option<String>,

    /// Digest size in bytes for blake2b/blake2s (clamped into the supported range).
    #[arg(long)]
    digest_size: Option<usize>,

    /// Skip files larger than this many MB.
    #[arg(long)]
    size_cap: Option<f64>,

    /// File names to skip at every depth (repeatable).
    #[arg(short, long)]
    exclude: Vec<String>,

    /// Hash files in parallel.
    #[arg(short, long)]
    parallel: bool,
}

/// Settings for one run after merging config and flags
struct RunSettings {
    choice: AlgorithmChoice,
    cap_mb: Option<f64>,
    exclude: Vec<OsString>,
    chunk_blocks: usize,
    parallel: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            let baseline_failure = e
                .downcast_ref::<ChecksumError>()
                .map(ChecksumError::is_baseline_error)
                .unwrap_or(false);
            if baseline_failure {
                eprintln!("{} {:#}", "Comparison failed:".red().bold(), e);
            } else {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
            }
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    match cli.command {
        Commands::Hash(args) => {
            let settings = settings(&config, &args, None)?;
            let mapping = hash_directory(&args.dir, &settings)?;
            print_mapping(&mapping);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Save { run, output } => {
            let destination = BaselineStore::annotate_path(
                &output.unwrap_or_else(|| BaselineStore::default_path(&run.dir, &config.baseline_extension)),
            );
            let settings = settings(&config, &run, Some(&destination))?;
            let mapping = hash_directory(&run.dir, &settings)?;
            let written = BaselineStore::save(&mapping, &destination)?;
            println!("Saved {} digests to {}", mapping.len(), written.display());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Compare {
            run,
            baseline,
            show_deleted,
            json,
        } => {
            let baseline_path =
                baseline.unwrap_or_else(|| BaselineStore::default_path(&run.dir, &config.baseline_extension));
            let settings = settings(&config, &run, Some(&baseline_path))?;
            let mapping = hash_directory(&run.dir, &settings)?;
            // Hashing already happened; only the comparison fails here
            let baseline = BaselineStore::load(&baseline_path)?;

            let mut report = Comparator::report(&mapping, &baseline);
            if !show_deleted {
                report.deleted.clear();
            }

            if json {
                println!("{}", report.to_json().context("serializing report")?);
            } else {
                print_report(&report);
            }

            if report.has_changes() {
                Ok(ExitCode::from(1))
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
        Commands::Show { baseline } => {
            let mapping = BaselineStore::load_as_mapping(&baseline)?;
            print_mapping(&mapping);
            Ok(ExitCode::SUCCESS)
        }
        Commands::List => {
            println!("{:<10} {:>6} {:>8}  {}", "NAME", "BLOCK", "DIGEST", "NOTES");
            for info in AlgorithmRegistry::list() {
                let notes = if info.variable_length {
                    format!("variable length, up to {} bytes", info.digest_size)
                } else {
                    String::new()
                };
                println!("{:<10} {:>6} {:>8}  {}", info.name, info.block_size, info.digest_size, notes);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn settings(config: &Config, args: &RunArgs, baseline: Option<&Path>) -> Result<RunSettings> {
    let name = args.algorithm.as_deref().unwrap_or(&config.algorithm);
    let digest_size = args.digest_size.unwrap_or(config.digest_size);
    let choice = AlgorithmChoice::from_name(name, digest_size)?;

    if let Some(cap) = args.size_cap {
        validate_size_cap(cap).map_err(|reason| anyhow!("--size-cap {}", reason))?;
    }

    let mut exclude: Vec<OsString> = config.exclude.iter().map(OsString::from).collect();
    exclude.extend(args.exclude.iter().map(OsString::from));
    // Never hash our own baseline or executable
    exclude.extend(BaselineStore::own_file_names(&args.dir, &config.baseline_extension, baseline));
    if let Some(own_name) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.file_name().map(|n| n.to_os_string()))
    {
        exclude.push(own_name);
    }

    Ok(RunSettings {
        choice,
        cap_mb: args.size_cap.or(config.size_cap_mb),
        exclude,
        chunk_blocks: config.chunk_blocks,
        parallel: args.parallel || config.parallel,
    })
}

fn hash_directory(dir: &Path, settings: &RunSettings) -> Result<ChecksumMapping> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%)")
            .context("building progress bar style")?
            .progress_chars("=>-"),
    );

    let pb_callback = pb.clone();
    let engine = ChecksumEngine::new()
        .with_parallel(settings.parallel)
        .with_chunk_blocks(settings.chunk_blocks)
        .with_progress_callback(move |progress| {
            pb_callback.set_length(progress.files_total as u64);
            pb_callback.inc(1);
        });

    let outcome: ScanOutcome = engine
        .scan_directory(dir, &settings.exclude, &settings.choice, settings.cap_mb)
        .with_context(|| format!("hashing {}", dir.display()))?;
    pb.finish_and_clear();

    let stats = &outcome.stats;
    eprintln!(
        "{} {} hashed, {} over size cap, {} failed ({:.2} MB in {:.2}s, {})",
        "Done:".green().bold(),
        stats.files_hashed,
        stats.files_oversize,
        stats.files_failed,
        stats.total_bytes as f64 / 1_048_576.0,
        stats.duration.as_secs_f64(),
        settings.choice.name(),
    );

    Ok(outcome.into_mapping())
}

fn print_mapping(mapping: &ChecksumMapping) {
    for (path, digest) in mapping.iter() {
        println!("{} : {}", path.display(), digest);
    }
}

fn print_report(report: &CompareReport) {
    for verdict in &report.verdicts {
        match verdict {
            ComparisonVerdict::Match { path, digest } => {
                println!("{} {}\n  {}", "[Match]".green(), path.display(), digest);
            }
            ComparisonVerdict::Altered {
                path,
                old_digest,
                new_digest,
            } => {
                println!(
                    "{} {}\n  was: {}\n  now: {}",
                    "[Altered]".red().bold(),
                    path.display(),
                    old_digest,
                    new_digest
                );
            }
            ComparisonVerdict::New { path, digest } => {
                println!("{} {}\n  {}", "[New]".yellow(), path.display(), digest);
            }
        }
    }

    for path in &report.deleted {
        println!("{} {}", "[Deleted]".magenta(), path.display());
    }

    println!(
        "\n{} match, {} altered, {} new{}",
        report.matches(),
        report.altered(),
        report.new_files(),
        if report.deleted.is_empty() {
            String::new()
        } else {
            format!(", {} deleted", report.deleted.len())
        }
    );

    if !report.has_changes() {
        println!("{}", "No altered or new files found.".green());
    }
}
