//! toolbelt - command line front end for the toolbelt helpers.
//!
//! Usage:
//!   toolbelt walk [PATH]            List files breadth-first
//!   toolbelt hash FILE...           Print SHA-1 (or BLAKE3) digests
//!   toolbelt gzip SRC [DST]         Gzip a file
//!   toolbelt cat FILE               Print a file, decompressing .gz/.bz2/.xz
//!   toolbelt zip DIR OUTPUT         Zip the contents of a directory
//!   toolbelt unzip-list ZIP         List the files in a zip archive

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Instant, UNIX_EPOCH};

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, eyre};
use tracing_subscriber::EnvFilter;

use toolbelt_core::{FormattedDuration, WalkConfig, WalkEntry};
use toolbelt_ops::{HashAlgorithm, ToolError};
use toolbelt_walk::{TryRecvError, WalkEvent, Walker};

#[derive(Parser)]
#[command(
    name = "toolbelt",
    version,
    about = "File, archive and hashing helpers",
    long_about = "toolbelt bundles small helpers for walking directories, hashing, \
                  compressing and zipping files."
)]
struct Cli {
    /// Log more detail to stderr (repeat for trace output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List files breadth-first
    Walk {
        /// Directory to walk
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Stop after this many files
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Entries buffered ahead of the output
        #[arg(long, default_value_t = toolbelt_core::DEFAULT_CHANNEL_CAPACITY)]
        buffer: usize,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print content digests
    Hash {
        /// Files to hash
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Hash algorithm
        #[arg(short, long, default_value = "sha1")]
        algorithm: Algorithm,
    },

    /// Gzip a file with best compression
    Gzip {
        /// File to compress
        src: PathBuf,

        /// Output path (defaults to SRC.gz)
        dst: Option<PathBuf>,
    },

    /// Print a file, decompressing it based on its extension
    Cat {
        /// File to print
        path: PathBuf,
    },

    /// Zip the contents of a directory
    Zip {
        /// Directory to archive
        dir: PathBuf,

        /// Zip file to create
        output: PathBuf,
    },

    /// List the files in a zip archive
    UnzipList {
        /// Zip file to read
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Algorithm {
    Sha1,
    Blake3,
}

impl From<Algorithm> for HashAlgorithm {
    fn from(a: Algorithm) -> Self {
        match a {
            Algorithm::Sha1 => HashAlgorithm::Sha1,
            Algorithm::Blake3 => HashAlgorithm::Blake3,
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Walk {
            path,
            limit,
            buffer,
            format,
        } => run_walk(path, limit, buffer, format)?,
        Command::Hash { paths, algorithm } => run_hash(&paths, algorithm.into())?,
        Command::Gzip { src, dst } => {
            let dst = dst.unwrap_or_else(|| append_extension(&src, "gz"));
            toolbelt_ops::gzip_file(&dst, &src).context("Gzip failed")?;
            eprintln!(
                "{} -> {} ({})",
                src.display(),
                dst.display(),
                format_size(toolbelt_ops::file::file_size(&dst)?)
            );
        }
        Command::Cat { path } => {
            let data = toolbelt_ops::read_maybe_compressed(&path)?;
            std::io::stdout().write_all(&data)?;
        }
        Command::Zip { dir, output } => {
            toolbelt_ops::create_zip_with_dir_content(&output, &dir).context("Zip failed")?;
            eprintln!("Created {}", output.display());
        }
        Command::UnzipList { path } => {
            for (name, data) in toolbelt_ops::read_zip_file(&path)? {
                println!("{:>10}  {name}", format_size(data.len() as u64));
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Walk a directory and print the files found.
fn run_walk(path: PathBuf, limit: Option<usize>, buffer: usize, format: OutputFormat) -> Result<()> {
    let config = WalkConfig::builder()
        .root(path)
        .channel_capacity(buffer)
        .build()
        .map_err(|e| ToolError::InvalidConfig {
            message: e.to_string(),
        })?;

    let start = Instant::now();
    let walker = Walker::new(config);
    let mut events = walker.subscribe();
    let mut walk = walker.start()?;

    let mut total_size = 0u64;
    let mut json_entries = Vec::new();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for entry in walk.by_ref().take(limit.unwrap_or(usize::MAX)) {
        total_size += entry.size();
        match format {
            OutputFormat::Text => {
                writeln!(out, "{:>10}  {}", format_size(entry.size()), entry.full_path().display())?;
            }
            OutputFormat::Json => json_entries.push(entry_json(&entry)),
        }
    }

    let summary = walk.stop();

    if let OutputFormat::Json = format {
        let report = serde_json::json!({
            "entries": json_entries,
            "summary": summary,
        });
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    }

    loop {
        match events.try_recv() {
            Ok(WalkEvent::DirectorySkipped { path, error }) => {
                tracing::warn!("skipped {}: {error}", path.display());
            }
            Ok(WalkEvent::Finished(_)) => {}
            Err(TryRecvError::Lagged(n)) => {
                tracing::warn!("{n} skipped directories not reported");
            }
            Err(_) => break,
        }
    }

    eprintln!(
        "{} files, {} in {}{}",
        summary.files_emitted,
        format_size(total_size),
        FormattedDuration(start.elapsed()),
        if summary.dirs_skipped > 0 {
            format!(" ({} directories skipped)", summary.dirs_skipped)
        } else {
            String::new()
        }
    );

    Ok(())
}

/// JSON record for one walked file.
fn entry_json(entry: &WalkEntry) -> serde_json::Value {
    let modified = entry
        .info
        .modified
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    serde_json::json!({
        "name": entry.info.name_lossy(),
        "path": entry.full_path().to_string_lossy(),
        "size": entry.size(),
        "mode": entry.info.mode,
        "modified": modified,
    })
}

/// Hash files in parallel and print `digest  path` lines.
fn run_hash(paths: &[PathBuf], algorithm: HashAlgorithm) -> Result<()> {
    let mut failed = 0;
    for (path, result) in toolbelt_ops::hash_files(paths, algorithm) {
        match result {
            Ok(hex) => println!("{hex}  {}", path.display()),
            Err(err) => {
                eprintln!("{err}");
                failed += 1;
            }
        }
    }
    if failed > 0 {
        return Err(eyre!("{failed} file(s) could not be hashed"));
    }
    Ok(())
}

/// `foo.txt` + `gz` -> `foo.txt.gz`
fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
