//! `lua2json` CLI — convert Lua data-table files to JSON from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Convert stdin → stdout
//! echo 'data:extend({ { type = "item", name = "x" } })' | lua2json convert
//!
//! # Convert one file; writes items.json next to it
//! lua2json convert prototypes/items.lua
//!
//! # Convert a whole mod tree into out/, mirroring its directory structure
//! lua2json convert prototypes/ -o out/
//!
//! # Compact output, ASCII-only strings, empty tables as arrays
//! lua2json convert prototypes/ --indent 0 --ascii --empty-table array
//!
//! # Only check that every file parses
//! lua2json check prototypes/
//! ```
//!
//! Exit code is 0 when every file converted and 1 when any failed. Logging goes
//! to stderr and is controlled by `-v`/`-vv` or `RUST_LOG`.

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use luadata_core::{ConvertOptions, EmptyTable, LuaDataError, ParseOptions};
use std::collections::HashMap;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(
    name = "lua2json",
    version,
    about = "Convert Lua data-table files (data:extend) to JSON"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert Lua files to JSON
    Convert {
        /// Files or directories (reads stdin and writes stdout if omitted)
        paths: Vec<PathBuf>,
        /// Output directory (default: next to each input file)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        format: FormatArgs,
        #[command(flatten)]
        batch: BatchArgs,
    },
    /// Check that Lua files parse, without writing anything
    Check {
        /// Files or directories (reads stdin if omitted)
        paths: Vec<PathBuf>,
        #[command(flatten)]
        batch: BatchArgs,
    },
}

#[derive(Args)]
struct FormatArgs {
    /// Indentation width; 0 writes compact single-line JSON
    #[arg(long, default_value_t = 2)]
    indent: usize,
    /// Escape every non-ASCII character as \uXXXX
    #[arg(long)]
    ascii: bool,
    /// What an empty table `{}` becomes
    #[arg(long, value_enum, default_value_t = EmptyTableArg::Object)]
    empty_table: EmptyTableArg,
}

#[derive(Args)]
struct BatchArgs {
    /// File extension to look for when walking directories
    #[arg(long, default_value = "lua")]
    extension: String,
    /// Stop at the first file that fails
    #[arg(long)]
    fail_fast: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum EmptyTableArg {
    Object,
    Array,
}

impl FormatArgs {
    fn to_options(&self) -> ConvertOptions {
        let empty_table = match self.empty_table {
            EmptyTableArg::Object => EmptyTable::Object,
            EmptyTableArg::Array => EmptyTable::Array,
        };
        ConvertOptions::new()
            .with_indent(self.indent)
            .with_ascii_only(self.ascii)
            .with_empty_table(empty_table)
    }
}

/// One input file and where its JSON goes.
#[derive(Debug)]
struct Job {
    input: PathBuf,
    output: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let all_ok = match cli.command {
        Commands::Convert {
            paths,
            output,
            format,
            batch,
        } => {
            let options = format.to_options();
            if paths.is_empty() {
                convert_stdin(&options)?
            } else {
                let jobs = plan_jobs(&paths, output.as_deref(), &batch.extension)?;
                check_output_collisions(&jobs)?;
                run_batch(&jobs, batch.fail_fast, |job| convert_file(job, &options))
            }
        }
        Commands::Check { paths, batch } => {
            if paths.is_empty() {
                check_stdin()?
            } else {
                let jobs = plan_jobs(&paths, None, &batch.extension)?;
                let ok = run_batch(&jobs, batch.fail_fast, check_file);
                if ok {
                    println!("{} file(s) OK", jobs.len());
                }
                ok
            }
        }
    };

    if !all_ok {
        process::exit(1);
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Expand the command-line paths into conversion jobs.
///
/// - a file maps to `<name>.json` beside it, or in `output_root`
/// - a directory is walked recursively for `extension` files; outputs go
///   beside each file, or under `output_root` at the same relative path
fn plan_jobs(paths: &[PathBuf], output_root: Option<&Path>, extension: &str) -> Result<Vec<Job>> {
    let mut jobs = Vec::new();
    for path in paths {
        if path.is_dir() {
            let found = discover(path, extension)?;
            if found.is_empty() {
                warn!(dir = %path.display(), extension, "no matching files found");
            }
            for input in found {
                let output = match output_root {
                    Some(root) => {
                        let relative = input.strip_prefix(path).with_context(|| {
                            format!("{} is not under {}", input.display(), path.display())
                        })?;
                        root.join(relative).with_extension("json")
                    }
                    None => input.with_extension("json"),
                };
                jobs.push(Job { input, output });
            }
        } else if path.is_file() {
            let output = match output_root {
                Some(root) => {
                    let name = path
                        .file_name()
                        .with_context(|| format!("Not a file path: {}", path.display()))?;
                    root.join(name).with_extension("json")
                }
                None => path.with_extension("json"),
            };
            jobs.push(Job {
                input: path.clone(),
                output,
            });
        } else {
            bail!("No such file or directory: {}", path.display());
        }
    }
    Ok(jobs)
}

/// Fails if two jobs would write the same output file.
fn check_output_collisions(jobs: &[Job]) -> Result<()> {
    let mut planned: HashMap<&Path, &Path> = HashMap::with_capacity(jobs.len());
    for job in jobs {
        if let Some(first) = planned.insert(&job.output, &job.input) {
            bail!(
                "{} and {} would both write {}",
                first.display(),
                job.input.display(),
                job.output.display()
            );
        }
    }
    Ok(())
}

/// All files under `dir` with the given extension (case-insensitive), sorted.
fn discover(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        let matches = entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if matches {
            debug!(path = %entry.path().display(), "discovered");
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Run `step` over every job. A failing file is reported and the batch goes
/// on unless `fail_fast`. Returns whether every job succeeded.
fn run_batch<F>(jobs: &[Job], fail_fast: bool, mut step: F) -> bool
where
    F: FnMut(&Job) -> Result<bool>,
{
    let mut failed = 0;
    for (done, job) in jobs.iter().enumerate() {
        let ok = match step(job) {
            Ok(ok) => ok,
            Err(e) => {
                eprintln!("{}: error: {:#}", job.input.display(), e);
                false
            }
        };
        if !ok {
            failed += 1;
            if fail_fast {
                let skipped = jobs.len() - done - 1;
                if skipped > 0 {
                    warn!(skipped, "stopping at first failure");
                }
                break;
            }
        }
    }
    if failed > 0 {
        eprintln!("{} of {} file(s) failed", failed, jobs.len());
    }
    failed == 0
}

/// Convert one file. `Ok(false)` means the source was rejected (already
/// reported); `Err` is an I/O failure.
fn convert_file(job: &Job, options: &ConvertOptions) -> Result<bool> {
    let source = read_source(&job.input)?;
    match luadata_core::convert(&source, options) {
        Ok(json) => {
            write_output(&job.output, &json)?;
            info!(input = %job.input.display(), output = %job.output.display(), "converted");
            Ok(true)
        }
        Err(e) => {
            report(&job.input.display().to_string(), &source, &e);
            Ok(false)
        }
    }
}

fn check_file(job: &Job) -> Result<bool> {
    let source = read_source(&job.input)?;
    match luadata_core::parse_str(&source, &ParseOptions::default()) {
        Ok(_) => {
            info!(input = %job.input.display(), "ok");
            Ok(true)
        }
        Err(e) => {
            report(&job.input.display().to_string(), &source, &e);
            Ok(false)
        }
    }
}

fn convert_stdin(options: &ConvertOptions) -> Result<bool> {
    let source = read_stdin()?;
    match luadata_core::convert(&source, options) {
        Ok(json) => {
            print!("{}", json);
            Ok(true)
        }
        Err(e) => {
            report("<stdin>", &source, &e);
            Ok(false)
        }
    }
}

fn check_stdin() -> Result<bool> {
    let source = read_stdin()?;
    match luadata_core::parse_str(&source, &ParseOptions::default()) {
        Ok(_) => {
            println!("<stdin> OK");
            Ok(true)
        }
        Err(e) => {
            report("<stdin>", &source, &e);
            Ok(false)
        }
    }
}

/// Print `file:line:col: error[kind]: message` to stderr.
fn report(file: &str, source: &str, error: &LuaDataError) {
    let (line, col) = error.line_col(source);
    debug!(file, offset = error.offset(), kind = error.kind(), "conversion failed");
    eprintln!("{}:{}:{}: error[{}]: {}", file, line, col, error.kind(), error);
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read from stdin")?;
    Ok(buf)
}

/// Write through a temporary sibling and rename, so a failed write never
/// leaves a truncated `.json` behind.
fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let tmp = path.with_extension("json.tmp");
    let written = std::fs::write(&tmp, content).and_then(|()| std::fs::rename(&tmp, path));
    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp);
        return Err(e).with_context(|| format!("Failed to write file: {}", path.display()));
    }
    Ok(())
}
