//! bcp - Bulk Copy
//!
//! A robocopy-style, multithreaded copy/move/mirror command powered by bulkcopy.

use bulkcopy::{
    ConsoleSink, Copier, CopyOptions, Error as BulkError, JobFailure, ProgressSink, RunSummary,
    SilentSink, SpinnerSink,
};
use clap::Parser;
use serde_json::{Value, json};
use std::ffi::OsString;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const BANNER: &str = concat!(
    r"
    __
   / /_  _________
  / __ \/ ___/ __ \
 / /_/ / /__/ /_/ /
/_.___/\___/ .___/
          /_/      ",
    env!("CARGO_PKG_VERSION"),
    "\n ... a robocopy-style bulk copier with multithreaded copy."
);

/// bcp - Concurrent robocopy-style copy
///
/// Copy, move or mirror a file or directory tree using a pool of worker threads.
/// Robocopy-style flags are accepted in any of the forms /FLAG, -FLAG or --FLAG,
/// case-insensitively, and /MT:N sets the worker count. /FLAG forms must come
/// after SOURCE and DESTINATION.
///
/// Usage:
///   bcp SOURCE DESTINATION [/MT:N] [/create] [/purge] [/move] [/copyall] [/s]
#[derive(Parser, Debug)]
#[command(name = "bcp", version, about, long_about = None)]
struct Args {
    /// Path to the source directory (or file)
    source: PathBuf,

    /// Path to the destination directory (or file)
    destination: PathBuf,

    /// Creates multi-threaded copies with N threads
    #[arg(long = "mt", value_name = "N", default_value_t = 8)]
    mt: usize,

    /// Creates a directory tree and zero-length files only
    #[arg(long)]
    create: bool,

    /// Quits after processing command line (to view parameters)
    #[arg(long)]
    quit: bool,

    /// Deletes destination files and directories that no longer exist in the source
    #[arg(long)]
    purge: bool,

    /// Moves files and directories, deleting them from the source after they are copied
    #[arg(long = "move")]
    move_files: bool,

    /// Copies all file information (permissions and timestamps)
    #[arg(long)]
    copyall: bool,

    /// Copies subdirectories, excluding empty ones (/s)
    #[arg(long)]
    subdirs: bool,

    /// Be completely quiet during execution
    #[arg(long)]
    quiet: bool,

    /// Copy buffer size in bytes
    #[arg(long, value_name = "BYTES", default_value_t = 8192)]
    buffer_size: usize,

    /// Throughput reporting interval in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 100)]
    report_interval_ms: u64,

    /// Always copy, even if the destination file looks identical
    #[arg(long)]
    no_skip: bool,

    /// Also compare access times when deciding whether a file looks identical
    #[arg(long)]
    check_atime: bool,

    /// Report per-file errors as warnings and keep going
    #[arg(long)]
    ignore_errors: bool,

    /// Print the configuration and run summary as JSON
    #[arg(long)]
    json: bool,

    /// Verbose logging to stderr
    #[arg(short = 'v', long)]
    verbose: bool,
}

/// Flag names accepted after `/`, `-` or `--`, and their clap spelling.
const FLAG_ALIASES: &[(&str, &str)] = &[
    ("mt", "--mt"),
    ("create", "--create"),
    ("quit", "--quit"),
    ("purge", "--purge"),
    ("move", "--move"),
    ("copyall", "--copyall"),
    ("s", "--subdirs"),
    ("subdirs", "--subdirs"),
    ("quiet", "--quiet"),
    ("buffer-size", "--buffer-size"),
    ("report-interval-ms", "--report-interval-ms"),
    ("no-skip", "--no-skip"),
    ("check-atime", "--check-atime"),
    ("ignore-errors", "--ignore-errors"),
    ("json", "--json"),
    ("v", "--verbose"),
    ("verbose", "--verbose"),
    ("h", "--help"),
    ("?", "--help"),
    ("help", "--help"),
    ("version", "--version"),
];

const DEFAULT_WORKERS: &str = "8";

/// Flags whose value may follow as a separate argument.
const VALUE_FLAGS: &[&str] = &["--buffer-size", "--report-interval-ms"];

/// Translate robocopy-style arguments into the syntax clap expects.
///
/// `/MT:4`, `/mt 4`, `-MT:4` and `--mt=4` all become `--mt=4`; a bare `/MT`
/// means the default worker count. As in robocopy, `/FLAG` spellings are
/// only recognised after SOURCE and DESTINATION, so a path such as `/s` or
/// `/v` in either position is never taken for a flag. `-FLAG` and `--FLAG`
/// work anywhere. Arguments that are not a known flag pass through untouched.
fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut args = args.into_iter().peekable();
    let mut out = Vec::new();
    // Program name
    if let Some(program) = args.next() {
        out.push(program);
    }

    let mut positionals = 0;
    while let Some(arg) = args.next() {
        let Some(text) = arg.to_str() else {
            positionals += 1;
            out.push(arg);
            continue;
        };

        if text == "--" {
            out.push(arg);
            out.extend(args);
            break;
        }

        let body = match text.strip_prefix("--").or_else(|| text.strip_prefix('-')) {
            Some(body) => Some(body),
            None if positionals >= 2 => text.strip_prefix('/'),
            None => None,
        };
        let Some(body) = body.filter(|b| !b.is_empty()) else {
            if !text.starts_with('-') {
                positionals += 1;
            }
            out.push(arg);
            continue;
        };

        let (name, value) = match body.find([':', '=']) {
            Some(idx) => (&body[..idx], Some(&body[idx + 1..])),
            None => (body, None),
        };
        // -V is the only case-sensitive spelling
        let name = if name == "V" {
            "version".to_owned()
        } else {
            name.to_ascii_lowercase()
        };

        let Some(&(_, long)) = FLAG_ALIASES.iter().find(|(alias, _)| *alias == name) else {
            out.push(arg);
            continue;
        };

        match value {
            Some(value) => out.push(format!("{long}={value}").into()),
            None if long == "--mt" => {
                let next_is_count = args
                    .peek()
                    .and_then(|next| next.to_str())
                    .is_some_and(|next| next.parse::<usize>().is_ok());
                if next_is_count {
                    out.push(long.into());
                    out.extend(args.next());
                } else {
                    out.push(format!("{long}={DEFAULT_WORKERS}").into());
                }
            }
            None if VALUE_FLAGS.contains(&long) => {
                out.push(long.into());
                out.extend(args.next());
            }
            None => out.push(long.into()),
        }
    }

    out
}

type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Copy(#[from] BulkError),

    #[error("Failed to serialize JSON output: {source}")]
    JsonSerialize { source: serde_json::Error },
}

fn exit_code_for(error: &CliError) -> i32 {
    match error {
        CliError::Copy(BulkError::InvalidSource(_)) => 2,
        _ => 1,
    }
}

#[derive(Debug, Clone)]
struct EffectiveConfig {
    source: PathBuf,
    destination: PathBuf,
    options: CopyOptions,
    json: bool,
    verbose: bool,
}

impl EffectiveConfig {
    fn to_json_value(&self) -> CliResult<Value> {
        let options =
            serde_json::to_value(&self.options).map_err(|source| CliError::JsonSerialize { source })?;
        Ok(json!({
            "source": self.source.display().to_string(),
            "destination": self.destination.display().to_string(),
            "options": options,
        }))
    }

    fn print_human(&self) {
        let o = &self.options;
        println!("Source:                 {}", self.source.display());
        println!("Destination:            {}", self.destination.display());
        println!("Workers:                {}", o.parallel);
        println!("Buffer size:            {}", o.buffer_size);
        println!("Report interval:        {:?}", o.report_interval);
        println!("Zero-length files:      {}", o.zero_length);
        println!("Ignore empty dirs:      {}", o.ignore_empty_dirs);
        println!("Copy permissions:       {}", o.copy_permissions);
        println!("Move:                   {}", o.move_files);
        println!("Purge destination:      {}", o.purge);
        println!("Skip same-looking:      {}", o.skip_same_looking);
        println!("Compare access time:    {}", o.compare_access_time);
        println!("Ignore errors:          {}", o.ignore_errors);
        println!("Verbose:                {}", self.verbose);
    }
}

fn build_options_and_effective_config(args: &Args) -> (CopyOptions, EffectiveConfig) {
    let mut options = CopyOptions::default()
        .with_parallel(args.mt)
        .with_buffer_size(args.buffer_size)
        .with_report_interval(Duration::from_millis(args.report_interval_ms));

    if args.create {
        options = options.with_zero_length();
    }
    if args.subdirs {
        options = options.with_ignore_empty_dirs();
    }
    if args.copyall {
        options = options.with_copy_permissions();
    }
    if args.move_files {
        options = options.with_move();
    }
    if args.purge {
        options = options.with_purge();
    }
    if !args.no_skip {
        options = options.with_skip_same_looking();
    }
    if args.check_atime {
        options = options.with_access_time_check();
    }
    if args.ignore_errors {
        options = options.with_ignore_errors();
    }
    if args.quiet || args.json {
        options = options.with_quiet();
    }

    // Verbose runs leave warnings to tracing
    if !args.verbose {
        if args.quiet {
            options = options.with_warn_handler(|_| {});
        } else {
            options = options.with_warn_handler(|msg| {
                eprintln!("warning: {}", msg);
            });
        }
    }

    let effective_config = EffectiveConfig {
        source: args.source.clone(),
        destination: args.destination.clone(),
        options: options.clone(),
        json: args.json,
        verbose: args.verbose,
    };

    (options, effective_config)
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if verbose => EnvFilter::new("bulkcopy=debug,bcp=debug"),
        Err(_) => return,
    };

    // A subscriber may already be installed; keep it
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        if let CliError::Copy(BulkError::JobsFailed { failures, .. }) = &error {
            for failure in failures {
                eprintln!("  {failure}");
            }
        }
        std::process::exit(exit_code_for(&error));
    }
}

fn run() -> CliResult<()> {
    let args = Args::parse_from(normalize_args(std::env::args_os()));
    init_tracing(args.verbose);

    let (options, effective_config) = build_options_and_effective_config(&args);

    if args.quit {
        if effective_config.json {
            let payload = json!({
                "mode": "quit",
                "effective_config": effective_config.to_json_value()?,
            });
            print_json_value(&payload)?;
        } else {
            println!("{BANNER}");
            effective_config.print_human();
        }
        return Ok(());
    }

    if !args.quiet && !effective_config.json {
        println!("{BANNER}");
        effective_config.print_human();
    }

    tracing::debug!("effective configuration: {:?}", effective_config);

    let sink: Arc<dyn ProgressSink> = if args.quiet || effective_config.json {
        Arc::new(SilentSink)
    } else if io::stdout().is_terminal() {
        Arc::new(SpinnerSink::new())
    } else {
        Arc::new(ConsoleSink)
    };

    let mut copier = Copier::new(&args.source, &args.destination, options).with_sink(sink);

    match copier.execute() {
        Ok(summary) => {
            if effective_config.json {
                emit_execute_output(&effective_config, &summary, &[])?;
            }
            Ok(())
        }
        Err(BulkError::JobsFailed {
            failed,
            total,
            failures,
            summary,
        }) => {
            if effective_config.json {
                emit_execute_output(&effective_config, &summary, &failures)?;
            }
            Err(BulkError::JobsFailed {
                failed,
                total,
                failures,
                summary,
            }
            .into())
        }
        Err(error) => Err(error.into()),
    }
}

fn emit_execute_output(
    effective_config: &EffectiveConfig,
    summary: &RunSummary,
    failures: &[JobFailure],
) -> CliResult<()> {
    let summary_value =
        serde_json::to_value(summary).map_err(|source| CliError::JsonSerialize { source })?;
    let payload = json!({
        "mode": "execute",
        "effective_config": effective_config.to_json_value()?,
        "summary": summary_value,
        "elapsed_secs": summary.elapsed.as_secs_f64(),
        "throughput_bytes_per_sec": summary.throughput(),
        "failures": failures
            .iter()
            .map(|f| json!({
                "path": f.path.display().to_string(),
                "error": f.error.to_string(),
            }))
            .collect::<Vec<Value>>(),
    });
    print_json_value(&payload)
}

fn print_json_value(value: &Value) -> CliResult<()> {
    let serialized =
        serde_json::to_string(value).map_err(|source| CliError::JsonSerialize { source })?;
    println!("{serialized}");
    Ok(())
}
