//! chownshift - shift the numeric owner and group of a file tree.
//!
//! Usage:
//!   chownshift <DIFFERENCE> <PATH> [OPTIONS]
//!   chownshift 100000 /var/lib/lxc/web/rootfs --recursive
//!   chownshift -100000 ./restored --recursive --dry-run
//!   chownshift --help
//!
//! Exit codes: 0 success, 1 runtime error, 2 argument error.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};
use color_eyre::eyre::Result;

use chownshift_core::{ShiftConfig, ShiftError};
use chownshift_ops::{ShiftEvent, ShiftTransaction};

const EXIT_RUNTIME_ERROR: u8 = 1;
const EXIT_ARGUMENT_ERROR: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "chownshift",
    version,
    about = "Shift the UIDs and GIDs of files by a fixed offset",
    long_about = "chownshift adds a signed difference to the numeric owner and group of a file \
                  or directory tree, e.g. to move a restored container root filesystem into a \
                  different user namespace range.\n\n\
                  Every run first simulates the whole change and only touches the filesystem \
                  when the simulation succeeded.",
    after_help = "Exit codes:\n  0 - Success\n  1 - Error\n  2 - Argument error"
)]
struct Cli {
    /// Amount the UIDs and GIDs are shifted by (positive or negative)
    #[arg(allow_negative_numbers = true)]
    difference: i64,

    /// Target file or directory
    path: PathBuf,

    /// Recurse through the provided path
    #[arg(short = 'R', long)]
    recursive: bool,

    /// Print every simulated and applied change
    #[arg(short, long)]
    verbose: bool,

    /// Do not restore mode bits (setuid, setgid) after the ownership change
    #[arg(long = "nopermissions", visible_alias = "no-permissions")]
    no_permissions: bool,

    /// Simulate only; implies --verbose
    #[arg(long)]
    dry_run: bool,

    /// Preserve file capability sets (security.capability extended attribute)
    #[arg(short = 'x', long)]
    xattr: bool,

    /// Output format for the final report
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
enum OutputFormat {
    /// Only the change lines requested with --verbose
    #[default]
    Text,
    /// A JSON report of both passes on stdout
    Json,
}

impl Cli {
    /// Turn the parsed arguments into the immutable run configuration.
    fn to_config(&self) -> Result<ShiftConfig, ShiftError> {
        ShiftConfig::builder()
            .offset(self.difference)
            .target(self.path.clone())
            .recursive(self.recursive)
            .preserve_permissions(!self.no_permissions)
            .preserve_capabilities(self.xattr)
            .dry_run(self.dry_run)
            .verbose(self.verbose)
            .build()
            .map_err(|e| ShiftError::invalid_argument(e.to_string()))
    }
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    init_logging();

    if !cfg!(target_os = "linux") {
        tracing::warn!("chownshift has only been tested under Linux");
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return report_parse_error(&err),
    };

    let config = match cli.to_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            print_usage();
            return Ok(ExitCode::from(err.exit_code()));
        }
    };

    Ok(run(config, cli.format))
}

/// Set up tracing on stderr, filtered by `CHOWNSHIFT_LOG` or `RUST_LOG`.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("CHOWNSHIFT_LOG")
                .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
}

/// Run the transaction and map its outcome to an exit code.
fn run(config: ShiftConfig, format: OutputFormat) -> ExitCode {
    let transaction = ShiftTransaction::new(config);
    let verbose = transaction.config().is_verbose();

    let result = transaction.run(|event: &ShiftEvent| {
        if verbose {
            println!("{event}");
        }
    });

    match result {
        Ok(report) => {
            if format == OutputFormat::Json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{json}"),
                    Err(err) => {
                        eprintln!("Error: {err}");
                        return ExitCode::from(EXIT_RUNTIME_ERROR);
                    }
                }
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

/// Exit code for a command line error. Help and version requests are not errors.
fn parse_error_exit_code(err: &clap::Error) -> u8 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => EXIT_ARGUMENT_ERROR,
    }
}

/// Report a command line error, followed by the usage text on stdout.
fn report_parse_error(err: &clap::Error) -> Result<ExitCode> {
    err.print()?;
    let code = parse_error_exit_code(err);
    if code != 0 {
        print_usage();
    }
    Ok(ExitCode::from(code))
}

/// Print the full usage text to stdout.
fn print_usage() {
    println!("{}", Cli::command().render_help());
}
