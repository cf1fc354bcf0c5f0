//! Spherehorn command-line interpreter.
//!
//! Runs one source file against stdin/stdout. Diagnostics and logs go to
//! stderr so program output stays byte-exact.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use spherehorn::{ErrorCategory, ExecutorConfig, IOContext, Program, SpherehornError, Status};
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const EXIT_FAILURE: u8 = 1;
const EXIT_USAGE: u8 = 64;
const EXIT_NO_INPUT: u8 = 66;

#[derive(Parser, Debug)]
#[command(name = "spherehorn")]
#[command(about = "Run a Spherehorn program", version)]
struct Cli {
    /// Source file to run
    file: PathBuf,

    /// Abort after this many instructions
    #[arg(long, value_name = "N")]
    max_steps: Option<u64>,

    /// Print the final memory tree as JSON on stderr
    #[arg(long)]
    dump_memory: bool,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Exit code for a host error that stopped the program before or instead of running.
fn exit_code(err: &SpherehornError) -> u8 {
    match err.category() {
        ErrorCategory::Usage => EXIT_USAGE,
        ErrorCategory::Parse | ErrorCategory::Build | ErrorCategory::Memory | ErrorCategory::Io => {
            EXIT_FAILURE
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version land here too
            let code = if err.use_stderr() { EXIT_USAGE } else { 0 };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };
    init_logging(cli.verbose);

    let source = match fs::read_to_string(&cli.file) {
        Ok(source) => source,
        Err(err) => {
            error!(path = %cli.file.display(), %err, "cannot read source");
            eprintln!("Could not open file: {}", cli.file.display());
            return ExitCode::from(EXIT_NO_INPUT);
        }
    };

    let mut program = match Program::parse(&source) {
        Ok(program) => program,
        Err(err) => {
            if let SpherehornError::Parse(errors) = &err {
                for parse_error in errors.iter() {
                    eprintln!("{}", parse_error);
                }
                eprintln!("Program was not run, as there were one or more parse errors.");
            } else {
                eprintln!("Error: {}", err);
            }
            return ExitCode::from(exit_code(&err));
        }
    };

    let config = ExecutorConfig {
        max_steps: cli.max_steps,
    };
    let mut io = IOContext::stdio();
    let status = match program.run_with(&mut io, config) {
        Ok(status) => status,
        Err(err) => {
            eprintln!("Error: {}", err);
            return ExitCode::from(exit_code(&err));
        }
    };
    debug!(%status, steps = program.steps(), "program ended");

    if cli.dump_memory {
        match serde_json::to_string_pretty(&program.snapshot()) {
            Ok(json) => eprintln!("{}", json),
            Err(err) => error!(%err, "cannot serialize memory"),
        }
    }

    match (status, program.abort()) {
        (Status::Abort, Some(abort)) => {
            eprintln!("Error: {}", abort);
            ExitCode::from(EXIT_FAILURE)
        }
        (Status::Abort, None) => ExitCode::from(EXIT_FAILURE),
        _ => ExitCode::SUCCESS,
    }
}
