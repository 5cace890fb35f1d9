//! PL/0 VM CLI: assemble, disassemble and execute stack-machine programs.
//!
//! Exit codes:
//! - 0: Normal halt / success
//! - 1: Input/decode/assembly error
//! - 2: Usage error
//! - 3: Runtime fault

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "pl0vm", version, about = "PL/0 stack-machine interpreter")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute a program (text listing, or binary if the file ends in .pl0b)
    Run(RunArgs),
    /// Assemble a text listing to binary
    Assemble {
        /// Input listing
        input: PathBuf,
        /// Output file (defaults to the input with a .pl0b extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Disassemble a program to a text listing
    Disassemble {
        /// Input program
        input: PathBuf,
    },
}

#[derive(Args, Debug)]
pub(crate) struct RunArgs {
    /// Program to execute
    pub input: PathBuf,

    /// Print a register and memory trace after every instruction
    #[arg(short = 'v', long = "trace", visible_short_alias = 't')]
    pub trace: bool,

    /// Compatibility mode: only out-of-bounds access and division by zero fault
    #[arg(long)]
    pub compat: bool,

    /// Fault with MissingHalt after this many instructions
    #[arg(long, value_name = "N")]
    pub max_steps: Option<u64>,

    /// Size of the process address space, in cells
    #[arg(long, value_name = "N", default_value_t = pl0vm::config::DEFAULT_CAPACITY)]
    pub capacity: usize,
}

/// Logs go to stderr so they never interleave with program output.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Run(args) => commands::run(&args),
        Command::Assemble { input, output } => commands::assemble(&input, output.as_deref()),
        Command::Disassemble { input } => commands::disassemble(&input),
    };

    if let Err(code) = result {
        process::exit(code);
    }
}
