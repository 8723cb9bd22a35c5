use bfckr::commands::{run::RunArgs, strip::StripArgs};
use clap::{Parser, Subcommand};
use std::env;
use std::io::{self, Write};

fn print_top_usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run   [OPTIONS] "<code>"      # Run Brainfuck code (args are concatenated)
  {0} run   [OPTIONS] --file <PATH> # Run Brainfuck code loaded from file
  {0} strip "<code>"                # Print only the instruction characters
  {0} strip --file <PATH>           # Same, reading the source from a file

Place `#` in the code to pause there and step through the program.
Set BFCKR_LOG (e.g. BFCKR_LOG=debug) for diagnostic logging on stderr.

Run "{0} <subcommand> --help" for more info.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}

#[derive(Parser, Debug)]
#[command(name = "bfckr", disable_help_flag = true, disable_help_subcommand = true)]
struct Cli {
    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    Run(RunArgs),
    Strip(StripArgs),
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("BFCKR_LOG", "warn"))
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .init();
}

fn main() {
    init_logging();

    // We still pull the program name for help rendering consistency
    let program = env::args().next().unwrap_or_else(|| String::from("bfckr"));

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        print_top_usage_and_exit(&program, if cli.help { 0 } else { 2 });
    };
    if cli.help {
        print_top_usage_and_exit(&program, 0);
    }

    let code = match command {
        Command::Run(args) => bfckr::commands::run::run(&program, args),
        Command::Strip(args) => bfckr::commands::strip::run(&program, args),
    };

    std::process::exit(code);
}
