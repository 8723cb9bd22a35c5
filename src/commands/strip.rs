use std::io::{self, Write};

use clap::Args;

use crate::commands::run::read_source;
use crate::program::filter_source;

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct StripArgs {
    /// Read source from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file")]
    pub file: Option<String>,

    /// Concatenated source parts
    #[arg(value_name = "code", trailing_var_arg = true)]
    pub code: Vec<String>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

pub fn run(program: &str, args: StripArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    if args.file.is_some() && !args.code.is_empty() {
        eprintln!("{program}: cannot use positional code together with --file");
        usage_and_exit(program, 2);
    }

    if args.file.is_none() && args.code.is_empty() {
        usage_and_exit(program, 2);
    }

    let source = match read_source(args.file.as_deref(), &args.code) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{program}: failed to read code file: {e}");
            let _ = io::stderr().flush();
            return 1;
        }
    };

    // No length limit here: stripping never executes anything.
    let stripped: String = filter_source(&source).iter().map(|instr| instr.symbol()).collect();
    println!("{stripped}");
    let _ = io::stdout().flush();
    0
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} strip "<code>"
  {0} strip --file <PATH>

Options:
  --file,  -f <PATH>  Read source from PATH instead of positional "<code>"
  --help,  -h         Show this help

Description:
  Prints only the instruction characters ><+-.,[]# of the source, in order.
  This is exactly the program `{0} run` executes.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
