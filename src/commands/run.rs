use std::fs;
use std::io::{self, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Args;

use crate::cli_util::{print_load_error, print_vm_error, stderr_wants_color};
use crate::config::VmConfig;
use crate::debugger::{ByteKeys, Debugger, PauseHandler, TerminalKeys};
use crate::engine::{Engine, StepControl};
use crate::error::VmError;
use crate::output::OutputChannel;
use crate::program::Program;
use crate::view::ViewOptions;

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// Read Brainfuck code from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file")]
    pub file: Option<String>,

    /// Concatenated Brainfuck code parts
    #[arg(value_name = "code", trailing_var_arg = true)]
    pub code: Vec<String>,

    /// Start in the paused (stepping) state
    #[arg(short = 'p', long = "paused")]
    pub paused: bool,

    /// Ignore `#` breakpoints; never pause
    #[arg(long = "no-debug", conflicts_with = "paused")]
    pub no_debug: bool,

    /// Number of tape cells (fallback BFCKR_TAPE_SIZE; default 10_000)
    #[arg(long = "tape-size", value_name = "N")]
    pub tape_size: Option<usize>,

    /// Maximum number of instructions after filtering (fallback BFCKR_MAX_PROGRAM)
    #[arg(long = "max-len", value_name = "N")]
    pub max_len: Option<usize>,

    /// Maximum interpreter steps before abort (fallback BFCKR_MAX_STEPS; default unlimited)
    #[arg(long = "max-steps", value_name = "N")]
    pub max_steps: Option<usize>,

    /// Wall-clock timeout in milliseconds (fallback BFCKR_TIMEOUT_MS; default none)
    #[arg(long = "timeout", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Key that resumes execution from a pause (default 'c')
    #[arg(long = "continue-key", value_name = "KEY")]
    pub continue_key: Option<char>,

    /// Disable colors in the debugger view
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

pub fn run(program: &str, args: RunArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    if args.file.is_none() && args.code.is_empty() {
        usage_and_exit(program, 2);
    }

    if args.file.is_some() && !args.code.is_empty() {
        eprintln!("{program}: cannot use positional code together with --file");
        usage_and_exit(program, 2);
    }

    // Resolve settings: flags -> env -> config file -> defaults
    let cfg = match resolve_config(&args) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{program}: {e}");
            let _ = io::stderr().flush();
            return 2;
        }
    };

    let source = match read_source(args.file.as_deref(), &args.code) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{program}: failed to read code file: {e}");
            let _ = io::stderr().flush();
            return 1;
        }
    };

    let loaded = match Program::load(&source, cfg.max_program_len) {
        Ok(p) => p,
        Err(e) => {
            print_load_error(Some(program), &e);
            return 1;
        }
    };
    // Error positions refer to the filtered stream, so keep it for context.
    let filtered = loaded.to_source();

    let cancel = Arc::new(AtomicBool::new(false));
    let timed_out = Arc::new(AtomicBool::new(false));

    // Ctrl+C flips the same flag the engine polls each step
    let cancel_on_sigint = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || cancel_on_sigint.store(true, Ordering::Relaxed)) {
        log::warn!("failed to set ctrl+c handler: {e}");
    }

    if let Some(ms) = cfg.timeout_ms {
        let cancel = cancel.clone();
        let timed_out = timed_out.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(ms));
            timed_out.store(true, Ordering::Relaxed);
            cancel.store(true, Ordering::Relaxed);
        });
    }

    let ctrl = StepControl::new(cfg.max_steps, cancel);
    let mut engine = Engine::with_config(loaded, &cfg);
    let mut output = OutputChannel::new(io::stdout(), cfg.history_size);

    let options = ViewOptions {
        continue_key: cfg.continue_key,
        colored: !args.no_color && stderr_wants_color(),
        palette: cfg.palette.clone(),
        ..ViewOptions::default()
    };

    // Debugger keys come from the terminal when there is one, otherwise from
    // the same stdin stream that feeds `,`.
    let mut debugger: Option<Box<dyn PauseHandler>> = if args.no_debug {
        None
    } else if io::stdin().is_terminal() {
        Some(Box::new(Debugger::new(TerminalKeys, io::stderr(), options)))
    } else {
        Some(Box::new(Debugger::new(ByteKeys::new(io::stdin()), io::stderr(), options)))
    };

    let result = engine.run(
        &mut io::stdin(),
        &mut output,
        debugger.as_deref_mut().map(|d| d as &mut dyn PauseHandler),
        Some(&ctrl),
    );

    let exit_code = match result {
        Ok(()) => 0,
        Err(VmError::Canceled) if timed_out.load(Ordering::Relaxed) => {
            eprintln!(
                "Execution aborted: wall-clock timeout exceeded ({} ms)",
                cfg.timeout_ms.unwrap_or_default()
            );
            let _ = io::stderr().flush();
            1
        }
        Err(err) => {
            let _ = output.flush();
            print_vm_error(Some(program), &filtered, &err);
            1
        }
    };

    // For readability, ensure output ends with a newline
    println!();
    let _ = io::stdout().flush();
    exit_code
}

fn resolve_config(args: &RunArgs) -> Result<VmConfig, crate::error::ConfigError> {
    let mut cfg = VmConfig::load()?;
    if let Some(n) = args.tape_size {
        cfg.tape_size = n;
    }
    if let Some(n) = args.max_len {
        cfg.max_program_len = n;
    }
    if let Some(n) = args.max_steps {
        cfg.max_steps = Some(n);
    }
    if let Some(ms) = args.timeout_ms {
        cfg.timeout_ms = Some(ms);
    }
    if let Some(key) = args.continue_key {
        cfg.set("continue_key", &key.to_string())?;
    }
    if args.paused {
        cfg.start_paused = true;
    }
    if args.no_debug {
        cfg.start_paused = false;
    }
    cfg.validate()?;
    Ok(cfg)
}

/// File bytes, or the positional parts joined without separators.
pub(crate) fn read_source(file: Option<&str>, code: &[String]) -> io::Result<Vec<u8>> {
    match file {
        Some(path) => fs::read(path),
        None => Ok(code.join("").into_bytes()),
    }
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run [OPTIONS] "<code>"
  {0} run [OPTIONS] --file <PATH>

Options:
  --file,  -f <PATH>    Read Brainfuck code from PATH instead of positional "<code>"
  --paused, -p          Start paused, before the first instruction
  --no-debug            Ignore `#` breakpoints
  --tape-size <N>       Number of tape cells (default 10000)
  --max-len <N>         Maximum program length in instructions (default 10000)
  --max-steps <N>       Abort after N instructions
  --timeout <MS>        Abort after MS milliseconds of wall-clock time
  --continue-key <KEY>  Key that resumes from a pause (default 'c')
  --no-color            Plain debugger view
  --help,  -h           Show this help

Notes:
- Only ><+-.,[]# are instructions; every other character is ignored.
- `#` pauses execution. While paused, press the continue key to run on,
  or any other key to execute one instruction.
- Input (`,`) reads a single byte from stdin; on EOF the current cell is set to 0.
- The tape pointer wraps around at both ends.

Examples:
- Load Brainfuck code from a file:
    {0} run --file ./program.bf
- Read bytes from a file as stdin (`,` will consume file input):
    {0} run ",[.,]" < input.txt
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
