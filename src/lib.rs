//! A Brainfuck tape machine with a breakpoint-driven stepping debugger.
//!
//! Programs use the eight classic instructions `><+-.,[]` plus `#`, which
//! switches the machine into paused mode from that point on.
//!
//! Features and behaviors:
//! - Fixed-size tape (10,000 cells by default) initialized to 0.
//! - The data pointer wraps at both ends of the tape; cells wrap at 0/255.
//! - Input `,` reads a single byte; on EOF the current cell is set to 0.
//! - Output `.` writes the current cell as a raw byte and keeps a bounded
//!   history for the debugger view.
//! - Loops are matched by scanning for the partner bracket when a jump is
//!   taken; an unmatched bracket is an error only once execution reaches it.
//! - Any non-instruction byte is dropped when the program is loaded.
//!
//! Quick start:
//!
//! ```no_run
//! use bfckr::{Engine, OutputChannel, Program, Tape};
//!
//! let code = "++++++++++[>+++++++>++++++++++>+++>+<<<<-]>++.>+.+++++++..+++.>++.<<+++++++++++++++.>.+++.------.--------.>+.>.";
//! let program = Program::load(code.as_bytes(), 10_000).expect("program fits");
//! let mut engine = Engine::new(program, Tape::new(30), false);
//! let mut output = OutputChannel::new(std::io::stdout(), 1_000);
//! engine
//!     .run(&mut std::io::stdin(), &mut output, None, None)
//!     .expect("program should run");
//! ```

pub mod cli_util;
pub mod commands;
pub mod config;
pub mod debugger;
pub mod engine;
pub mod error;
pub mod output;
pub mod program;
pub mod tape;
pub mod theme;
pub mod view;

pub use config::VmConfig;
pub use debugger::{ByteKeys, DebugCommand, DebugState, Debugger, Key, KeySource, PauseHandler, TerminalKeys};
pub use engine::{match_bracket, Engine, Seek, Snapshot, StepControl};
pub use error::{BracketKind, ConfigError, LoadError, VmError};
pub use output::OutputChannel;
pub use program::{filter_source, Instruction, Program};
pub use tape::Tape;
pub use view::ViewOptions;
