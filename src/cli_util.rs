use std::io::{self, IsTerminal, Write};

use crate::error::{LoadError, VmError};

/// Show a short window around the position for context
const WINDOW_CHARS: usize = 32;

/// Pretty-print a run failure with caret positioning into `code`, the
/// filtered instruction stream the error indices refer to.
/// If `program` is `Some("bfckr")`, prefix messages with "bfckr: ...".
pub fn print_vm_error(program: Option<&str>, code: &str, err: &VmError) {
    let msg = match err {
        VmError::UnmatchedBracket { ip, kind } => Some((
            format!("Runtime error: unmatched bracket {kind}"),
            *ip,
        )),
        VmError::Io { ip, source } => Some((format!("I/O error: {source}"), *ip)),
        VmError::Debugger { .. } | VmError::StepLimitExceeded { .. } | VmError::Canceled => None,
    };

    match msg {
        Some((msg, ip)) => print_error_with_context(&prefixed(program, &msg), code, ip),
        None => {
            eprintln!("{}", prefixed(program, &err.to_string()));
            let _ = io::stderr().flush();
        }
    }
}

pub fn print_load_error(program: Option<&str>, err: &LoadError) {
    eprintln!("{}", prefixed(program, &format!("Load error: {err}")));
    let _ = io::stderr().flush();
}

fn prefixed(program: Option<&str>, msg: &str) -> String {
    match program {
        Some(p) => format!("{p}: {msg}"),
        None => msg.to_string(),
    }
}

/// Print a concise error with instruction index and a caret context window.
pub fn print_error_with_context(prefix: &str, code: &str, pos: usize) {
    eprint!("{}", error_with_context(prefix, code, pos));
    let _ = io::stderr().flush();
}

/// The three lines printed by [`print_error_with_context`].
pub fn error_with_context(prefix: &str, code: &str, pos: usize) -> String {
    let total_chars = code.chars().count();
    let start_char = pos.saturating_sub(WINDOW_CHARS);
    let end_char = (pos + WINDOW_CHARS + 1).min(total_chars);

    let slice: String = code.chars().skip(start_char).take(end_char.saturating_sub(start_char)).collect();

    // Caret under the exact position
    let caret_offset_chars = pos.saturating_sub(start_char);
    let underline = format!("{}^", " ".repeat(caret_offset_chars));

    format!("{prefix} at instruction {pos}\n  {slice}\n  {underline}\n")
}

/// Colors only when stderr is a terminal and `NO_COLOR` is unset.
pub fn stderr_wants_color() -> bool {
    io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}
