//! Text rendering of a paused machine: instruction window, tape window and
//! output history.
//!
//! Both windows are centered on their pointer and have a fixed width of
//! `2 * radius + 1` slots. Slots that fall before the start or past the end
//! of the program/tape render as blanks; the view never wraps around.

use std::fmt::Write as _;

use nu_ansi_term::Style;

use crate::engine::Snapshot;
use crate::program::Program;
use crate::tape::Tape;
use crate::theme::Palette;

pub const DEFAULT_PROGRAM_RADIUS: usize = 10;
pub const DEFAULT_TAPE_RADIUS: usize = 4;

const TAPE_SLOT: usize = 5;

#[derive(Debug, Clone)]
pub struct ViewOptions {
    pub program_radius: usize,
    pub tape_radius: usize,
    pub continue_key: char,
    pub colored: bool,
    pub palette: Palette,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            program_radius: DEFAULT_PROGRAM_RADIUS,
            tape_radius: DEFAULT_TAPE_RADIUS,
            continue_key: 'c',
            colored: false,
            palette: Palette::default(),
        }
    }
}

impl ViewOptions {
    fn paint(&self, style: Style, text: &str) -> String {
        if self.colored {
            style.paint(text).to_string()
        } else {
            text.to_string()
        }
    }
}

/// Absolute indices covered by a window of `radius` around `center`.
/// Out-of-range slots are `None`.
pub fn window_indices(center: usize, radius: usize, len: usize) -> Vec<Option<usize>> {
    (0..=2 * radius)
        .map(|slot| {
            let idx = (center + slot).checked_sub(radius)?;
            (idx < len).then_some(idx)
        })
        .collect()
}

/// Instruction window plus a caret line under the current instruction.
pub fn program_window(program: &Program, opts: &ViewOptions) -> [String; 2] {
    let ip = program.ip();
    let code = program.instructions();
    let mut line = String::new();
    for slot in window_indices(ip, opts.program_radius, code.len()) {
        line.push(' ');
        match slot {
            Some(i) => {
                let instr = code[i];
                let mut style = opts.palette.style_for(instr);
                if i == ip {
                    style = style.reverse();
                }
                line.push_str(&opts.paint(style, &instr.symbol().to_string()));
            }
            None => line.push(' '),
        }
    }

    // Each slot is two columns wide and the current one is always the middle slot.
    let caret = format!("{}^", " ".repeat(2 * opts.program_radius + 1));
    [line, opts.paint(Style::new().fg(opts.palette.dim), &caret)]
}

/// Relative offset labels over the cell values around the data pointer.
pub fn tape_window(tape: &Tape, opts: &ViewOptions) -> [String; 2] {
    let ptr = tape.pointer();
    let mut labels = String::new();
    let mut values = String::new();
    for slot in window_indices(ptr, opts.tape_radius, tape.capacity()) {
        let Some(i) = slot else {
            labels.push_str(&" ".repeat(TAPE_SLOT));
            values.push_str(&" ".repeat(TAPE_SLOT));
            continue;
        };
        let offset = i as isize - ptr as isize;
        let label = if offset == 0 { "0".to_string() } else { format!("{offset:+}") };
        let value = tape.get(i).unwrap_or(0);

        let label_style = if offset == 0 {
            Style::new().fg(opts.palette.tape_cell_pointer).bold()
        } else {
            Style::new().fg(opts.palette.dim)
        };
        let value_style = if offset == 0 {
            Style::new().fg(opts.palette.tape_cell_pointer).bold().reverse()
        } else if value == 0 {
            Style::new().fg(opts.palette.tape_cell_empty)
        } else {
            Style::new().fg(opts.palette.tape_cell_nonzero)
        };

        labels.push_str(&opts.paint(label_style, &format!("{label:>width$}", width = TAPE_SLOT)));
        values.push_str(&opts.paint(value_style, &format!("{value:>width$}", width = TAPE_SLOT)));
    }
    [labels, values]
}

/// Printable ASCII as-is, everything else as `\xHH` (newlines included, so
/// the history stays on one line).
pub fn escape_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            0x20..=0x7E => out.push(b as char),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            _ => {
                let _ = write!(&mut out, "\\x{:02X}", b);
            }
        }
    }
    out
}

/// The full debugger screen for one pause.
pub fn render(view: &Snapshot<'_>, opts: &ViewOptions) -> String {
    let heading = Style::new().fg(opts.palette.heading).bold();
    let dim = Style::new().fg(opts.palette.dim);
    let mut out = String::new();

    let cell = view.tape.read_cell();
    let status = format!(
        "-- paused | ip {}/{} | ptr {} | cell {} | step {} --",
        view.program.ip(),
        view.program.len(),
        view.tape.pointer(),
        cell,
        view.steps
    );
    let _ = writeln!(out, "{}", opts.paint(heading, &status));

    let [code, caret] = program_window(view.program, opts);
    let _ = writeln!(out, "{} {code}", opts.paint(heading, "program"));
    let _ = writeln!(out, "        {caret}");

    let [labels, values] = tape_window(view.tape, opts);
    let _ = writeln!(out, "{} {labels}", opts.paint(heading, "tape   "));
    let _ = writeln!(out, "        {values}");

    let mut history = format!("\"{}\"", escape_bytes(view.history));
    if view.dropped > 0 {
        let _ = write!(history, " (+{} not shown)", view.dropped);
    }
    let _ = writeln!(out, "{} {history}", opts.paint(heading, "output "));

    let hint = format!("[{}] continue  [any other key] step", opts.continue_key);
    let _ = writeln!(out, "{}", opts.paint(dim, &hint));
    out
}
