//! Interactive stepping debugger.
//!
//! The engine tracks a single paused flag: `#` sets it, the debugger's
//! continue command clears it. While it is set the engine hands a
//! [`Snapshot`] to a [`PauseHandler`] before every instruction and waits for
//! the answer. [`Debugger`] is the stock handler: it renders the view to a
//! screen writer and blocks on one key from a [`KeySource`].

use std::io::{self, Read, Write};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;

use crate::engine::Snapshot;
use crate::error::VmError;
use crate::view::{self, ViewOptions};

/// Default key that resumes free-running execution.
pub const DEFAULT_CONTINUE_KEY: char = 'c';

/// The two states of the pause/resume machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugState {
    Running,
    Paused,
}

impl DebugState {
    pub fn from_paused(paused: bool) -> Self {
        if paused { DebugState::Paused } else { DebugState::Running }
    }
}

/// What the engine should do after a pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugCommand {
    /// Execute exactly one instruction and pause again.
    Step,
    /// Leave the paused state until the next breakpoint.
    Continue,
}

/// Called by the engine before each instruction while paused.
pub trait PauseHandler {
    fn pause(&mut self, view: &Snapshot<'_>) -> Result<DebugCommand, VmError>;
}

/// A single keypress as the debugger sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    /// A key with no character (arrows, function keys, ...).
    Other,
    /// No more keys will arrive.
    Closed,
}

/// Blocking source of debugger keypresses.
pub trait KeySource {
    /// Wait for the next key. An `Interrupted` error cancels the run.
    fn next_key(&mut self) -> io::Result<Key>;
}

/// Raw-mode single keypresses from the controlling terminal.
///
/// Raw mode is only held for the duration of one read, so program output
/// and the rendered view use normal line discipline.
#[derive(Debug, Default)]
pub struct TerminalKeys;

impl KeySource for TerminalKeys {
    fn next_key(&mut self) -> io::Result<Key> {
        terminal::enable_raw_mode()?;
        let read = loop {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => break Ok(key),
                Ok(_) => continue,
                Err(e) => break Err(e),
            }
        };
        terminal::disable_raw_mode()?;

        let key = read?;
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Err(io::Error::new(io::ErrorKind::Interrupted, "ctrl+c in debugger"));
        }
        Ok(match key.code {
            KeyCode::Char(ch) => Key::Char(ch),
            KeyCode::Enter => Key::Char('\n'),
            _ => Key::Other,
        })
    }
}

/// Keys taken byte by byte from a reader, for piped or scripted sessions.
///
/// Whitespace is skipped so a script can put one key per line. End of input
/// is reported as [`Key::Closed`].
pub struct ByteKeys<R: Read> {
    reader: R,
}

impl<R: Read> ByteKeys<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: Read> KeySource for ByteKeys<R> {
    fn next_key(&mut self) -> io::Result<Key> {
        let mut buf = [0u8; 1];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => return Ok(Key::Closed),
                Ok(_) if buf[0].is_ascii_whitespace() => continue,
                Ok(_) => return Ok(Key::Char(buf[0] as char)),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

/// Renders each pause to `screen` and reads one key from `keys`.
pub struct Debugger<K: KeySource, S: Write> {
    keys: K,
    screen: S,
    options: ViewOptions,
    pauses: usize,
}

impl<K: KeySource, S: Write> Debugger<K, S> {
    pub fn new(keys: K, screen: S, options: ViewOptions) -> Self {
        Self {
            keys,
            screen,
            options,
            pauses: 0,
        }
    }

    /// Map a key to a command. Only the exact continue key and a closed key
    /// source resume; everything else steps.
    pub fn classify(&self, key: Key) -> DebugCommand {
        match key {
            Key::Char(ch) if ch == self.options.continue_key => DebugCommand::Continue,
            Key::Closed => DebugCommand::Continue,
            _ => DebugCommand::Step,
        }
    }

    /// How many times this debugger has paused the machine.
    pub fn pauses(&self) -> usize {
        self.pauses
    }

    pub fn into_screen(self) -> S {
        self.screen
    }
}

impl<K: KeySource, S: Write> PauseHandler for Debugger<K, S> {
    fn pause(&mut self, view: &Snapshot<'_>) -> Result<DebugCommand, VmError> {
        self.pauses += 1;
        let frame = view::render(view, &self.options);
        self.screen
            .write_all(frame.as_bytes())
            .and_then(|_| self.screen.flush())
            .map_err(|source| VmError::Debugger { source })?;

        let key = match self.keys.next_key() {
            Ok(key) => key,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => return Err(VmError::Canceled),
            Err(source) => return Err(VmError::Debugger { source }),
        };

        if key == Key::Closed {
            log::debug!("debugger key source closed; continuing");
        }
        Ok(self.classify(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::output::OutputChannel;
    use crate::program::Program;
    use crate::tape::Tape;
    use std::io::Cursor;

    fn debugger(keys: &str) -> Debugger<ByteKeys<Cursor<Vec<u8>>>, Vec<u8>> {
        Debugger::new(
            ByteKeys::new(Cursor::new(keys.as_bytes().to_vec())),
            Vec::new(),
            ViewOptions::default(),
        )
    }

    fn run(code: &str, keys: &str) -> (Engine, Debugger<ByteKeys<Cursor<Vec<u8>>>, Vec<u8>>, Vec<u8>) {
        let program = Program::load(code.as_bytes(), 1000).unwrap();
        let mut engine = Engine::new(program, Tape::new(16), false);
        let mut dbg = debugger(keys);
        let mut out = OutputChannel::new(Vec::new(), 64);
        engine
            .run(&mut io::empty(), &mut out, Some(&mut dbg), None)
            .unwrap();
        (engine, dbg, out.into_inner())
    }

    #[test]
    fn classify_only_continue_key_resumes() {
        let dbg = debugger("");
        assert_eq!(dbg.classify(Key::Char('c')), DebugCommand::Continue);
        assert_eq!(dbg.classify(Key::Char('C')), DebugCommand::Step);
        assert_eq!(dbg.classify(Key::Char('s')), DebugCommand::Step);
        assert_eq!(dbg.classify(Key::Char('\n')), DebugCommand::Step);
        assert_eq!(dbg.classify(Key::Other), DebugCommand::Step);
        assert_eq!(dbg.classify(Key::Closed), DebugCommand::Continue);
    }

    #[test]
    fn byte_keys_skip_whitespace_and_report_closed() {
        let mut keys = ByteKeys::new(Cursor::new(b"s\n \tc".to_vec()));
        assert_eq!(keys.next_key().unwrap(), Key::Char('s'));
        assert_eq!(keys.next_key().unwrap(), Key::Char('c'));
        assert_eq!(keys.next_key().unwrap(), Key::Closed);
    }

    #[test]
    fn stepping_through_breakpoint_program() {
        let (engine, dbg, out) = run("+#+.", "ss");
        assert_eq!(dbg.pauses(), 2);
        assert_eq!(out, vec![2]);
        assert_eq!(engine.state(), DebugState::Paused);
    }

    #[test]
    fn continue_key_stops_pausing() {
        let (engine, dbg, out) = run("+#+.+.", "c");
        assert_eq!(dbg.pauses(), 1);
        assert_eq!(out, vec![2, 3]);
        assert_eq!(engine.state(), DebugState::Running);
    }

    #[test]
    fn each_pause_renders_a_frame() {
        let (_, dbg, _) = run("#+.", "s");
        let screen = String::from_utf8(dbg.into_screen()).unwrap();
        assert_eq!(screen.matches("-- paused").count(), 2);
        assert!(screen.contains("ip 1/3"));
        assert!(screen.contains("ip 2/3"));
    }

    #[test]
    fn interrupted_key_read_cancels() {
        struct Interrupt;
        impl KeySource for Interrupt {
            fn next_key(&mut self) -> io::Result<Key> {
                Err(io::Error::new(io::ErrorKind::Interrupted, "ctrl+c"))
            }
        }
        let program = Program::load(b"#+", 10).unwrap();
        let mut engine = Engine::new(program, Tape::new(4), false);
        let mut dbg = Debugger::new(Interrupt, Vec::new(), ViewOptions::default());
        let mut out = OutputChannel::detached(4);
        let result = engine.run(&mut io::empty(), &mut out, Some(&mut dbg), None);
        assert!(matches!(result, Err(VmError::Canceled)));
        assert_eq!(engine.tape().read_cell(), 0);
    }
}
