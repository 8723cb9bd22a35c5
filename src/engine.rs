//! The fetch-dispatch-execute loop.
//!
//! An [`Engine`] owns the [`Tape`], the [`Program`] and the paused flag. The
//! caller supplies the input stream, the [`OutputChannel`] and, optionally, a
//! [`PauseHandler`] that is consulted before every instruction while paused.
//!
//! Loops are resolved by scanning for the partner bracket each time a jump is
//! taken. There is no jump table, so an unbalanced bracket is only noticed
//! when execution actually needs its partner.

use std::io::{self, Read, Write};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::config::VmConfig;
use crate::debugger::{DebugCommand, DebugState, PauseHandler};
use crate::error::{BracketKind, VmError};
use crate::output::OutputChannel;
use crate::program::{Instruction, Program};
use crate::tape::Tape;

/// Controls for cooperative cancellation and step limiting.
///
/// Checked once per dispatch step. The flag may be flipped from another
/// thread (a timer, a Ctrl+C handler); the engine only ever reads it.
#[derive(Clone, Default)]
pub struct StepControl {
    pub max_steps: Option<usize>,
    pub cancel_flag: Arc<AtomicBool>,
}

impl StepControl {
    pub fn new(max_steps: Option<usize>, cancel_flag: Arc<AtomicBool>) -> Self {
        Self { max_steps, cancel_flag }
    }

    fn check(&self, steps: usize) -> Result<(), VmError> {
        if self.cancel_flag.load(Ordering::Relaxed) {
            return Err(VmError::Canceled);
        }
        if let Some(max) = self.max_steps {
            if steps >= max {
                return Err(VmError::StepLimitExceeded { limit: max });
            }
        }
        Ok(())
    }
}

/// Direction of a bracket search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seek {
    /// From a `[` towards the end, looking for its `]`.
    Forward,
    /// From a `]` towards the start, looking for its `[`.
    Backward,
}

/// Find the partner of the bracket at `from` by counting nesting depth.
///
/// Returns the index of the matching bracket, or `UnmatchedBracket` naming
/// `from` when the scan runs off the end (forward) or the start (backward).
pub fn match_bracket(instructions: &[Instruction], from: usize, seek: Seek) -> Result<usize, VmError> {
    let mut depth = 1usize;
    let mut i = from;
    match seek {
        Seek::Forward => loop {
            i += 1;
            match instructions.get(i) {
                None => {
                    return Err(VmError::UnmatchedBracket { ip: from, kind: BracketKind::Open });
                }
                Some(Instruction::LoopStart) => depth += 1,
                Some(Instruction::LoopEnd) => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(i);
                    }
                }
                Some(_) => {}
            }
        },
        Seek::Backward => loop {
            if i == 0 {
                return Err(VmError::UnmatchedBracket { ip: from, kind: BracketKind::Close });
            }
            i -= 1;
            match instructions[i] {
                Instruction::LoopEnd => depth += 1,
                Instruction::LoopStart => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(i);
                    }
                }
                _ => {}
            }
        },
    }
}

/// Read-only view of the machine handed to a [`PauseHandler`].
pub struct Snapshot<'a> {
    pub program: &'a Program,
    pub tape: &'a Tape,
    pub history: &'a [u8],
    pub dropped: usize,
    pub steps: usize,
}

/// The tape machine.
pub struct Engine {
    program: Program,
    tape: Tape,
    paused: bool,
    steps: usize,
}

impl Engine {
    pub fn new(program: Program, tape: Tape, start_paused: bool) -> Self {
        Self {
            program,
            tape,
            paused: start_paused,
            steps: 0,
        }
    }

    /// Build an engine with the tape size and initial state from `config`.
    pub fn with_config(program: Program, config: &VmConfig) -> Self {
        Self::new(program, Tape::new(config.tape_size), config.start_paused)
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn state(&self) -> DebugState {
        DebugState::from_paused(self.paused)
    }

    /// Instructions dispatched so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn snapshot<'a, W: Write>(&'a self, output: &'a OutputChannel<W>) -> Snapshot<'a> {
        Snapshot {
            program: &self.program,
            tape: &self.tape,
            history: output.history(),
            dropped: output.dropped(),
            steps: self.steps,
        }
    }

    /// Run until the program is exhausted.
    ///
    /// While paused, `debugger` is asked for a command before each
    /// instruction. Without a debugger the paused flag is still tracked but
    /// never blocks.
    pub fn run<R: Read, W: Write>(
        &mut self,
        input: &mut R,
        output: &mut OutputChannel<W>,
        mut debugger: Option<&mut dyn PauseHandler>,
        control: Option<&StepControl>,
    ) -> Result<(), VmError> {
        log::debug!(
            "run start: {} instructions, {} cells, paused={}",
            self.program.len(),
            self.tape.capacity(),
            self.paused
        );

        while !self.program.is_finished() {
            if let Some(ctrl) = control {
                ctrl.check(self.steps)?;
            }

            if self.paused {
                if let Some(dbg) = debugger.as_mut() {
                    output.flush().map_err(|source| VmError::Io { ip: self.program.ip(), source })?;
                    let command = dbg.pause(&self.snapshot(output))?;
                    if command == DebugCommand::Continue {
                        log::debug!("continue from instruction {}", self.program.ip());
                        self.paused = false;
                    }
                }
            }

            self.step(input, output)?;
        }

        output.flush().map_err(|source| VmError::Io { ip: self.program.ip(), source })?;
        log::debug!("run finished after {} steps", self.steps);
        Ok(())
    }

    /// Dispatch the instruction at the ip and move past it.
    ///
    /// Does nothing once the program is exhausted.
    pub fn step<R: Read, W: Write>(
        &mut self,
        input: &mut R,
        output: &mut OutputChannel<W>,
    ) -> Result<(), VmError> {
        let ip = self.program.ip();
        let Some(instr) = self.program.current() else {
            return Ok(());
        };

        match instr {
            Instruction::Right => self.tape.advance(),
            Instruction::Left => self.tape.retreat(),
            Instruction::Inc => self.tape.increment_cell(),
            Instruction::Dec => self.tape.decrement_cell(),
            Instruction::Output => {
                output
                    .emit(self.tape.read_cell())
                    .map_err(|source| VmError::Io { ip, source })?;
            }
            Instruction::Input => {
                // EOF stores 0 and carries on.
                let byte = read_byte(input).map_err(|source| VmError::Io { ip, source })?;
                self.tape.write_cell(byte.unwrap_or(0));
            }
            Instruction::LoopStart => {
                if self.tape.read_cell() == 0 {
                    let target = match_bracket(self.program.instructions(), ip, Seek::Forward)?;
                    self.program.set_ip(target);
                }
            }
            Instruction::LoopEnd => {
                if self.tape.read_cell() != 0 {
                    let target = match_bracket(self.program.instructions(), ip, Seek::Backward)?;
                    self.program.set_ip(target);
                }
            }
            Instruction::Breakpoint => {
                if !self.paused {
                    log::debug!("breakpoint hit at instruction {ip}");
                }
                self.paused = true;
            }
        }

        log::trace!(
            "step {:<6} ip={:<5} instr='{}' ptr={:<5} cell={}",
            self.steps,
            ip,
            instr,
            self.tape.pointer(),
            self.tape.read_cell()
        );

        self.program.set_ip(self.program.ip() + 1);
        self.steps += 1;
        Ok(())
    }
}

fn read_byte<R: Read>(input: &mut R) -> io::Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match input.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
