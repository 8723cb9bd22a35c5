use std::fmt;

use crate::error::LoadError;

/// Default ceiling on the number of instructions a loaded program may hold.
pub const DEFAULT_MAX_PROGRAM_LEN: usize = 10_000;

/// One symbol of the instruction alphabet `> < + - . , [ ] #`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Right,
    Left,
    Inc,
    Dec,
    Output,
    Input,
    LoopStart,
    LoopEnd,
    Breakpoint,
}

impl Instruction {
    /// Decode a source byte; anything outside the alphabet is `None`.
    pub fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            b'>' => Instruction::Right,
            b'<' => Instruction::Left,
            b'+' => Instruction::Inc,
            b'-' => Instruction::Dec,
            b'.' => Instruction::Output,
            b',' => Instruction::Input,
            b'[' => Instruction::LoopStart,
            b']' => Instruction::LoopEnd,
            b'#' => Instruction::Breakpoint,
            _ => return None,
        })
    }

    pub fn symbol(self) -> char {
        match self {
            Instruction::Right => '>',
            Instruction::Left => '<',
            Instruction::Inc => '+',
            Instruction::Dec => '-',
            Instruction::Output => '.',
            Instruction::Input => ',',
            Instruction::LoopStart => '[',
            Instruction::LoopEnd => ']',
            Instruction::Breakpoint => '#',
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Keep only instruction bytes, in order. Comments and whitespace vanish.
pub fn filter_source(source: &[u8]) -> Vec<Instruction> {
    source.iter().copied().filter_map(Instruction::from_byte).collect()
}

/// A loaded program: the filtered instruction stream and the instruction pointer.
#[derive(Debug, Clone)]
pub struct Program {
    instructions: Vec<Instruction>,
    ip: usize,
}

impl Program {
    /// Filter `source` and build a program starting at instruction 0.
    ///
    /// Brackets are not checked here; an unbalanced loop is only reported
    /// when execution reaches it.
    pub fn load(source: &[u8], max_len: usize) -> Result<Self, LoadError> {
        let instructions = filter_source(source);
        if instructions.len() > max_len {
            return Err(LoadError::TooLong {
                len: instructions.len(),
                max: max_len,
            });
        }
        log::debug!(
            "loaded {} instructions from {} source bytes",
            instructions.len(),
            source.len()
        );
        Ok(Self::from_instructions(instructions))
    }

    pub fn from_instructions(instructions: Vec<Instruction>) -> Self {
        Self { instructions, ip: 0 }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn ip(&self) -> usize {
        self.ip
    }

    pub(crate) fn set_ip(&mut self, ip: usize) {
        self.ip = ip;
    }

    /// The instruction at the ip, or `None` once the program is exhausted.
    pub fn current(&self) -> Option<Instruction> {
        self.instructions.get(self.ip).copied()
    }

    pub fn is_finished(&self) -> bool {
        self.ip >= self.instructions.len()
    }

    /// The filtered program as text, one symbol per instruction.
    pub fn to_source(&self) -> String {
        self.instructions.iter().map(|i| i.symbol()).collect()
    }
}
