use std::fmt;

/// Errors raised while turning raw source into a [`Program`](crate::Program).
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The filtered instruction stream is longer than the configured maximum.
    #[error("Program too long: {len} instructions (max {max})")]
    TooLong { len: usize, max: usize },
}

/// Errors that abort a run of the machine.
#[derive(Debug, thiserror::Error)]
pub enum VmError {
    /// A bracket search ran off either end of the instruction stream.
    #[error("Unmatched bracket {kind} at instruction {ip}")]
    UnmatchedBracket { ip: usize, kind: BracketKind },

    /// Program I/O failed: reading input for `,`, or writing or flushing
    /// output for `.`.
    #[error("I/O error at instruction {ip}: {source}")]
    Io {
        ip: usize,
        #[source]
        source: std::io::Error,
    },

    /// The debugger could not render its view or read a key.
    #[error("Debugger I/O error: {source}")]
    Debugger {
        #[source]
        source: std::io::Error,
    },

    /// Execution aborted due to step limit.
    #[error("Execution aborted: step limit exceeded ({limit})")]
    StepLimitExceeded { limit: usize },

    /// Execution aborted due to cooperative cancellation (Ctrl+C, timeout).
    #[error("Execution aborted: cancelled")]
    Canceled,
}

/// Which side of the loop was unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketKind {
    Open,
    Close,
}

impl fmt::Display for BracketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketKind::Open => write!(f, "'['"),
            BracketKind::Close => write!(f, "']'"),
        }
    }
}

/// Invalid settings coming from the config file, environment or flags.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("{key} must be greater than zero")]
    ZeroCapacity { key: &'static str },
}
