use std::io::{self, Write};

/// Default number of output bytes kept for the debugger's history view.
pub const DEFAULT_HISTORY_SIZE: usize = 1_000;

/// Destination for `.` bytes.
///
/// Every byte goes straight to the wrapped writer. A bounded copy is kept
/// for display; once the history is full, new bytes are still written but
/// no longer recorded (drop-newest), and only the drop count grows.
pub struct OutputChannel<W: Write> {
    sink: W,
    history: Vec<u8>,
    capacity: usize,
    dropped: usize,
}

impl<W: Write> OutputChannel<W> {
    pub fn new(sink: W, capacity: usize) -> Self {
        Self {
            sink,
            history: Vec::with_capacity(capacity.min(DEFAULT_HISTORY_SIZE)),
            capacity,
            dropped: 0,
        }
    }

    /// Write one byte to the sink and record it if there is room.
    pub fn emit(&mut self, byte: u8) -> io::Result<()> {
        self.sink.write_all(&[byte])?;
        if self.history.len() < self.capacity {
            self.history.push(byte);
        } else {
            self.dropped += 1;
        }
        Ok(())
    }

    pub fn history(&self) -> &[u8] {
        &self.history
    }

    /// Bytes written to the sink that did not fit in the history.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl OutputChannel<io::Sink> {
    /// A channel that only keeps history, for tests and dry runs.
    pub fn detached(capacity: usize) -> Self {
        Self::new(io::sink(), capacity)
    }
}
