// src/io/serial/framer.rs
//
// Terminator-delimited line framing for the serial stream.
// Bytes are accumulated until a carriage return arrives; partial trailing data
// is retained across feed() calls.

/// Line terminator used by the elevator controller (carriage return, no line feed)
pub const LINE_TERMINATOR: u8 = 0x0D;

/// Default cap on a single line (or unterminated tail) before it is discarded
pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024;

/// Stateful line framer for streaming data.
pub struct LineFramer {
    buffer: Vec<u8>,
    max_line_length: usize,
    /// Set when the tail overflowed; everything up to the next terminator is dropped
    discarding: bool,
    discarded_bytes: u64,
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineFramer {
    pub fn new() -> Self {
        Self::with_max_line_length(DEFAULT_MAX_LINE_LENGTH)
    }

    /// Create a framer that discards lines longer than `max_line_length` bytes.
    pub fn with_max_line_length(max_line_length: usize) -> Self {
        LineFramer {
            buffer: Vec::new(),
            max_line_length: max_line_length.max(1),
            discarding: false,
            discarded_bytes: 0,
        }
    }

    /// Feed raw bytes into the framer.
    /// The returned iterator yields each complete line (terminator excluded) lazily.
    /// Lines not pulled from the iterator stay buffered for the next call.
    pub fn feed(&mut self, data: &[u8]) -> Lines<'_> {
        self.buffer.extend_from_slice(data);
        Lines { framer: self }
    }

    /// Bytes received since the last terminator.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    /// Total bytes dropped by the line-length cap.
    pub fn discarded_bytes(&self) -> u64 {
        self.discarded_bytes
    }

    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }

    /// Drop any buffered partial line.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.discarding = false;
    }

    fn next_line(&mut self) -> Option<Vec<u8>> {
        loop {
            let Some(pos) = self.buffer.iter().position(|&b| b == LINE_TERMINATOR) else {
                self.check_tail();
                return None;
            };

            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();

            if self.discarding {
                self.discarding = false;
                self.discarded_bytes += line.len() as u64;
                continue;
            }

            if line.len() > self.max_line_length {
                self.discarded_bytes += line.len() as u64;
                tlog!(
                    "[framer] Discarded {}-byte line (max {})",
                    line.len(),
                    self.max_line_length
                );
                continue;
            }

            return Some(line);
        }
    }

    fn check_tail(&mut self) {
        if self.discarding {
            self.discarded_bytes += self.buffer.len() as u64;
            self.buffer.clear();
        } else if self.buffer.len() > self.max_line_length {
            tlog!(
                "[framer] No terminator within {} bytes, dropping until next line",
                self.max_line_length
            );
            self.discarded_bytes += self.buffer.len() as u64;
            self.buffer.clear();
            self.discarding = true;
        }
    }
}

/// Lines framed by one `LineFramer::feed` call.
pub struct Lines<'a> {
    framer: &'a mut LineFramer,
}

impl Iterator for Lines<'_> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        self.framer.next_line()
    }
}
