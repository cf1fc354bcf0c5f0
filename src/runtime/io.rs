//! Byte-level I/O for running programs.
//!
//! Programs talk to one input stream and one output stream. [`IOContext`]
//! wraps either the process's stdin/stdout or in-memory buffers, so the same
//! interpreter drives both the CLI and the test suite.
//!
//! Output is buffered. It is flushed before every read, so prompts appear
//! before the program blocks on input, and once more when a run finishes.

use std::io::{self, BufRead, BufWriter, Cursor, Stdout, Write};

use crate::core::Num;

enum Sink {
    Stdout(BufWriter<Stdout>),
    Buffer(Vec<u8>),
}

/// Counters for a context's traffic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IOStats {
    /// Bytes consumed from the input.
    pub bytes_read: usize,
    /// Bytes written to the output.
    pub bytes_written: usize,
    /// Input instructions served.
    pub reads: usize,
    /// Output instructions served.
    pub writes: usize,
}

/// Input and output streams of one program run.
pub struct IOContext {
    input: Box<dyn BufRead>,
    output: Sink,
    stats: IOStats,
}

impl IOContext {
    /// Read from stdin, write to stdout.
    pub fn stdio() -> Self {
        Self {
            input: Box::new(io::stdin().lock()),
            output: Sink::Stdout(BufWriter::new(io::stdout())),
            stats: IOStats::default(),
        }
    }

    /// Read from a fixed byte buffer, collect output in memory.
    pub fn buffered(input: impl Into<Vec<u8>>) -> Self {
        Self::with_reader(Cursor::new(input.into()))
    }

    /// Read from any buffered reader, collect output in memory.
    pub fn with_reader(reader: impl BufRead + 'static) -> Self {
        Self {
            input: Box::new(reader),
            output: Sink::Buffer(Vec::new()),
            stats: IOStats::default(),
        }
    }

    pub fn stats(&self) -> IOStats {
        self.stats
    }

    /// Output collected so far; always empty when writing to stdout.
    pub fn output(&self) -> &[u8] {
        match &self.output {
            Sink::Buffer(buffer) => buffer,
            Sink::Stdout(_) => &[],
        }
    }

    /// Take the collected output, leaving the buffer empty.
    pub fn take_output(&mut self) -> Vec<u8> {
        match &mut self.output {
            Sink::Buffer(buffer) => std::mem::take(buffer),
            Sink::Stdout(_) => Vec::new(),
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        match &mut self.output {
            Sink::Stdout(out) => out.flush(),
            Sink::Buffer(_) => Ok(()),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Output
    // ═══════════════════════════════════════════════════════════════════

    pub fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        match &mut self.output {
            Sink::Stdout(out) => out.write_all(bytes)?,
            Sink::Buffer(buffer) => buffer.extend_from_slice(bytes),
        }
        self.stats.writes += 1;
        self.stats.bytes_written += bytes.len();
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Input
    // ═══════════════════════════════════════════════════════════════════

    fn peek_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.input.fill_buf()?.first().copied())
    }

    fn consume(&mut self) {
        self.input.consume(1);
        self.stats.bytes_read += 1;
    }

    /// One raw byte, `None` at end of input.
    pub fn read_byte(&mut self) -> io::Result<Option<u8>> {
        self.flush()?;
        self.stats.reads += 1;
        let byte = self.peek_byte()?;
        if byte.is_some() {
            self.consume();
        }
        Ok(byte)
    }

    /// A decimal integer after optional whitespace and sign.
    ///
    /// The first byte that is not part of the number stays unread. Input with
    /// no digits yields 0; values beyond the register width saturate.
    pub fn read_number(&mut self) -> io::Result<Num> {
        self.flush()?;
        self.stats.reads += 1;

        while let Some(byte) = self.peek_byte()? {
            if !byte.is_ascii_whitespace() {
                break;
            }
            self.consume();
        }

        let negative = match self.peek_byte()? {
            Some(sign @ (b'-' | b'+')) => {
                self.consume();
                sign == b'-'
            }
            _ => false,
        };

        let mut value: Num = 0;
        while let Some(byte) = self.peek_byte()? {
            if !byte.is_ascii_digit() {
                break;
            }
            self.consume();
            let digit = Num::from(byte - b'0');
            value = if negative {
                value.saturating_mul(10).saturating_sub(digit)
            } else {
                value.saturating_mul(10).saturating_add(digit)
            };
        }
        Ok(value)
    }

    /// Bytes up to the next newline, which is consumed but not returned.
    pub fn read_line(&mut self) -> io::Result<Vec<u8>> {
        self.flush()?;
        self.stats.reads += 1;

        let mut line = Vec::new();
        let read = self.input.read_until(b'\n', &mut line)?;
        self.stats.bytes_read += read;
        if line.last() == Some(&b'\n') {
            line.pop();
        }
        Ok(line)
    }
}

impl Default for IOContext {
    fn default() -> Self {
        Self::buffered(Vec::new())
    }
}
