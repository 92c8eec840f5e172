//! Character I/O collaborators for the OUT and IN opcodes.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Sink for characters written by OUT.
pub trait Output {
    /// Emit one character.
    fn emit(&mut self, ch: u8) -> io::Result<()>;

    /// Make everything emitted so far visible. Called before every IN.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<W: Write> Output for W {
    fn emit(&mut self, ch: u8) -> io::Result<()> {
        self.write_all(&[ch])
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(self)
    }
}

/// Source of characters for IN.
pub trait Input {
    /// Next character, blocking until one is available.
    ///
    /// `Ok(None)` means the source is exhausted.
    fn next_character(&mut self) -> io::Result<Option<u8>>;
}

/// Reads whole lines from a buffered reader and replays them one character
/// at a time.
///
/// Programs read a full line once they start reading, so buffering a line
/// keeps interactive sessions usable.
#[derive(Debug)]
pub struct LineInput<R> {
    reader: R,
    pending: VecDeque<u8>,
}

impl<R: BufRead> LineInput<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: VecDeque::new(),
        }
    }

    /// Characters read from the source but not yet consumed.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl<R: BufRead> Input for LineInput<R> {
    fn next_character(&mut self) -> io::Result<Option<u8>> {
        if self.pending.is_empty() {
            let mut line = Vec::new();
            if self.reader.read_until(b'\n', &mut line)? == 0 {
                return Ok(None);
            }
            self.pending.extend(line);
        }
        Ok(self.pending.pop_front())
    }
}
