//! Line assembly for the controller's serial output
//!
//! The controller emits CR-terminated ASCII lines, sometimes followed by
//! LF depending on its echo settings. Bytes arrive in arbitrary chunks;
//! [`LineAssembler`] buffers them until a terminator completes a line.

use heapless::String;

/// Longest line kept; identity banners are the longest replies
pub const MAX_LINE_LEN: usize = 64;

/// A completed line without its terminator
pub type Line = String<MAX_LINE_LEN>;

/// Errors that can occur while assembling lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Line exceeded [`MAX_LINE_LEN`]; the remainder up to the next
    /// terminator is dropped
    Overflow,
    /// Byte outside printable ASCII
    InvalidByte(u8),
}

/// Incremental line assembler
#[derive(Debug, Clone, Default)]
pub struct LineAssembler {
    buffer: Line,
    /// Dropping bytes until the next terminator
    discarding: bool,
}

impl LineAssembler {
    /// Create an empty assembler
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop any partial line
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.discarding = false;
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(line))` when a terminator completes a non-empty
    /// line, `Ok(None)` when more bytes are needed, or `Err` when the
    /// current line is abandoned.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Line>, LineError> {
        match byte {
            b'\r' | b'\n' => {
                let was_discarding = self.discarding;
                self.discarding = false;
                if was_discarding || self.buffer.is_empty() {
                    self.buffer.clear();
                    return Ok(None);
                }
                let line = self.buffer.clone();
                self.buffer.clear();
                Ok(Some(line))
            }
            _ if self.discarding => Ok(None),
            0x20..=0x7E => {
                if self.buffer.push(byte as char).is_err() {
                    self.buffer.clear();
                    self.discarding = true;
                    return Err(LineError::Overflow);
                }
                Ok(None)
            }
            _ => {
                self.buffer.clear();
                self.discarding = true;
                Err(LineError::InvalidByte(byte))
            }
        }
    }

    /// Feed bytes until the first complete line
    ///
    /// Returns the line and the number of bytes consumed. Bytes after the
    /// line are left for the next call.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> (Result<Option<Line>, LineError>, usize) {
        for (index, &byte) in bytes.iter().enumerate() {
            match self.feed(byte) {
                Ok(None) => {}
                other => return (other, index + 1),
            }
        }
        (Ok(None), bytes.len())
    }
}
