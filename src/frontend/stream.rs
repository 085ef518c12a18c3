//! Character stream over a byte reader
//!
//! Decodes UTF-8 one code point at a time, offers a single character of
//! lookahead and tracks the 1-indexed position of the next character.

use crate::utils::Position;
use std::io::{self, BufRead};

/// Forward-only character stream with one character of lookahead
pub struct CharStream<R> {
    reader: R,
    /// `Some(None)` once a peek has observed end of stream
    peeked: Option<Option<char>>,
    position: Position,
}

impl<R: BufRead> CharStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            peeked: None,
            position: Position::start(),
        }
    }

    /// Position of the next character to be read
    pub fn position(&self) -> Position {
        self.position
    }

    /// Get the next character without consuming it
    pub fn peek(&mut self) -> io::Result<Option<char>> {
        if let Some(c) = self.peeked {
            return Ok(c);
        }
        let c = self.decode()?;
        self.peeked = Some(c);
        Ok(c)
    }

    /// Consume the next character
    pub fn read(&mut self) -> io::Result<Option<char>> {
        let c = match self.peeked.take() {
            Some(c) => c,
            None => self.decode()?,
        };
        match c {
            Some('\n') => {
                self.position.line += 1;
                self.position.column = 1;
            }
            Some(_) => self.position.column += 1,
            None => {}
        }
        Ok(c)
    }

    fn decode(&mut self) -> io::Result<Option<char>> {
        let Some(lead) = self.next_byte()? else {
            return Ok(None);
        };
        let width = utf8_width(lead)
            .ok_or_else(|| invalid_utf8(format!("invalid UTF-8 lead byte 0x{lead:02x}")))?;

        let mut buf = [lead, 0, 0, 0];
        for slot in buf.iter_mut().take(width).skip(1) {
            *slot = self
                .next_byte()?
                .ok_or_else(|| invalid_utf8("truncated UTF-8 sequence".to_string()))?;
        }

        let decoded = std::str::from_utf8(&buf[..width])
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(decoded.chars().next())
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        loop {
            let byte = match self.reader.fill_buf() {
                Ok([]) => return Ok(None),
                Ok(buf) => buf[0],
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            self.reader.consume(1);
            return Ok(Some(byte));
        }
    }
}

/// Encoded length of a UTF-8 sequence given its first byte
fn utf8_width(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7f => Some(1),
        0xc2..=0xdf => Some(2),
        0xe0..=0xef => Some(3),
        0xf0..=0xf4 => Some(4),
        _ => None,
    }
}

fn invalid_utf8(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}
