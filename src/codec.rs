//! Inbound line framing
//!
//! Splits the byte stream on `\n` without requiring UTF-8. Bytes that do not
//! decode become U+FFFD, which validation then rejects in-band. A line longer
//! than the configured maximum is skipped up to its newline and reported as
//! `InboundLine::Oversized`, so the stream keeps going.

use std::cmp;
use std::io;

use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;

/// One framed line from a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundLine {
    /// Line content without the trailing `\n` (and `\r`), lossily decoded
    Text(String),
    /// Line exceeded the maximum length and was dropped
    Oversized,
}

/// Newline codec that tolerates invalid UTF-8 and overlong lines
#[derive(Debug)]
pub struct LineCodec {
    max_length: usize,
    /// Bytes already searched for a newline
    next_index: usize,
    /// Skipping the rest of an oversized line
    discarding: bool,
}

impl LineCodec {
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            next_index: 0,
            discarding: false,
        }
    }
}

fn to_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(&b"\r"[..]).unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

impl Decoder for LineCodec {
    type Item = InboundLine;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            // Never look further than one byte past the limit
            let read_to = cmp::min(self.max_length.saturating_add(1), src.len());
            let newline = src[self.next_index..read_to]
                .iter()
                .position(|b| *b == b'\n');

            match (self.discarding, newline) {
                (true, Some(offset)) => {
                    src.advance(self.next_index + offset + 1);
                    self.next_index = 0;
                    self.discarding = false;
                    return Ok(Some(InboundLine::Oversized));
                }
                (true, None) => {
                    src.advance(read_to);
                    self.next_index = 0;
                    if src.is_empty() {
                        return Ok(None);
                    }
                }
                (false, Some(offset)) => {
                    let end = self.next_index + offset;
                    self.next_index = 0;
                    let line = src.split_to(end + 1);
                    return Ok(Some(InboundLine::Text(to_text(&line[..end]))));
                }
                (false, None) if src.len() > self.max_length => {
                    self.next_index = 0;
                    self.discarding = true;
                }
                (false, None) => {
                    self.next_index = read_to;
                    return Ok(None);
                }
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }

        self.next_index = 0;
        if self.discarding {
            self.discarding = false;
            src.clear();
            Ok(Some(InboundLine::Oversized))
        } else if src.is_empty() {
            Ok(None)
        } else {
            let line = src.split();
            Ok(Some(InboundLine::Text(to_text(&line))))
        }
    }
}
