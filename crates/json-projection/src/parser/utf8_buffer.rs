//! Incremental byte to UTF-8 decoding.
//!
//! Input arrives in fixed-size reads, and a read boundary can fall in the
//! middle of a multi-byte scalar. [`Utf8Decoder`] hands back only complete
//! text and keeps the trailing partial sequence (at most three bytes) until
//! the next call supplies the rest of it.
//!
//! The common case, a chunk that is valid UTF-8 on its own while nothing is
//! retained, is returned as a borrowed slice of the input without copying.
use std::borrow::Cow;

use bstr::BStr;
use thiserror::Error;

/// A malformed UTF-8 byte sequence.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A continuation byte (`0x80..=0xBF`) appeared with no sequence open.
    #[error("expected start of multi-byte or single byte char, found 0x{byte:02X}")]
    UnexpectedContinuation {
        /// The offending byte.
        byte: u8,
        /// Index of the byte within the chunk that was fed.
        index: usize,
    },
    /// A multi-byte sequence was interrupted by a byte that does not continue it.
    #[error("expected continuation byte after {}, found 0x{byte:02X}", BStr::new(.pending))]
    ExpectedContinuation {
        /// The bytes of the open sequence.
        pending: Vec<u8>,
        /// The offending byte.
        byte: u8,
        /// Index of the byte within the chunk that was fed.
        index: usize,
    },
    /// The assembled bytes are not well-formed UTF-8 (overlong forms,
    /// encoded surrogates, lead bytes above `0xF4`).
    #[error("invalid UTF-8 byte sequence {}", BStr::new(.bytes))]
    InvalidSequence {
        /// The rejected bytes, at most four, starting at the first invalid one.
        bytes: Vec<u8>,
        /// Index of the first rejected byte within the chunk that was fed.
        /// A sequence begun in an earlier chunk is reported at `0`.
        index: usize,
    },
    /// The input ended inside a multi-byte sequence.
    #[error("input ended inside multi-byte sequence {}", BStr::new(.pending))]
    Truncated {
        /// The bytes of the unfinished sequence.
        pending: Vec<u8>,
    },
}

impl DecodeError {
    /// Index within the fed chunk at which the problem was found, when known.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::UnexpectedContinuation { index, .. }
            | Self::ExpectedContinuation { index, .. }
            | Self::InvalidSequence { index, .. } => Some(*index),
            Self::Truncated { .. } => None,
        }
    }
}

/// Stateful decoder that turns binary chunks into complete UTF-8 text.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    /// Bytes of the sequence currently being assembled.
    pending: Vec<u8>,
    /// Total length of the sequence in `pending`, from its lead byte.
    need: usize,
}

impl Utf8Decoder {
    /// Creates a decoder with nothing retained.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: Vec::with_capacity(4),
            need: 0,
        }
    }

    /// Feeds a chunk of bytes and returns all text that is now complete.
    ///
    /// An incomplete trailing sequence is kept for the next call.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the bytes cannot be UTF-8. The decoder
    /// should not be used again afterwards.
    pub fn feed<'a>(&mut self, bytes: &'a [u8]) -> Result<Cow<'a, str>, DecodeError> {
        if self.pending.is_empty() {
            if let Ok(text) = std::str::from_utf8(bytes) {
                return Ok(Cow::Borrowed(text));
            }
        }

        let carried = self.pending.len();
        let mut out = Vec::with_capacity(bytes.len() + carried);
        for (index, &byte) in bytes.iter().enumerate() {
            if self.pending.is_empty() {
                match byte {
                    0x00..=0x7F => out.push(byte),
                    0x80..=0xBF => {
                        return Err(DecodeError::UnexpectedContinuation { byte, index });
                    }
                    _ => {
                        self.need = sequence_len(byte);
                        self.pending.push(byte);
                    }
                }
            } else if is_continuation(byte) {
                self.pending.push(byte);
                if self.pending.len() == self.need {
                    out.append(&mut self.pending);
                    self.need = 0;
                }
            } else {
                return Err(DecodeError::ExpectedContinuation {
                    pending: core::mem::take(&mut self.pending),
                    byte,
                    index,
                });
            }
        }

        String::from_utf8(out).map(Cow::Owned).map_err(|err| {
            let utf8 = err.utf8_error();
            let valid = utf8.valid_up_to();
            let mut bytes = err.into_bytes().split_off(valid);
            bytes.truncate(utf8.error_len().unwrap_or(4).min(4));
            DecodeError::InvalidSequence {
                bytes,
                index: valid.saturating_sub(carried),
            }
        })
    }

    /// Returns `true` when no partial multi-byte sequence is retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of bytes of the partial sequence retained from earlier chunks.
    pub(crate) fn retained(&self) -> usize {
        self.pending.len()
    }

    /// Signals end of input; fails if a partial sequence is still retained.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Truncated`] with the retained bytes.
    pub fn finish(&mut self) -> Result<(), DecodeError> {
        if self.pending.is_empty() {
            Ok(())
        } else {
            Err(DecodeError::Truncated {
                pending: core::mem::take(&mut self.pending),
            })
        }
    }
}

#[inline]
fn is_continuation(byte: u8) -> bool {
    (0x80..=0xBF).contains(&byte)
}

/// Length of the sequence introduced by a lead byte `>= 0xC0`.
#[inline]
fn sequence_len(lead: u8) -> usize {
    match lead {
        0xF0..=0xFF => 4,
        0xE0..=0xEF => 3,
        _ => 2,
    }
}
