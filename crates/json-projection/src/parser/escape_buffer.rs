//! Buffering of the four hexadecimal digits of a `\uXXXX` escape.
//!
//! The digits describe a UTF-16 code unit rather than a scalar value, so the
//! buffer yields a `u16` and leaves surrogate pairing to the caller.

use super::error::SyntaxError;

#[derive(Debug, Default)]
/// Accumulates up to four ASCII hex digits (`0-9`, `A-F`, `a-f`).
pub(crate) struct UnicodeEscapeBuffer {
    value: u16,
    len: u8,
}

impl UnicodeEscapeBuffer {
    pub(crate) fn new() -> Self {
        Self { value: 0, len: 0 }
    }

    /// Clears any accumulated digits.
    pub(crate) fn reset(&mut self) {
        self.value = 0;
        self.len = 0;
    }

    /// Feeds one digit.
    ///
    /// - `Ok(None)` while fewer than four digits have been seen.
    /// - `Ok(Some(unit))` on the fourth digit; the buffer resets itself.
    /// - `Err` if `c` is not a hex digit.
    pub(crate) fn feed(&mut self, c: char) -> Result<Option<u16>, SyntaxError> {
        let digit = c
            .to_digit(16)
            .ok_or(SyntaxError::InvalidUnicodeEscapeChar(c))?;

        // `digit < 16`, so the narrowing is lossless.
        #[allow(clippy::cast_possible_truncation)]
        let digit = digit as u16;
        self.value = (self.value << 4) | digit;
        self.len += 1;

        if self.len == 4 {
            let unit = self.value;
            self.reset();
            Ok(Some(unit))
        } else {
            Ok(None)
        }
    }
}
