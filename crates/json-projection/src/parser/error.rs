use thiserror::Error;

use super::utf8_buffer::DecodeError;

/// A fatal parse failure together with where it happened.
///
/// For grammar, surrogate and end-of-input problems `offset` is the 0-based
/// character offset of the offending character. For decode problems it is the
/// absolute byte offset of the offending byte, or of the first byte of the
/// unfinished sequence when the input ends inside one.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{source} at char {offset} ({line}:{column})")]
pub struct ParserError {
    pub(crate) source: ErrorSource,
    /// Character (or byte, for decode errors) offset.
    pub offset: usize,
    /// 1-based line of the offending character.
    pub line: usize,
    /// 1-based column of the offending character.
    pub column: usize,
}

impl ParserError {
    /// What went wrong.
    #[must_use]
    pub fn kind(&self) -> &ErrorSource {
        &self.source
    }
}

/// The category of a [`ParserError`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorSource {
    /// Malformed UTF-8 input.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
    /// A character that the JSON grammar does not allow here.
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    /// A `\u` escape surrogate without its other half.
    #[error("surrogate error: {0}")]
    Surrogate(#[from] SurrogateError),
    /// More objects and arrays are open at once than
    /// [`ParserOptions::max_depth`](super::ParserOptions::max_depth) allows.
    #[error("nesting deeper than {0} levels")]
    DepthLimitExceeded(usize),
    /// The input ended before the document was complete.
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    /// An event was requested after `EndDocument` had been returned.
    #[error("already at end of document, no more events")]
    AlreadyEnded,
    /// An event was requested after an earlier error.
    #[error("parser has already failed")]
    Failed,
}

/// Grammar violations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    /// The document does not start with `{` or `[`.
    #[error("expected whitespace, object `{{` or array `[` start token, found {0:?}")]
    ExpectedDocumentStart(char),
    /// Something other than `"` or `}` where an object key should begin.
    #[error("expected object key start `\"`, found {0:?}")]
    ExpectedKey(char),
    /// Something other than `:` after an object key.
    #[error("expected colon key separator, found {0:?}")]
    ExpectedColon(char),
    /// No JSON value starts with this character.
    #[error("expected value, found {0:?}")]
    ExpectedValue(char),
    /// Something other than `,` or a closing bracket after a value.
    #[error("expected comma `,` object `}}` or array `]` close, found {0:?}")]
    ExpectedValueSeparator(char),
    /// A closing bracket that does not match the open container.
    #[error("mismatched {0} close")]
    MismatchedClose(&'static str),
    /// An unescaped character in `U+0000..=U+001F` inside a string.
    #[error("control characters must be escaped, found U+{:04X}", code_point(.0))]
    UnescapedControl(char),
    /// An unknown escape character after `\`.
    #[error("expected escaped character, found {0:?}")]
    InvalidEscape(char),
    /// A non-hex character inside `\uXXXX`.
    #[error("expected unicode escape hex digit, found {0:?}")]
    InvalidUnicodeEscapeChar(char),
    /// A malformed number, e.g. `-`, `1.`, `1e+`.
    #[error("expected 0-9 digit, found {0:?}")]
    ExpectedDigit(char),
    /// Something other than a sign or digit after `e`/`E`.
    #[error("expected +, -, or 0-9 digit, found {0:?}")]
    ExpectedExponent(char),
    /// A number literal whose value is not finite.
    #[error("number out of range")]
    NumberOutOfRange,
    /// A misspelled `true`, `false` or `null`.
    #[error("expected {0} keyword")]
    ExpectedKeyword(&'static str),
    /// Non-whitespace after the document ended.
    #[error("unexpected data after end of document, found {0:?}")]
    TrailingData(char),
}

/// Unpaired UTF-16 surrogates in `\u` escapes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SurrogateError {
    /// A high surrogate not followed by `\u` and a low surrogate.
    #[error("expected low surrogate pair half after \\u{0:04X}")]
    ExpectedLowSurrogate(u16),
    /// A low surrogate with no high surrogate before it.
    #[error("expected high surrogate pair half before \\u{0:04X}")]
    ExpectedHighSurrogate(u16),
}

fn code_point(c: &char) -> u32 {
    u32::from(*c)
}
