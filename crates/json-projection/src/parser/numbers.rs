use serde_json::Number;

/// Lexical class of a complete number literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NumberLexeme<'a> {
    /// No `.` and no exponent.
    Integer(&'a str),
    /// Has a `.` or an exponent.
    Float(&'a str),
}

impl NumberLexeme<'_> {
    /// Parses the literal.
    ///
    /// Integers are exact when they fit `i64` or `u64`; wider integers fall
    /// back to the nearest `f64`. Floats use the standard library's
    /// round-to-nearest parse. Returns `None` if the value is not finite
    /// (e.g. `1e400`).
    pub(crate) fn parse(self) -> Option<Number> {
        match self {
            Self::Integer(lexeme) => lexeme
                .parse::<i64>()
                .map(Number::from)
                .or_else(|_| lexeme.parse::<u64>().map(Number::from))
                .ok()
                .or_else(|| parse_float(lexeme)),
            Self::Float(lexeme) => parse_float(lexeme),
        }
    }
}

fn parse_float(lexeme: &str) -> Option<Number> {
    lexeme.parse::<f64>().ok().and_then(Number::from_f64)
}
