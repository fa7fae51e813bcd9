use super::error::SyntaxError;
use crate::StreamEvent;

/// One of the three bare keywords JSON allows as a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Keyword {
    True,
    False,
    Null,
}

/// What happened after feeding one more character into a keyword?
#[derive(Debug, PartialEq)]
pub(crate) enum Step {
    /// Character accepted, keyword not complete yet.
    NeedMore,
    /// The keyword is complete and matched.
    Done(StreamEvent),
}

impl Keyword {
    /// Keyword introduced by `first`, if any.
    pub(crate) fn from_first(first: char) -> Option<Self> {
        match first {
            't' => Some(Self::True),
            'f' => Some(Self::False),
            'n' => Some(Self::Null),
            _ => None,
        }
    }

    pub(crate) fn text(self) -> &'static str {
        match self {
            Self::True => "true",
            Self::False => "false",
            Self::Null => "null",
        }
    }

    /// Characters that may follow the first one.
    fn allows(self, c: char) -> bool {
        match self {
            Self::True => matches!(c, 'r' | 'u' | 'e'),
            Self::False => matches!(c, 'a' | 'l' | 's' | 'e'),
            Self::Null => matches!(c, 'u' | 'l'),
        }
    }

    fn event(self) -> StreamEvent {
        match self {
            Self::True => StreamEvent::BooleanValue(true),
            Self::False => StreamEvent::BooleanValue(false),
            Self::Null => StreamEvent::NullValue,
        }
    }

    /// Appends `c` to `buffer`, which already holds the characters read so far.
    ///
    /// Characters outside the keyword's alphabet are rejected immediately; the
    /// full spelling is only compared once `buffer` reaches the keyword's
    /// length. On success `buffer` is cleared.
    pub(crate) fn step(self, buffer: &mut String, c: char) -> Result<Step, SyntaxError> {
        if !self.allows(c) {
            return Err(SyntaxError::ExpectedKeyword(self.text()));
        }
        buffer.push(c);

        if buffer.len() < self.text().len() {
            return Ok(Step::NeedMore);
        }

        if buffer == self.text() {
            buffer.clear();
            Ok(Step::Done(self.event()))
        } else {
            Err(SyntaxError::ExpectedKeyword(self.text()))
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn run(input: &str) -> Result<Option<StreamEvent>, SyntaxError> {
        let mut chars = input.chars();
        let first = chars.next().unwrap();
        let keyword = Keyword::from_first(first).unwrap();
        let mut buffer = String::from(first);
        let mut done = None;
        for c in chars {
            if let Step::Done(event) = keyword.step(&mut buffer, c)? {
                done = Some(event);
            }
        }
        Ok(done)
    }

    #[rstest]
    #[case("true", StreamEvent::BooleanValue(true))]
    #[case("false", StreamEvent::BooleanValue(false))]
    #[case("null", StreamEvent::NullValue)]
    fn matches_keyword(#[case] input: &str, #[case] expected: StreamEvent) {
        assert_eq!(run(input).unwrap(), Some(expected));
    }

    #[rstest]
    #[case("tx", "true")]
    #[case("fals3", "false")]
    #[case("nil", "null")]
    fn rejects_foreign_character(#[case] input: &str, #[case] keyword: &'static str) {
        assert_eq!(run(input), Err(SyntaxError::ExpectedKeyword(keyword)));
    }

    #[rstest]
    #[case("tuue", "true")]
    #[case("fasle", "false")]
    #[case("nlul", "null")]
    fn rejects_misspelling_at_full_length(#[case] input: &str, #[case] keyword: &'static str) {
        assert_eq!(run(input), Err(SyntaxError::ExpectedKeyword(keyword)));
    }

    #[test]
    fn prefix_needs_more() {
        assert_eq!(run("nul"), Ok(None));
    }

    #[test]
    fn only_keyword_letters_start_keywords() {
        assert_eq!(Keyword::from_first('x'), None);
        assert_eq!(Keyword::from_first('f'), Some(Keyword::False));
    }
}
