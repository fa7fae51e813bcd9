//! The character-level JSON state machine.
//!
//! [`Machine`] knows nothing about readers, chunks or decoding: it consumes one
//! `char` at a time and reports the events that character completed. The
//! streaming parser owns the I/O and position bookkeeping around it.

use super::{
    error::{ErrorSource, SurrogateError, SyntaxError},
    escape_buffer::UnicodeEscapeBuffer,
    event_queue::EventQueue,
    literal_buffer::{self, Keyword},
    numbers::NumberLexeme,
};
use crate::StreamEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum State {
    /// Before the first non-whitespace character.
    StartDocument,
    /// Just after `{`.
    StartObject,
    /// Just after `[`.
    StartArray,
    InString,
    /// After `\` inside a string.
    StringEscape,
    /// Inside the four hex digits of `\uXXXX`.
    UnicodeEscape,
    /// After a high surrogate escape, expecting `\`.
    SurrogateBackslash,
    /// After a high surrogate escape and `\`, expecting `u`.
    SurrogateU,
    /// After a leading `-`.
    NegativeNumber,
    /// After a leading `0` (optionally signed).
    Zero,
    Integer,
    /// After `.`, expecting the first fraction digit.
    FractionStart,
    Fraction,
    /// After `e`/`E`, expecting a sign or digit.
    ExponentStart,
    /// After the exponent sign, expecting a digit.
    ExponentSign,
    Exponent,
    Keyword(Keyword),
    /// After a key's closing quote, expecting `:`.
    EndKey,
    /// After `:`, expecting a value.
    KeySeparator,
    /// After a complete value inside a container.
    EndValue,
    /// After `,`.
    ValueSeparator,
    /// After the root container closed.
    EndDocument,
}

/// Entries on the nesting stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Frame {
    Object,
    Array,
    /// A string being read as an object key.
    Key,
    /// A string being read as a value.
    String,
    /// A `\u` high surrogate waiting for its low half.
    HighSurrogate(u16),
}

impl Frame {
    fn name(self) -> &'static str {
        match self {
            Frame::Object => "object",
            Frame::Array => "array",
            Frame::Key => "key",
            Frame::String => "string",
            Frame::HighSurrogate(_) => "surrogate pair",
        }
    }
}

/// Whether the current character still has to be looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Consumed,
    /// A number ended on a character that belongs to what comes after it.
    Replay,
}

#[derive(Debug)]
pub(crate) struct Machine {
    state: State,
    stack: Vec<Frame>,
    /// Text of the string, number or keyword being read.
    buffer: String,
    unicode_escape: UnicodeEscapeBuffer,
    /// Objects and arrays currently open.
    depth: usize,
    max_depth: usize,
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\n' | '\t' | '\r')
}

impl Machine {
    pub(crate) fn new(max_depth: usize) -> Self {
        Self {
            state: State::StartDocument,
            stack: Vec::new(),
            buffer: String::new(),
            unicode_escape: UnicodeEscapeBuffer::new(),
            depth: 0,
            max_depth,
        }
    }

    /// True once the root container has closed.
    pub(crate) fn is_complete(&self) -> bool {
        self.state == State::EndDocument
    }

    /// Consumes `ch` and returns the events it completed, oldest first.
    ///
    /// On error the machine is left in an unspecified state and must not be
    /// fed again.
    pub(crate) fn transition(&mut self, ch: char) -> Result<EventQueue, ErrorSource> {
        let mut events = EventQueue::new();
        if self.step(ch, &mut events)? == Step::Replay {
            let replayed = self.step(ch, &mut events)?;
            debug_assert_eq!(replayed, Step::Consumed);
        }
        Ok(events)
    }

    #[allow(clippy::too_many_lines)]
    fn step(&mut self, ch: char, events: &mut EventQueue) -> Result<Step, ErrorSource> {
        match self.state {
            State::StartDocument => match ch {
                c if is_whitespace(c) => {}
                '{' | '[' => {
                    events.push_front(StreamEvent::StartDocument);
                    self.open(ch, events)?;
                }
                c => return Err(SyntaxError::ExpectedDocumentStart(c).into()),
            },
            State::StartObject => match ch {
                c if is_whitespace(c) => {}
                '"' => self.begin_string(Frame::Key),
                '}' => self.close(Frame::Object, events)?,
                c => return Err(SyntaxError::ExpectedKey(c).into()),
            },
            State::StartArray => match ch {
                ']' => self.close(Frame::Array, events)?,
                c => self.start_value(c, events)?,
            },
            State::InString => match ch {
                '"' => self.end_string(events),
                '\\' => self.state = State::StringEscape,
                c if c <= '\u{1F}' => return Err(SyntaxError::UnescapedControl(c).into()),
                c => self.buffer.push(c),
            },
            State::StringEscape => {
                let unescaped = match ch {
                    '"' | '\\' | '/' => ch,
                    'b' => '\u{8}',
                    'f' => '\u{C}',
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    'u' => {
                        self.unicode_escape.reset();
                        self.state = State::UnicodeEscape;
                        return Ok(Step::Consumed);
                    }
                    c => return Err(SyntaxError::InvalidEscape(c).into()),
                };
                self.buffer.push(unescaped);
                self.state = State::InString;
            }
            State::UnicodeEscape => {
                if let Some(unit) = self.unicode_escape.feed(ch)? {
                    self.code_unit(unit)?;
                }
            }
            State::SurrogateBackslash => match ch {
                '\\' => self.state = State::SurrogateU,
                _ => return Err(self.missing_low_surrogate()),
            },
            State::SurrogateU => match ch {
                'u' => {
                    self.unicode_escape.reset();
                    self.state = State::UnicodeEscape;
                }
                _ => return Err(self.missing_low_surrogate()),
            },
            State::NegativeNumber => match ch {
                '0' => self.number_char(ch, State::Zero),
                '1'..='9' => self.number_char(ch, State::Integer),
                c => return Err(SyntaxError::ExpectedDigit(c).into()),
            },
            State::Zero => match ch {
                '.' => self.number_char(ch, State::FractionStart),
                'e' | 'E' => self.number_char(ch, State::ExponentStart),
                _ => return self.end_number(false, events),
            },
            State::Integer => match ch {
                '0'..='9' => self.buffer.push(ch),
                '.' => self.number_char(ch, State::FractionStart),
                'e' | 'E' => self.number_char(ch, State::ExponentStart),
                _ => return self.end_number(false, events),
            },
            State::FractionStart => match ch {
                '0'..='9' => self.number_char(ch, State::Fraction),
                c => return Err(SyntaxError::ExpectedDigit(c).into()),
            },
            State::Fraction => match ch {
                '0'..='9' => self.buffer.push(ch),
                'e' | 'E' => self.number_char(ch, State::ExponentStart),
                _ => return self.end_number(true, events),
            },
            State::ExponentStart => match ch {
                '+' | '-' => self.number_char(ch, State::ExponentSign),
                '0'..='9' => self.number_char(ch, State::Exponent),
                c => return Err(SyntaxError::ExpectedExponent(c).into()),
            },
            State::ExponentSign => match ch {
                '0'..='9' => self.number_char(ch, State::Exponent),
                c => return Err(SyntaxError::ExpectedDigit(c).into()),
            },
            State::Exponent => match ch {
                '0'..='9' => self.buffer.push(ch),
                _ => return self.end_number(true, events),
            },
            State::Keyword(keyword) => {
                if let literal_buffer::Step::Done(event) = keyword.step(&mut self.buffer, ch)? {
                    self.end_value(event, events);
                }
            }
            State::EndKey => match ch {
                c if is_whitespace(c) => {}
                ':' => self.state = State::KeySeparator,
                c => return Err(SyntaxError::ExpectedColon(c).into()),
            },
            State::KeySeparator => self.start_value(ch, events)?,
            State::EndValue => match ch {
                c if is_whitespace(c) => {}
                ',' => self.state = State::ValueSeparator,
                '}' => self.close(Frame::Object, events)?,
                ']' => self.close(Frame::Array, events)?,
                c => return Err(SyntaxError::ExpectedValueSeparator(c).into()),
            },
            State::ValueSeparator => {
                if self.stack.last() == Some(&Frame::Object) {
                    match ch {
                        c if is_whitespace(c) => {}
                        '"' => self.begin_string(Frame::Key),
                        c => return Err(SyntaxError::ExpectedKey(c).into()),
                    }
                } else {
                    self.start_value(ch, events)?;
                }
            }
            State::EndDocument => {
                if !is_whitespace(ch) {
                    return Err(SyntaxError::TrailingData(ch).into());
                }
            }
        }
        Ok(Step::Consumed)
    }

    /// Dispatches on the first character of a value.
    fn start_value(&mut self, ch: char, events: &mut EventQueue) -> Result<(), ErrorSource> {
        debug_assert!(self.buffer.is_empty());
        match ch {
            c if is_whitespace(c) => {}
            '{' | '[' => self.open(ch, events)?,
            '"' => self.begin_string(Frame::String),
            '-' => self.number_char(ch, State::NegativeNumber),
            '0' => self.number_char(ch, State::Zero),
            '1'..='9' => self.number_char(ch, State::Integer),
            c => match Keyword::from_first(c) {
                Some(keyword) => {
                    self.buffer.push(c);
                    self.state = State::Keyword(keyword);
                }
                None => return Err(SyntaxError::ExpectedValue(c).into()),
            },
        }
        Ok(())
    }

    fn open(&mut self, bracket: char, events: &mut EventQueue) -> Result<(), ErrorSource> {
        if self.depth == self.max_depth {
            return Err(ErrorSource::DepthLimitExceeded(self.max_depth));
        }
        self.depth += 1;
        if bracket == '{' {
            self.stack.push(Frame::Object);
            self.state = State::StartObject;
            events.push_front(StreamEvent::StartObject);
        } else {
            self.stack.push(Frame::Array);
            self.state = State::StartArray;
            events.push_front(StreamEvent::StartArray);
        }
        Ok(())
    }

    fn close(&mut self, expected: Frame, events: &mut EventQueue) -> Result<(), ErrorSource> {
        if self.stack.pop() != Some(expected) {
            return Err(SyntaxError::MismatchedClose(expected.name()).into());
        }
        self.depth -= 1;
        events.push_front(if expected == Frame::Object {
            StreamEvent::EndObject
        } else {
            StreamEvent::EndArray
        });

        if self.stack.is_empty() {
            events.push_front(StreamEvent::EndDocument);
            self.state = State::EndDocument;
        } else {
            self.state = State::EndValue;
        }
        Ok(())
    }

    fn begin_string(&mut self, frame: Frame) {
        self.stack.push(frame);
        self.state = State::InString;
    }

    fn end_string(&mut self, events: &mut EventQueue) {
        let text = core::mem::take(&mut self.buffer);
        if self.stack.pop() == Some(Frame::Key) {
            events.push_front(StreamEvent::Key(text));
            self.state = State::EndKey;
        } else {
            self.end_value(StreamEvent::StringValue(text), events);
        }
    }

    fn end_value(&mut self, event: StreamEvent, events: &mut EventQueue) {
        events.push_front(event);
        self.state = State::EndValue;
    }

    fn number_char(&mut self, ch: char, next: State) {
        self.buffer.push(ch);
        self.state = next;
    }

    fn end_number(&mut self, float: bool, events: &mut EventQueue) -> Result<Step, ErrorSource> {
        let lexeme = if float {
            NumberLexeme::Float(&self.buffer)
        } else {
            NumberLexeme::Integer(&self.buffer)
        };
        let number = lexeme.parse().ok_or(SyntaxError::NumberOutOfRange)?;
        self.buffer.clear();
        self.end_value(StreamEvent::NumberValue(number), events);
        Ok(Step::Replay)
    }

    /// Handles a complete `\uXXXX` code unit.
    fn code_unit(&mut self, unit: u16) -> Result<(), ErrorSource> {
        let pending = match self.stack.last() {
            Some(&Frame::HighSurrogate(high)) => Some(high),
            _ => None,
        };

        match (unit, pending) {
            (0xD800..=0xDBFF, None) => {
                self.stack.push(Frame::HighSurrogate(unit));
                self.state = State::SurrogateBackslash;
                return Ok(());
            }
            (0xDC00..=0xDFFF, Some(high)) => {
                self.stack.pop();
                let code = ((u32::from(high) - 0xD800) * 0x400)
                    + (u32::from(unit) - 0xDC00)
                    + 0x10000;
                self.buffer
                    .push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            (0xDC00..=0xDFFF, None) => {
                return Err(SurrogateError::ExpectedHighSurrogate(unit).into());
            }
            (_, Some(high)) => return Err(SurrogateError::ExpectedLowSurrogate(high).into()),
            (_, None) => {
                self.buffer.push(
                    char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER),
                );
            }
        }
        self.state = State::InString;
        Ok(())
    }

    fn missing_low_surrogate(&self) -> ErrorSource {
        let high = match self.stack.last() {
            Some(&Frame::HighSurrogate(high)) => high,
            _ => 0,
        };
        SurrogateError::ExpectedLowSurrogate(high).into()
    }
}
