//! Stream events produced by the parser.
//!
//! A document is always rendered as `StartDocument`, exactly one container
//! value, then `EndDocument`. Inside objects every [`StreamEvent::Key`] is
//! followed by exactly one value-producing event (a scalar or a container
//! start).
use core::fmt;

use serde_json::{Number, Value};

use crate::Error;

/// One unit of structural or scalar progress through a JSON document.
///
/// Events compare by variant and payload.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// The document has begun. Always the first event.
    StartDocument,
    /// The top-level value is complete. Always the last event.
    EndDocument,
    /// `{`
    StartObject,
    /// `}`
    EndObject,
    /// `[`
    StartArray,
    /// `]`
    EndArray,
    /// An object key, already unescaped.
    Key(String),
    /// A string value, already unescaped.
    StringValue(String),
    /// A number. Literals with a fraction or exponent are always floating.
    NumberValue(Number),
    /// `true` or `false`.
    BooleanValue(bool),
    /// `null`.
    NullValue,
}

impl StreamEvent {
    /// Returns `true` for string, number, boolean and null values.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::StringValue(_) | Self::NumberValue(_) | Self::BooleanValue(_) | Self::NullValue
        )
    }

    /// Returns `true` for [`StartObject`](Self::StartObject) and
    /// [`StartArray`](Self::StartArray).
    #[must_use]
    pub fn is_container_start(&self) -> bool {
        matches!(self, Self::StartObject | Self::StartArray)
    }

    /// Returns `true` for [`EndObject`](Self::EndObject) and
    /// [`EndArray`](Self::EndArray).
    #[must_use]
    pub fn is_container_end(&self) -> bool {
        matches!(self, Self::EndObject | Self::EndArray)
    }

    /// Converts a scalar event into its value, handing back any other event
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns the event itself if it does not carry a scalar.
    pub fn into_scalar(self) -> Result<Value, Self> {
        match self {
            Self::StringValue(s) => Ok(Value::String(s)),
            Self::NumberValue(n) => Ok(Value::Number(n)),
            Self::BooleanValue(b) => Ok(Value::Bool(b)),
            Self::NullValue => Ok(Value::Null),
            other => Err(other),
        }
    }
}

impl fmt::Display for StreamEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartDocument => f.write_str("start document"),
            Self::EndDocument => f.write_str("end document"),
            Self::StartObject => f.write_str("start object"),
            Self::EndObject => f.write_str("end object"),
            Self::StartArray => f.write_str("start array"),
            Self::EndArray => f.write_str("end array"),
            Self::Key(key) => write!(f, "key {}", Value::String(key.clone())),
            Self::StringValue(s) => write!(f, "string {}", Value::String(s.clone())),
            Self::NumberValue(n) => write!(f, "number {n}"),
            Self::BooleanValue(b) => write!(f, "boolean {b}"),
            Self::NullValue => f.write_str("null"),
        }
    }
}

/// A pull-based producer of [`StreamEvent`]s.
///
/// Implemented by [`StreamingParser`](crate::StreamingParser); the projector
/// is written against this trait only.
pub trait EventSource {
    /// Returns the next event of the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying input is malformed, unreadable, or
    /// already exhausted.
    fn next_event(&mut self) -> Result<StreamEvent, Error>;

    /// Consumes and discards one complete value: a single scalar event, or a
    /// container start together with everything up to its matching end.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`next_event`](Self::next_event) and fails
    /// with [`ProjectionError::UnexpectedEvent`](crate::ProjectionError) if
    /// the next event does not begin a value.
    fn skip_value(&mut self) -> Result<(), Error> {
        let event = self.next_event()?;
        if event.is_scalar() {
            Ok(())
        } else if event.is_container_start() {
            self.skip_container()
        } else {
            Err(crate::ProjectionError::UnexpectedEvent(event).into())
        }
    }

    /// Discards events until the container whose start was just consumed is
    /// closed, honoring nesting.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`next_event`](Self::next_event).
    fn skip_container(&mut self) -> Result<(), Error> {
        let mut depth = 1usize;
        while depth > 0 {
            let event = self.next_event()?;
            if event.is_container_start() {
                depth += 1;
            } else if event.is_container_end() {
                depth -= 1;
            }
        }
        Ok(())
    }
}

impl<S: EventSource + ?Sized> EventSource for &mut S {
    fn next_event(&mut self) -> Result<StreamEvent, Error> {
        (**self).next_event()
    }

    fn skip_value(&mut self) -> Result<(), Error> {
        (**self).skip_value()
    }

    fn skip_container(&mut self) -> Result<(), Error> {
        (**self).skip_container()
    }
}
