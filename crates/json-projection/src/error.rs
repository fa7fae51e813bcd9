use thiserror::Error;

use crate::{StreamEvent, parser::ParserError};

/// Any failure while parsing or projecting a document.
#[derive(Debug, Error)]
pub enum Error {
    /// The input is not a well-formed JSON document.
    #[error(transparent)]
    Parser(#[from] ParserError),
    /// The reader failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The event stream does not have the shape of a document.
    #[error("projection error: {0}")]
    Projection(#[from] ProjectionError),
}

impl Error {
    /// The parser error, if this is one.
    #[must_use]
    pub fn as_parser_error(&self) -> Option<&ParserError> {
        match self {
            Self::Parser(err) => Some(err),
            Self::Io(_) | Self::Projection(_) => None,
        }
    }
}

/// A structurally invalid event stream.
///
/// A [`StreamingParser`](crate::StreamingParser) never produces these; they
/// arise only from other [`EventSource`](crate::EventSource) implementations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProjectionError {
    /// The stream did not begin with `StartDocument`.
    #[error("expected start document, found {0}")]
    ExpectedStartDocument(StreamEvent),
    /// The value was not followed by `EndDocument`.
    #[error("expected end document, found {0}")]
    ExpectedEndDocument(StreamEvent),
    /// Something other than a key or `EndObject` inside an object.
    #[error("expected key or end object, found {0}")]
    ExpectedKey(StreamEvent),
    /// An event that cannot begin a value.
    #[error("unexpected {0}")]
    UnexpectedEvent(StreamEvent),
}
