//! Pull-based, constant-memory JSON decoding with schema-directed projection.
//!
//! [`StreamingParser`] turns any [`std::io::Read`] into a stream of
//! [`StreamEvent`]s, one per call, without ever holding the whole document.
//! [`Projector`] walks that stream against a [`Schema`] and materializes only
//! the keys it names, skipping everything else at the event level.
//!
//! ```
//! use json_projection::{project, schema};
//! use serde_json::json;
//!
//! let input = br#"{"action": "opened", "issue": {"id": 7, "body": "..."}, "sender": {}}"#;
//! let value = project(&input[..], &schema!({ "action", "issue": { "id" } })).unwrap();
//! assert_eq!(value, json!({"action": "opened", "issue": {"id": 7}}));
//! ```
//!
//! Only objects and arrays are accepted as documents; a bare top-level scalar
//! such as `42` is a syntax error.

mod error;
mod event;
mod parser;
mod projector;
pub mod schema;

#[cfg(test)]
mod tests;

use std::io::Read;

pub use error::{Error, ProjectionError};
pub use event::{EventSource, StreamEvent};
pub use parser::{
    DEFAULT_CHUNK_SIZE, DEFAULT_MAX_DEPTH, DecodeError, ErrorSource, ParserError, ParserOptions,
    StreamingParser, SurrogateError, SyntaxError, Utf8Decoder,
};
pub use projector::Projector;
pub use schema::{Schema, SchemaError};
pub use serde_json::{Map, Number, Value};

/// Projects the single document in `reader` through `schema`.
///
/// Unlike [`Projector::project`], this also reads the input to its end and
/// rejects anything but whitespace after the document.
///
/// # Errors
///
/// Returns an error if the reader fails or the input is not exactly one
/// well-formed JSON object or array.
pub fn project<R: Read>(reader: R, schema: &Schema) -> Result<Value, Error> {
    let mut projector = Projector::from_reader(reader);
    let value = projector.project(schema)?;
    projector.into_inner().finish()?;
    Ok(value)
}
