//! Schema-directed materialization of an event stream.
//!
//! The projector walks the events of one document and builds a
//! [`serde_json::Value`] containing only what the [`Schema`] asks for. Values
//! under uninteresting keys are skipped event by event and never turned into
//! values.

use std::io::Read;

use serde_json::{Map, Value};

use crate::{Error, EventSource, ParserOptions, ProjectionError, Schema, StreamEvent, StreamingParser};

/// Builds filtered values from an [`EventSource`].
#[derive(Debug)]
pub struct Projector<S> {
    source: S,
}

impl<R: Read> Projector<StreamingParser<R>> {
    /// Projects straight from a byte reader with default parser options.
    pub fn from_reader(reader: R) -> Self {
        Self::new(StreamingParser::new(reader))
    }

    /// Projects from a byte reader with the given parser options.
    pub fn with_options(reader: R, options: ParserOptions) -> Self {
        Self::new(StreamingParser::with_options(reader, options))
    }
}

impl<S: EventSource> Projector<S> {
    /// Wraps an event source positioned before `StartDocument`.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Consumes one document, `StartDocument` through `EndDocument`, and
    /// returns its projection.
    ///
    /// # Errors
    ///
    /// Propagates source errors. Fails with [`ProjectionError`] if the
    /// events do not form a document.
    pub fn project(&mut self, schema: &Schema) -> Result<Value, Error> {
        match self.source.next_event()? {
            StreamEvent::StartDocument => {}
            other => return Err(ProjectionError::ExpectedStartDocument(other).into()),
        }

        let first = self.source.next_event()?;
        let value = self.build(schema, first)?;

        match self.source.next_event()? {
            StreamEvent::EndDocument => Ok(value),
            other => Err(ProjectionError::ExpectedEndDocument(other).into()),
        }
    }

    /// Borrows the event source.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Gives back the event source.
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Builds the value that `first` begins.
    ///
    /// Open containers live on an explicit stack, so nesting depth costs heap
    /// rather than native stack.
    fn build(&mut self, schema: &Schema, first: StreamEvent) -> Result<Value, Error> {
        let mut open: Vec<Partial<'_>> = Vec::new();
        let (mut schema, mut event) = (schema, first);

        loop {
            let mut value = match event.into_scalar() {
                Ok(scalar) => Some(scalar),
                Err(StreamEvent::StartArray) => {
                    open.push(Partial::Array {
                        schema,
                        items: Vec::new(),
                    });
                    None
                }
                Err(StreamEvent::StartObject) => {
                    open.push(Partial::Object {
                        schema,
                        map: Map::new(),
                        key: None,
                    });
                    None
                }
                Err(other) => return Err(ProjectionError::UnexpectedEvent(other).into()),
            };

            // Feed the innermost container until something begins a new value.
            (schema, event) = loop {
                let Some(top) = open.last_mut() else {
                    // Only a finished value empties the stack.
                    return Ok(value.unwrap_or_default());
                };
                if let Some(done) = value.take() {
                    top.attach(done);
                }
                match top.pull(&mut self.source)? {
                    Pulled::Begin(sub, next) => break (sub, next),
                    Pulled::Skipped => {}
                    Pulled::End(done) => {
                        open.pop();
                        value = Some(done);
                    }
                }
            };
        }
    }
}

/// A container whose closing event has not been seen yet.
enum Partial<'s> {
    Array {
        schema: &'s Schema,
        items: Vec<Value>,
    },
    Object {
        schema: &'s Schema,
        map: Map<String, Value>,
        /// Key of the member value currently being built.
        key: Option<String>,
    },
}

enum Pulled<'s> {
    /// `event` begins a member value filtered by the schema.
    Begin(&'s Schema, StreamEvent),
    /// An uninteresting member was discarded.
    Skipped,
    /// The container closed.
    End(Value),
}

impl<'s> Partial<'s> {
    fn attach(&mut self, value: Value) {
        match self {
            Self::Array { items, .. } => items.push(value),
            Self::Object { map, key, .. } => {
                if let Some(key) = key.take() {
                    map.insert(key, value);
                }
            }
        }
    }

    fn pull<S: EventSource>(&mut self, source: &mut S) -> Result<Pulled<'s>, Error> {
        let event = source.next_event()?;
        match self {
            Self::Array { schema, items } => Ok(if event == StreamEvent::EndArray {
                Pulled::End(Value::Array(std::mem::take(items)))
            } else {
                Pulled::Begin(*schema, event)
            }),
            Self::Object { schema, map, key } => {
                let name = match event {
                    StreamEvent::EndObject => {
                        return Ok(Pulled::End(Value::Object(std::mem::take(map))));
                    }
                    StreamEvent::Key(name) => name,
                    other => return Err(ProjectionError::ExpectedKey(other).into()),
                };
                let schema: &'s Schema = *schema;
                if let Some(sub) = schema.select(&name) {
                    *key = Some(name);
                    Ok(Pulled::Begin(sub, source.next_event()?))
                } else {
                    log::trace!("skipping value of key {name:?}");
                    source.skip_value()?;
                    Ok(Pulled::Skipped)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use serde_json::json;

    use super::*;
    use crate::schema;

    struct Scripted(VecDeque<StreamEvent>);

    impl Scripted {
        fn new(events: impl IntoIterator<Item = StreamEvent>) -> Self {
            Self(events.into_iter().collect())
        }
    }

    impl EventSource for Scripted {
        fn next_event(&mut self) -> Result<StreamEvent, Error> {
            self.0
                .pop_front()
                .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into())
        }
    }

    fn projection_error(result: Result<Value, Error>) -> ProjectionError {
        match result {
            Err(Error::Projection(err)) => err,
            other => panic!("expected projection error, got {other:?}"),
        }
    }

    #[test]
    fn builds_from_scripted_events() {
        use StreamEvent::*;
        let mut projector = Projector::new(Scripted::new([
            StartDocument,
            StartObject,
            Key("keep".into()),
            StartArray,
            NumberValue(1.into()),
            NullValue,
            EndArray,
            Key("drop".into()),
            StartObject,
            Key("x".into()),
            BooleanValue(true),
            EndObject,
            EndObject,
            EndDocument,
        ]));
        let value = projector.project(&schema!({ "keep" })).unwrap();
        assert_eq!(value, json!({"keep": [1, null]}));
        assert!(projector.get_mut().0.is_empty());
    }

    #[test]
    fn requires_start_document() {
        let mut projector = Projector::new(Scripted::new([StreamEvent::StartObject]));
        assert_eq!(
            projection_error(projector.project(&Schema::All)),
            ProjectionError::ExpectedStartDocument(StreamEvent::StartObject)
        );
    }

    #[test]
    fn requires_end_document() {
        let mut projector = Projector::new(Scripted::new([
            StreamEvent::StartDocument,
            StreamEvent::StartArray,
            StreamEvent::EndArray,
            StreamEvent::NullValue,
        ]));
        assert_eq!(
            projection_error(projector.project(&Schema::All)),
            ProjectionError::ExpectedEndDocument(StreamEvent::NullValue)
        );
    }

    #[test]
    fn object_members_must_start_with_key() {
        let mut projector = Projector::new(Scripted::new([
            StreamEvent::StartDocument,
            StreamEvent::StartObject,
            StreamEvent::NullValue,
        ]));
        assert_eq!(
            projection_error(projector.project(&Schema::All)),
            ProjectionError::ExpectedKey(StreamEvent::NullValue)
        );
    }

    #[test]
    fn value_position_rejects_end_events() {
        let mut projector = Projector::new(Scripted::new([
            StreamEvent::StartDocument,
            StreamEvent::EndObject,
        ]));
        assert_eq!(
            projection_error(projector.project(&Schema::All)),
            ProjectionError::UnexpectedEvent(StreamEvent::EndObject)
        );
    }

    #[test]
    fn source_errors_propagate() {
        let mut projector = Projector::new(Scripted::new([StreamEvent::StartDocument]));
        assert!(matches!(
            projector.project(&Schema::All),
            Err(Error::Io(err)) if err.kind() == std::io::ErrorKind::UnexpectedEof
        ));
    }

    #[test]
    fn deep_nesting_does_not_recurse() {
        const DEPTH: usize = 100_000;
        let mut events = vec![StreamEvent::StartDocument];
        events.extend((0..DEPTH).map(|_| StreamEvent::StartArray));
        events.extend((0..DEPTH).map(|_| StreamEvent::EndArray));
        events.push(StreamEvent::EndDocument);

        let mut projector = Projector::new(Scripted::new(events));
        let mut value = projector.project(&Schema::All).unwrap();
        // Unwound by hand: dropping it whole would recurse.
        let mut depth = 0;
        while let Value::Array(mut items) = value {
            depth += 1;
            value = items.pop().unwrap_or(Value::Null);
        }
        assert_eq!(depth, DEPTH);
    }

    #[test]
    fn works_through_mutable_reference() {
        let mut source = Scripted::new([
            StreamEvent::StartDocument,
            StreamEvent::StartArray,
            StreamEvent::EndArray,
            StreamEvent::EndDocument,
            StreamEvent::NullValue,
        ]);
        let value = Projector::new(&mut source).project(&Schema::All).unwrap();
        assert_eq!(value, json!([]));
        assert_eq!(source.next_event().unwrap(), StreamEvent::NullValue);
    }
}
