//! Pull-based streaming JSON parser.
//!
//! [`StreamingParser`] reads bytes from any [`std::io::Read`] in bounded
//! chunks, decodes them incrementally and drives the character state machine
//! until at least one [`StreamEvent`] is available. Memory use is bounded by
//! the chunk size, the nesting depth and the longest single string, number or
//! keyword in the input, never by the document size.
//!
//! ```
//! use json_projection::{StreamEvent, StreamingParser};
//!
//! let parser = StreamingParser::new(&br#"{"a": [true]}"#[..]);
//! let events = parser.collect::<Result<Vec<_>, _>>().unwrap();
//! assert_eq!(events[2], StreamEvent::Key("a".into()));
//! assert_eq!(events.len(), 8);
//! ```

mod error;
mod escape_buffer;
mod event_queue;
mod literal_buffer;
mod machine;
mod numbers;
mod options;
mod utf8_buffer;

use std::io::{self, Read};

pub use error::{ErrorSource, ParserError, SurrogateError, SyntaxError};
use event_queue::EventQueue;
use machine::Machine;
pub use options::{DEFAULT_CHUNK_SIZE, DEFAULT_MAX_DEPTH, ParserOptions};
pub use utf8_buffer::{DecodeError, Utf8Decoder};

use crate::{Error, EventSource, StreamEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Running,
    /// `EndDocument` has been handed out.
    Ended,
    /// An error has been handed out.
    Failed,
}

/// A pull parser over a byte reader.
///
/// Each call to [`next_event`](Self::next_event) returns exactly one event.
/// Errors are fatal: once one has been returned, every later call fails with
/// [`ErrorSource::Failed`].
#[derive(Debug)]
pub struct StreamingParser<R> {
    reader: R,
    read_buf: Vec<u8>,
    decoder: Utf8Decoder,
    /// Decoded text of the current chunk.
    text: String,
    /// Byte index into `text` of the next character to consume.
    cursor: usize,
    machine: Machine,
    pending: EventQueue,
    status: Status,
    /// 0-based character offset of the next character.
    position: usize,
    line: usize,
    column: usize,
    bytes_read: usize,
}

impl<R: Read> StreamingParser<R> {
    /// Creates a parser with default options.
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, ParserOptions::default())
    }

    /// Creates a parser with the given options.
    pub fn with_options(reader: R, options: ParserOptions) -> Self {
        Self {
            reader,
            read_buf: vec![0; options.effective_chunk_size()],
            decoder: Utf8Decoder::new(),
            text: String::new(),
            cursor: 0,
            machine: Machine::new(options.effective_max_depth()),
            pending: EventQueue::new(),
            status: Status::Running,
            position: 0,
            line: 1,
            column: 1,
            bytes_read: 0,
        }
    }

    /// Returns the next event, reading more input as needed.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if the reader fails.
    /// - [`Error::Parser`] for malformed UTF-8, grammar violations, unpaired
    ///   surrogates, premature end of input, and calls made after
    ///   `EndDocument` or after an earlier error.
    pub fn next_event(&mut self) -> Result<StreamEvent, Error> {
        match self.status {
            Status::Failed => return Err(self.error(ErrorSource::Failed).into()),
            Status::Ended => return Err(self.error(ErrorSource::AlreadyEnded).into()),
            Status::Running => {}
        }

        let result = self.pull();
        match &result {
            Ok(StreamEvent::EndDocument) => self.status = Status::Ended,
            Ok(_) => {}
            Err(err) => {
                log::debug!("parse failed: {err}");
                self.status = Status::Failed;
            }
        }
        result
    }

    /// Consumes the rest of the input and checks that it holds nothing but
    /// whitespace after a complete document. Events not yet pulled are
    /// discarded. Returns the reader on success.
    ///
    /// # Errors
    ///
    /// Fails if the parser already failed, the reader fails, the input is
    /// malformed or incomplete, or non-whitespace follows the document.
    pub fn finish(mut self) -> Result<R, Error> {
        if self.status == Status::Failed {
            return Err(self.error(ErrorSource::Failed).into());
        }
        self.pending.clear();

        loop {
            while let Some(ch) = self.peek_char() {
                self.machine
                    .transition(ch)
                    .map_err(|source| self.error(source))?;
                self.advance(ch);
            }
            if !self.fill()? {
                break;
            }
        }

        if self.machine.is_complete() {
            Ok(self.reader)
        } else {
            Err(self.error(ErrorSource::UnexpectedEndOfInput).into())
        }
    }

    /// 0-based character offset of the next unconsumed character.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Borrows the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Gives back the underlying reader. Buffered input is lost.
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn pull(&mut self) -> Result<StreamEvent, Error> {
        if let Some(event) = self.pending.pop_oldest() {
            return Ok(event);
        }

        loop {
            while let Some(ch) = self.peek_char() {
                let produced = self
                    .machine
                    .transition(ch)
                    .map_err(|source| self.error(source))?;
                self.advance(ch);

                if !produced.is_empty() {
                    self.pending.prepend(produced);
                    if let Some(event) = self.pending.pop_oldest() {
                        return Ok(event);
                    }
                }
            }

            if !self.fill()? {
                return Err(self.error(ErrorSource::UnexpectedEndOfInput).into());
            }
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.text[self.cursor..].chars().next()
    }

    fn advance(&mut self, ch: char) {
        self.cursor += ch.len_utf8();
        self.position += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    /// Replaces the consumed text with the next decoded chunk. Returns
    /// `false` at end of input.
    fn fill(&mut self) -> Result<bool, Error> {
        let read = loop {
            match self.reader.read(&mut self.read_buf) {
                Ok(read) => break read,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err.into()),
            }
        };

        if read == 0 {
            log::trace!("end of input after {} bytes", self.bytes_read);
            let unfinished = self.bytes_read - self.decoder.retained();
            return match self.decoder.finish() {
                Ok(()) => Ok(false),
                Err(err) => Err(self.decode_error(err, unfinished)),
            };
        }

        let chunk_start = self.bytes_read;
        self.bytes_read += read;
        log::trace!("read {read} bytes at byte offset {chunk_start}");

        let decoded = match self.decoder.feed(&self.read_buf[..read]) {
            Ok(decoded) => decoded,
            Err(err) => return Err(self.decode_error(err, chunk_start)),
        };
        self.text.clear();
        self.text.push_str(&decoded);
        self.cursor = 0;
        Ok(true)
    }

    fn error(&self, source: ErrorSource) -> ParserError {
        ParserError {
            source,
            offset: self.position,
            line: self.line,
            column: self.column,
        }
    }

    /// `base` is the absolute offset that the error's chunk index counts from.
    fn decode_error(&self, err: DecodeError, base: usize) -> Error {
        let offset = base + err.index().unwrap_or(0);
        ParserError {
            source: ErrorSource::Decode(err),
            offset,
            line: self.line,
            column: self.column,
        }
        .into()
    }
}

impl<R: Read> Iterator for StreamingParser<R> {
    type Item = Result<StreamEvent, Error>;

    /// Yields events up to and including `EndDocument`, or up to and
    /// including the first error.
    fn next(&mut self) -> Option<Self::Item> {
        match self.status {
            Status::Running => Some(self.next_event()),
            Status::Ended | Status::Failed => None,
        }
    }
}

impl<R: Read> EventSource for StreamingParser<R> {
    fn next_event(&mut self) -> Result<StreamEvent, Error> {
        StreamingParser::next_event(self)
    }
}
