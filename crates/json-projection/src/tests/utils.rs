use std::io::{self, Read};

use crate::{Error, ParserError, ParserOptions, StreamEvent, StreamingParser};

/// A reader that hands out at most `step` bytes per call and reports
/// `Interrupted` before every real read when `interrupt` is set.
pub(crate) struct Trickle<'a> {
    data: &'a [u8],
    step: usize,
    interrupt: bool,
    interrupted: bool,
}

impl<'a> Trickle<'a> {
    pub(crate) fn new(data: &'a [u8], step: usize) -> Self {
        Self {
            data,
            step: step.max(1),
            interrupt: false,
            interrupted: false,
        }
    }

    pub(crate) fn interrupting(mut self) -> Self {
        self.interrupt = true;
        self
    }
}

impl Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.interrupt && !self.interrupted {
            self.interrupted = true;
            return Err(io::ErrorKind::Interrupted.into());
        }
        self.interrupted = false;

        let n = self.step.min(buf.len()).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

/// A reader that fails with `kind` after yielding `data`.
pub(crate) struct Failing<'a> {
    pub(crate) data: &'a [u8],
    pub(crate) kind: io::ErrorKind,
}

impl Read for Failing<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.data.is_empty() {
            return Err(self.kind.into());
        }
        let n = buf.len().min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

/// Parses `input` to `EndDocument` with reads of `chunk_size` bytes.
pub(crate) fn events_chunked(input: &[u8], chunk_size: usize) -> Result<Vec<StreamEvent>, Error> {
    let options = ParserOptions::default().with_chunk_size(chunk_size);
    StreamingParser::with_options(input, options).collect()
}

pub(crate) fn events(input: &str) -> Vec<StreamEvent> {
    events_chunked(input.as_bytes(), crate::DEFAULT_CHUNK_SIZE).unwrap()
}

/// Pulls events until the first error and returns it as a parser error.
pub(crate) fn first_error(input: &[u8]) -> ParserError {
    let mut parser = StreamingParser::new(input);
    loop {
        match parser.next_event() {
            Ok(StreamEvent::EndDocument) => panic!("document parsed without error"),
            Ok(_) => {}
            Err(Error::Parser(err)) => return err,
            Err(other) => panic!("expected parser error, got {other:?}"),
        }
    }
}
