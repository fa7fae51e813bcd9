/// Number of bytes requested from the reader per read.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Number of nested objects and arrays accepted by default.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Configuration options for [`StreamingParser`](super::StreamingParser).
///
/// # Default
///
/// `chunk_size` defaults to [`DEFAULT_CHUNK_SIZE`] and `max_depth` to
/// [`DEFAULT_MAX_DEPTH`].
#[derive(Debug, Clone, Copy)]
pub struct ParserOptions {
    /// Upper bound on the bytes requested from the reader in one call.
    ///
    /// Chunk boundaries never affect the events produced: multi-byte
    /// characters split across reads are reassembled. Values below `1` are
    /// treated as `1`.
    ///
    /// # Default
    ///
    /// `4096`
    pub chunk_size: usize,

    /// Maximum number of objects and arrays open at once. Opening one more
    /// fails with [`ErrorSource::DepthLimitExceeded`](super::ErrorSource).
    /// Values below `1` are treated as `1`.
    ///
    /// Projected values are dropped recursively, so very large limits let
    /// deeply nested input exhaust the stack once the value goes away.
    ///
    /// # Default
    ///
    /// `128`
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParserOptions {
    /// Sets [`chunk_size`](Self::chunk_size).
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Sets [`max_depth`](Self::max_depth).
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub(crate) fn effective_chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }

    pub(crate) fn effective_max_depth(&self) -> usize {
        self.max_depth.max(1)
    }
}
