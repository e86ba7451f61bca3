//! Append-only byte region handing out stable, shareable slices.
//!
//! # Design
//!
//! The arena writes into the spare capacity of one `BytesMut` chunk and
//! splits the written prefix off as a frozen [`Bytes`]. Handles are
//! reference-counted views into the chunk: cloning one bumps a counter,
//! never copies bytes, and the chunk stays alive until the arena and every
//! handle into it are dropped. Nothing is ever freed individually.
//!
//! ```text
//! chunk 0: [key0|key1|key2|......spare......]
//!           ^    ^    ^
//!           Bytes handles shared by every attribute map
//! ```

use bytes::{BufMut, Bytes, BytesMut};

/// Default chunk size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Smallest accepted chunk size.
const MIN_CHUNK_SIZE: usize = 64;

/// Growable region allocator over `BytesMut` chunks.
#[derive(Debug)]
pub struct Arena {
    current: BytesMut,
    chunk_size: usize,
    allocated: usize,
    used: usize,
    chunks: usize,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Arena {
    /// Creates an empty arena with the default chunk size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Creates an empty arena; no memory is reserved until the first write.
    #[must_use]
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            current: BytesMut::new(),
            chunk_size: chunk_size.max(MIN_CHUNK_SIZE),
            allocated: 0,
            used: 0,
            chunks: 0,
        }
    }

    /// Writes exactly `len` bytes with `write` and returns the handle.
    ///
    /// `write` must append exactly `len` bytes to the buffer it receives.
    pub fn alloc<F>(&mut self, len: usize, write: F) -> Bytes
    where
        F: FnOnce(&mut BytesMut),
    {
        if self.current.capacity() < len {
            self.grow(len);
        }
        write(&mut self.current);
        debug_assert_eq!(self.current.len(), len, "arena writer length mismatch");
        self.used += self.current.len();
        self.current.split().freeze()
    }

    /// Copies `bytes` into the arena.
    pub fn insert(&mut self, bytes: &[u8]) -> Bytes {
        self.alloc(bytes.len(), |buf| buf.put_slice(bytes))
    }

    fn grow(&mut self, min_len: usize) {
        self.current = BytesMut::with_capacity(self.chunk_size.max(min_len));
        self.allocated += self.current.capacity();
        self.chunks += 1;
    }

    /// Bytes reserved across all chunks.
    #[must_use]
    pub fn allocated_bytes(&self) -> usize {
        self.allocated
    }

    /// Bytes handed out through handles.
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.used
    }

    /// Number of chunks reserved so far.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks
    }

    /// Configured chunk size.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}
