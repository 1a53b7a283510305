// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(any(test, feature = "test-util"))]

//! Deterministic stream collaborators for exercising buffer corner cases.
//!
//! These are meant for test scenarios - e.g. proving that loading is
//! independent of how a source fragments its data - and are not optimized
//! for real-world use.

use std::io::{self, Read, Write};
use std::num::NonZero;
use std::sync::{Arc, Mutex};

/// A byte source that yields its data in chunks of at most a fixed size.
///
/// This makes the fragmentation of a stream deterministic, down to one byte
/// per read, so stream-consuming code can be shown to behave identically
/// regardless of chunk size.
#[derive(Debug)]
pub struct ChunkReader {
    data: Vec<u8>,
    pos: usize,
    chunk_len: NonZero<usize>,
}

impl ChunkReader {
    /// Creates a source over `data` that never yields more than `chunk_len`
    /// bytes per read.
    pub fn new(data: impl Into<Vec<u8>>, chunk_len: NonZero<usize>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
            chunk_len,
        }
    }
}

impl Read for ChunkReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.data.len() - self.pos;
        let n = remaining.min(self.chunk_len.get()).min(buf.len());

        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;

        Ok(n)
    }
}

/// A byte source that yields a prefix and then reports a read error.
#[derive(Debug)]
pub struct FailingReader {
    data: Vec<u8>,
    pos: usize,
}

impl FailingReader {
    /// Creates a source that yields `prefix` successfully before failing.
    pub fn new(prefix: impl Into<Vec<u8>>) -> Self {
        Self {
            data: prefix.into(),
            pos: 0,
        }
    }
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos >= self.data.len() {
            return Err(io::Error::other("the source failed after its prefix"));
        }

        let n = (self.data.len() - self.pos).min(buf.len());

        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;

        Ok(n)
    }
}

/// A drain sink that records everything written to it.
///
/// Clones share the recorded contents, so a test can keep one handle while
/// the buffer owns another. An optional per-write cap makes the sink consume
/// input in small portions, exercising the partial-write handling of
/// whatever is flushing into it.
#[derive(Clone, Debug, Default)]
pub struct SharedSink {
    contents: Arc<Mutex<Vec<u8>>>,
    max_write_len: Option<NonZero<usize>>,
}

impl SharedSink {
    /// Creates a sink that consumes every write in full.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink that consumes at most `max_write_len` bytes per write.
    #[must_use]
    pub fn with_max_write_len(max_write_len: NonZero<usize>) -> Self {
        Self {
            contents: Arc::new(Mutex::new(Vec::new())),
            max_write_len: Some(max_write_len),
        }
    }

    /// A copy of everything the sink has consumed so far.
    #[must_use]
    pub fn contents(&self) -> Vec<u8> {
        self.contents.lock().expect("sink mutex is never poisoned").clone()
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = match self.max_write_len {
            Some(max) => max.get().min(buf.len()),
            None => buf.len(),
        };

        self.contents
            .lock()
            .expect("sink mutex is never poisoned")
            .extend_from_slice(&buf[..n]);

        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A drain sink that rejects every write.
#[derive(Debug)]
pub struct FailingSink;

impl Write for FailingSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "the sink rejects all content"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
