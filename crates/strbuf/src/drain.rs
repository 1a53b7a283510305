// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;
use std::io::Write;

use tracing::{Level, event};

use crate::error::{Error, ErrorKind, Result};

/// When buffered content is flushed to an attached drain sink.
///
/// A drain sink turns the buffer into a staging area: completed content is
/// pushed to the sink instead of being retained indefinitely. The mode
/// selects the flush points.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DrainMode {
    /// Flush all buffered content whenever the buffer runs out of room,
    /// and flush the remainder when the buffer is finished.
    #[default]
    WhenFull,

    /// Defer flushing while a section is open: each closing section's bytes
    /// are flushed immediately, while content written outside of any section
    /// is retained until the next out-of-section flush point (running out of
    /// room, or finish). Bytes therefore reach the sink in completion order,
    /// not necessarily in buffer order.
    SectionEnd,
}

/// An attached drain sink together with its flush mode.
///
/// This wraps the base buffer behavior rather than being entangled with it:
/// the buffer decides *what* to flush, this type performs the handoff and
/// maps sink failures onto buffer errors.
pub(crate) struct DrainState {
    sink: Box<dyn Write + Send>,
    mode: DrainMode,
}

impl DrainState {
    pub(crate) fn new(sink: Box<dyn Write + Send>, mode: DrainMode) -> Self {
        Self { sink, mode }
    }

    pub(crate) const fn mode(&self) -> DrainMode {
        self.mode
    }

    /// Pushes `content` to the sink in full.
    ///
    /// Partial writes are retried until the sink has consumed every byte; a
    /// sink that reports consuming zero bytes produces a write-zero error.
    /// Any sink failure surfaces as [`ErrorKind::StreamFailure`].
    pub(crate) fn flush(&mut self, content: &[u8]) -> Result<()> {
        self.sink
            .write_all(content)
            .map_err(|e| Error::with_source(ErrorKind::StreamFailure, "drain sink rejected flushed content", e))?;

        event!(Level::TRACE, message = "buffered content drained", bytes = content.len());

        Ok(())
    }
}

impl fmt::Debug for DrainState {
    #[cfg_attr(test, mutants::skip)] // There is no API contract on the debug representation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrainState").field("mode", &self.mode).finish_non_exhaustive()
    }
}
