// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::error::Error as StdError;

/// The result for fallible buffer operations that use the [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

/// The category of a buffer error.
///
/// When a mutation fails, the buffer records the kind of the failure as its
/// sticky fault (readable via [`StrBuf::last_error()`][1]) and the returned
/// [`Error`] reports the same kind via [`Error::kind()`].
///
/// [1]: crate::StrBuf::last_error
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// An argument was inconsistent, e.g. a logical length that exceeds the
    /// initialized length of attached storage.
    ///
    /// Rejections of this kind happen before any state change and never
    /// leave a sticky fault behind.
    InvalidArgument,

    /// The operation is not permitted in the buffer's current state, e.g. a
    /// mutation of a finished buffer, a left trim inside an open section,
    /// or any mutation after a sticky fault.
    IllegalState,

    /// An append exceeded the capacity of a buffer that is not allowed
    /// to grow.
    OutOfRoom,

    /// Extending the buffer's storage failed because the allocator could
    /// not provide the requested capacity.
    AllocationFailure,

    /// The external byte source or drain sink reported an I/O error.
    StreamFailure,
}

/// An error reported by a buffer operation.
///
/// Carries the [`ErrorKind`] describing the failure category, a short
/// description of the rejected operation, and - for allocation and stream
/// failures - the underlying error as its source.
///
/// # Thread safety
///
/// This type is thread-safe.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: &'static str,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub(crate) const fn new(kind: ErrorKind, message: &'static str) -> Self {
        Self {
            kind,
            message,
            source: None,
        }
    }

    pub(crate) fn with_source(kind: ErrorKind, message: &'static str, source: impl StdError + Send + Sync + 'static) -> Self {
        Self {
            kind,
            message,
            source: Some(Box::new(source)),
        }
    }

    pub(crate) const fn invalid_argument(message: &'static str) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub(crate) const fn illegal_state(message: &'static str) -> Self {
        Self::new(ErrorKind::IllegalState, message)
    }

    pub(crate) const fn out_of_room(message: &'static str) -> Self {
        Self::new(ErrorKind::OutOfRoom, message)
    }

    /// The category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }
}
