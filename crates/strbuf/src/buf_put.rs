// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! We separate out the append operations for ease of maintenance.

use crate::StrBuf;
use crate::error::Result;

impl StrBuf<'_> {
    /// Appends a slice of bytes to the buffer.
    ///
    /// Accepts anything that exposes bytes, including string slices -
    /// content is not required to be valid UTF-8 and may contain embedded
    /// zero bytes.
    ///
    /// # Example
    ///
    /// ```
    /// use strbuf::StrBuf;
    ///
    /// let mut buf = StrBuf::new();
    ///
    /// buf.put_slice("Hello, ")?;
    /// buf.put_slice(b"world!")?;
    ///
    /// assert_eq!(buf.as_bytes(), b"Hello, world!");
    /// # Ok::<(), strbuf::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::IllegalState`][1] on a finished or faulted
    /// buffer, with [`ErrorKind::OutOfRoom`][2] when a fixed buffer has no
    /// room left, and with [`ErrorKind::AllocationFailure`][3] or
    /// [`ErrorKind::StreamFailure`][4] when making room by growing or
    /// draining fails. Any failure leaves the buffer faulted; content that
    /// fit before the failure remains appended.
    ///
    /// [1]: crate::ErrorKind::IllegalState
    /// [2]: crate::ErrorKind::OutOfRoom
    /// [3]: crate::ErrorKind::AllocationFailure
    /// [4]: crate::ErrorKind::StreamFailure
    pub fn put_slice(&mut self, bytes: impl AsRef<[u8]>) -> Result<()> {
        self.append_bytes(bytes.as_ref())
    }

    /// Appends a single byte to the buffer.
    ///
    /// # Errors
    ///
    /// Fails under the same conditions as [`put_slice()`][Self::put_slice].
    pub fn put_byte(&mut self, byte: u8) -> Result<()> {
        self.append_bytes(&[byte])
    }

    /// Replaces the buffer's content with the given bytes.
    ///
    /// The buffer is cleared first, which also forgets a finished or faulted
    /// state, so this works as a fresh start from any state.
    ///
    /// # Example
    ///
    /// ```
    /// use strbuf::StrBuf;
    ///
    /// let mut buf = StrBuf::new();
    ///
    /// buf.put_slice("draft")?;
    /// buf.finish()?;
    ///
    /// buf.set_content("final")?;
    ///
    /// assert_eq!(buf.as_bytes(), b"final");
    /// # Ok::<(), strbuf::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Fails under the same conditions as [`put_slice()`][Self::put_slice],
    /// except that finished and faulted states are cleared rather than
    /// rejected.
    pub fn set_content(&mut self, bytes: impl AsRef<[u8]>) -> Result<()> {
        self.clear();
        self.append_bytes(bytes.as_ref())
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use crate::{ErrorKind, StrBuf};

    #[test]
    fn bytes_and_strings_append_alike() {
        let mut buf = StrBuf::new();

        buf.put_slice("abc").unwrap();
        buf.put_slice(b"\0def").unwrap();
        buf.put_byte(b'!').unwrap();

        assert_eq!(buf.as_bytes(), b"abc\0def!");
        assert_eq!(buf.len(), 8);
    }

    #[test]
    fn empty_append_still_counts_as_a_write() {
        let mut buf = StrBuf::new();

        buf.put_slice("").unwrap();

        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), 0);
    }

    #[test]
    fn set_content_replaces_existing_content() {
        let mut buf = StrBuf::new();

        buf.put_slice("a rather long first draft").unwrap();
        buf.set_content("short").unwrap();

        assert_eq!(buf.as_bytes(), b"short");
        assert_eq!(buf.len(), 5);
    }

    #[test]
    fn set_content_recovers_a_faulted_buffer() {
        let mut scratch = [0_u8; 4];
        let mut buf = StrBuf::fixed(&mut scratch);

        let e = buf.put_slice("too much content").unwrap_err();
        assert_eq!(e.kind(), ErrorKind::OutOfRoom);
        assert_eq!(buf.last_error(), Some(ErrorKind::OutOfRoom));

        buf.set_content("ok").unwrap();

        assert_eq!(buf.last_error(), None);
        assert_eq!(buf.as_bytes(), b"ok");
    }
}
