// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Whitespace trimming. The trims shift or shrink content in place, so they
//! carry stricter preconditions than the append operations: recorded section
//! offsets and already-drained bytes must not be invalidated.

use crate::StrBuf;
use crate::error::{Error, Result};

impl StrBuf<'_> {
    /// Removes the maximal run of leading ASCII whitespace from the content.
    ///
    /// The remaining bytes are shifted down in place; no reallocation
    /// happens. Applying this twice in a row is equivalent to applying it
    /// once, and trimming an empty buffer is a successful no-op.
    ///
    /// # Example
    ///
    /// ```
    /// use strbuf::StrBuf;
    ///
    /// let mut buf = StrBuf::new();
    /// buf.put_slice("  abc def  ")?;
    ///
    /// buf.trim_start()?;
    ///
    /// assert_eq!(buf.as_bytes(), b"abc def  ");
    /// # Ok::<(), strbuf::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::IllegalState`][1] on a finished or faulted
    /// buffer, while a section is open (the shift would invalidate recorded
    /// section offsets), or while a drain sink is attached (bytes that were
    /// already drained cannot be un-sent). Failures leave the buffer
    /// faulted.
    ///
    /// [1]: crate::ErrorKind::IllegalState
    pub fn trim_start(&mut self) -> Result<()> {
        self.gate_trimmable()?;

        let leading = self.as_bytes().iter().take_while(|b| b.is_ascii_whitespace()).count();

        self.discard_leading(leading);

        Ok(())
    }

    /// Removes the maximal run of trailing ASCII whitespace from the
    /// content.
    ///
    /// # Errors
    ///
    /// Fails under the same conditions as [`trim_start()`][Self::trim_start].
    pub fn trim_end(&mut self) -> Result<()> {
        self.gate_trimmable()?;

        let content = self.as_bytes();
        let trailing = content.iter().rev().take_while(|b| b.is_ascii_whitespace()).count();
        let keep = content.len() - trailing;

        self.truncate_content(keep);

        Ok(())
    }

    /// Removes both leading and trailing ASCII whitespace.
    ///
    /// This is the trailing trim followed by the leading trim, not an atomic
    /// operation: if the trailing trim fails, the leading trim is not
    /// attempted and the buffer is left as the failing step left it.
    ///
    /// # Example
    ///
    /// ```
    /// use strbuf::StrBuf;
    ///
    /// let mut buf = StrBuf::new();
    /// buf.put_slice("  abc def  ")?;
    ///
    /// buf.trim()?;
    ///
    /// assert_eq!(buf.as_bytes(), b"abc def");
    /// # Ok::<(), strbuf::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Fails under the same conditions as [`trim_start()`][Self::trim_start].
    pub fn trim(&mut self) -> Result<()> {
        self.trim_end()?;
        self.trim_start()
    }

    /// Rejects trimming in states where a content shift would lose or
    /// corrupt information.
    fn gate_trimmable(&mut self) -> Result<()> {
        self.gate_mutable()?;

        if self.in_section() {
            return Err(self.fail(Error::illegal_state("cannot trim while a section is open")));
        }

        if self.has_drain() {
            return Err(self.fail(Error::illegal_state("cannot trim content that may already have been drained")));
        }

        Ok(())
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use crate::drain::DrainMode;
    use crate::testing::SharedSink;
    use crate::{ErrorKind, StrBuf};

    #[test]
    fn trimming_an_empty_buffer_is_a_no_op() {
        let mut buf = StrBuf::new();

        buf.trim_start().unwrap();
        buf.trim_end().unwrap();
        buf.trim().unwrap();

        assert_eq!(buf.len(), 0);
    }

    #[test]
    fn content_without_leading_whitespace_is_untouched() {
        let mut buf = StrBuf::new();
        buf.put_slice("abc def").unwrap();

        buf.trim_start().unwrap();

        assert_eq!(buf.as_bytes(), b"abc def");
        assert_eq!(buf.len(), 7);
    }

    #[test]
    fn only_leading_whitespace_is_removed() {
        let mut buf = StrBuf::new();
        buf.put_slice("  abc def  ").unwrap();

        buf.trim_start().unwrap();

        assert_eq!(buf.as_bytes(), b"abc def  ");
        assert_eq!(buf.len(), 9);
    }

    #[test]
    fn trim_start_is_idempotent() {
        let mut buf = StrBuf::new();
        buf.put_slice("\t\n  abc ").unwrap();

        buf.trim_start().unwrap();
        let after_once = buf.as_bytes().to_vec();

        buf.trim_start().unwrap();

        assert_eq!(buf.as_bytes(), after_once.as_slice());
        assert_eq!(buf.as_bytes(), b"abc ");
    }

    #[test]
    fn all_whitespace_content_trims_to_empty() {
        let mut buf = StrBuf::new();
        buf.put_slice("   ").unwrap();

        buf.trim_start().unwrap();

        assert_eq!(buf.len(), 0);
        assert_eq!(buf.as_bytes(), b"");
    }

    #[test]
    fn both_ends_are_trimmed() {
        let mut buf = StrBuf::new();
        buf.put_slice("  abc def  ").unwrap();

        buf.trim().unwrap();

        assert_eq!(buf.as_bytes(), b"abc def");
        assert_eq!(buf.len(), 7);
    }

    #[test]
    fn trailing_whitespace_is_removed() {
        let mut buf = StrBuf::new();
        buf.put_slice("abc def  \t\n").unwrap();

        buf.trim_end().unwrap();

        assert_eq!(buf.as_bytes(), b"abc def");
    }

    #[test]
    fn trimming_inside_a_section_is_rejected() {
        let mut buf = StrBuf::new();
        buf.put_slice("  abc").unwrap();
        buf.open_section().unwrap();

        let e = buf.trim_start().unwrap_err();

        assert_eq!(e.kind(), ErrorKind::IllegalState);
        assert_eq!(buf.last_error(), Some(ErrorKind::IllegalState));
        assert_eq!(buf.as_bytes(), b"  abc");
    }

    #[test]
    fn trimming_with_a_drain_sink_is_rejected() {
        let mut buf = StrBuf::new();
        buf.set_drain(SharedSink::new(), DrainMode::WhenFull).unwrap();
        buf.put_slice("  abc").unwrap();

        let e = buf.trim_start().unwrap_err();

        assert_eq!(e.kind(), ErrorKind::IllegalState);
    }

    #[test]
    fn trimming_a_finished_buffer_is_rejected() {
        let mut buf = StrBuf::new();
        buf.put_slice("  abc  ").unwrap();
        buf.finish().unwrap();

        let e = buf.trim().unwrap_err();

        assert_eq!(e.kind(), ErrorKind::IllegalState);
        assert_eq!(buf.as_bytes(), b"  abc  ");
    }

    #[test]
    fn failed_both_ends_trim_leaves_the_failing_state() {
        let mut buf = StrBuf::new();
        buf.put_slice("  abc  ").unwrap();
        buf.open_section().unwrap();

        // The trailing trim fails first; nothing is trimmed and the buffer
        // is faulted by that failing step.
        let e = buf.trim().unwrap_err();

        assert_eq!(e.kind(), ErrorKind::IllegalState);
        assert_eq!(buf.as_bytes(), b"  abc  ");
        assert_eq!(buf.last_error(), Some(ErrorKind::IllegalState));
    }
}
