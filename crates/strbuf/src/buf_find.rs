// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Content predicates. These are read-only: they inspect the logically
//! valid content in any state, never fail, and never touch the state
//! machine.

use bstr::ByteSlice;

use crate::StrBuf;

impl StrBuf<'_> {
    /// Whether the content begins with the given byte pattern.
    ///
    /// True only if the buffer holds at least `pattern.len()` bytes and
    /// every one of them matches. An empty pattern is trivially a prefix.
    ///
    /// # Example
    ///
    /// ```
    /// use strbuf::StrBuf;
    ///
    /// let mut buf = StrBuf::new();
    /// buf.put_slice("abcd")?;
    ///
    /// assert!(buf.starts_with("abc"));
    /// assert!(!buf.starts_with("bcd"));
    /// # Ok::<(), strbuf::Error>(())
    /// ```
    #[must_use]
    pub fn starts_with(&self, pattern: impl AsRef<[u8]>) -> bool {
        self.as_bytes().starts_with(pattern.as_ref())
    }

    /// Whether the content ends with the given byte pattern.
    ///
    /// A buffer shorter than the pattern does not match; no bytes outside
    /// the logical content are inspected.
    #[must_use]
    pub fn ends_with(&self, pattern: impl AsRef<[u8]>) -> bool {
        self.as_bytes().ends_with(pattern.as_ref())
    }

    /// Whether the given byte pattern occurs anywhere in the content.
    ///
    /// The search is bounded by the logical length, not by a terminator, so
    /// content with embedded zero bytes is searched in full. An empty
    /// pattern is trivially contained, matching substring-search semantics.
    ///
    /// # Example
    ///
    /// ```
    /// use strbuf::StrBuf;
    ///
    /// let mut buf = StrBuf::new();
    /// buf.put_slice("abcd")?;
    ///
    /// assert!(buf.contains("bc"));
    /// assert!(!buf.contains("xxx"));
    /// # Ok::<(), strbuf::Error>(())
    /// ```
    #[must_use]
    pub fn contains(&self, pattern: impl AsRef<[u8]>) -> bool {
        self.as_bytes().contains_str(pattern.as_ref())
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use crate::StrBuf;

    fn filled(content: &str) -> StrBuf<'static> {
        let mut buf = StrBuf::new();
        buf.put_slice(content).unwrap();
        buf
    }

    #[test]
    fn prefix_matching() {
        let buf = filled("abcd");

        assert!(buf.starts_with("abc"));
        assert!(buf.starts_with("abcd"));
        assert!(buf.starts_with(""));
        assert!(!buf.starts_with("abcde"));
        assert!(!buf.starts_with("bcd"));

        let xabcd = filled("xabcd");
        assert!(!xabcd.starts_with("abc"));
    }

    #[test]
    fn empty_buffer_has_no_nonempty_prefix() {
        let buf = StrBuf::new();

        assert!(!buf.starts_with("a"));
        assert!(buf.starts_with(""));
    }

    #[test]
    fn suffix_matching() {
        let buf = filled("abcd");

        assert!(buf.ends_with("bcd"));
        assert!(buf.ends_with("abcd"));
        assert!(buf.ends_with(""));
        assert!(!buf.ends_with("abc"));

        let abcdx = filled("abcdx");
        assert!(!abcdx.ends_with("bcd"));
    }

    #[test]
    fn suffix_shorter_buffer_never_matches() {
        let buf = filled("cd");

        assert!(!buf.ends_with("abcd"));
    }

    #[test]
    fn substring_matching() {
        let buf = filled("abcd");

        assert!(buf.contains("abc"));
        assert!(buf.contains("bcd"));
        assert!(buf.contains("bc"));
        assert!(buf.contains("abcd"));
        assert!(!buf.contains("xxx"));
        assert!(!buf.contains("abcde"));
    }

    #[test]
    fn empty_pattern_is_trivially_contained() {
        assert!(filled("abcd").contains(""));
        assert!(StrBuf::new().contains(""));
    }

    #[test]
    fn empty_buffer_contains_no_nonempty_pattern() {
        let buf = StrBuf::new();

        assert!(!buf.contains("a"));
    }

    #[test]
    fn embedded_zero_bytes_are_ordinary_content() {
        let mut buf = StrBuf::new();
        buf.put_slice(b"ab\0cd").unwrap();

        assert!(buf.contains(b"\0c"));
        assert!(buf.contains(b"b\0"));
        assert!(!buf.contains(b"\0\0"));
    }

    #[test]
    fn predicates_work_in_every_state() {
        let mut buf = filled("  abcd  ");

        // Unfinished content is searchable.
        assert!(buf.contains("abcd"));

        buf.finish().unwrap();
        assert!(buf.starts_with("  ab"));

        // A faulted buffer still answers queries over its frozen content.
        let e = buf.put_slice("x").unwrap_err();
        assert_eq!(e.kind(), crate::ErrorKind::IllegalState);
        assert!(buf.ends_with("d  "));
        assert!(buf.last_error().is_some());
    }
}
