// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Bulk loading from a byte stream.

use std::io::{self, Read};

use crate::StrBuf;
use crate::constants::READ_CHUNK_LEN;
use crate::error::{Error, ErrorKind, Result};

impl StrBuf<'_> {
    /// Replaces the buffer's content with everything the source yields,
    /// then finishes the buffer.
    ///
    /// The source is read in fixed-size chunks until it reports end of
    /// input; the chunk size is an internal constant and has no observable
    /// effect on the result. Interrupted reads are retried, as is
    /// conventional for [`Read`] loops.
    ///
    /// # Example
    ///
    /// ```
    /// use std::io::Cursor;
    ///
    /// use strbuf::StrBuf;
    ///
    /// let mut buf = StrBuf::new();
    ///
    /// buf.load_from(Cursor::new("abcdefg\nhijklmn"))?;
    ///
    /// assert!(buf.is_finished());
    /// assert_eq!(buf.as_bytes(), b"abcdefg\nhijklmn");
    /// # Ok::<(), strbuf::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// A read failure surfaces as [`ErrorKind::StreamFailure`] and leaves
    /// the buffer faulted but still holding every byte that was appended
    /// before the failure - the caller decides whether partial content is
    /// usable after clearing the fault. Append failures (e.g.
    /// [`ErrorKind::OutOfRoom`] on a fixed buffer that the source outgrows)
    /// propagate unchanged.
    pub fn load_from(&mut self, mut source: impl Read) -> Result<()> {
        self.clear();

        let mut chunk = [0_u8; READ_CHUNK_LEN];

        loop {
            match source.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => self.append_bytes(&chunk[..n])?,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    return Err(self.fail(Error::with_source(
                        ErrorKind::StreamFailure,
                        "reading from the byte source failed",
                        e,
                    )));
                }
            }
        }

        self.finish()
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::num::NonZero;

    use new_zealand::nz;
    use rstest::rstest;

    use crate::testing::{ChunkReader, FailingReader};
    use crate::{ErrorKind, StrBuf};

    const TEST_DATA: &[u8] = b"abcdefg\nhijklmn";

    #[rstest]
    #[case(nz!(1))]
    #[case(nz!(7))]
    #[case(nz!(1024))]
    fn loaded_content_is_chunk_size_independent(#[case] chunk_len: NonZero<usize>) {
        let mut buf = StrBuf::new();

        buf.load_from(ChunkReader::new(TEST_DATA, chunk_len)).unwrap();

        assert!(buf.is_finished());
        assert_eq!(buf.as_bytes(), TEST_DATA);
        assert_eq!(buf.len(), TEST_DATA.len());
    }

    #[test]
    fn loading_replaces_previous_content() {
        let mut buf = StrBuf::new();
        buf.put_slice("stale").unwrap();

        buf.load_from(Cursor::new(b"fresh")).unwrap();

        assert_eq!(buf.as_bytes(), b"fresh");
    }

    #[test]
    fn loading_an_empty_source_finishes_empty() {
        let mut buf = StrBuf::new();

        buf.load_from(Cursor::new(b"")).unwrap();

        assert!(buf.is_finished());
        assert!(buf.is_empty());
    }

    #[test]
    fn read_failure_keeps_partial_content() {
        let mut buf = StrBuf::new();

        let e = buf.load_from(FailingReader::new(b"partial ".as_slice())).unwrap_err();

        assert_eq!(e.kind(), ErrorKind::StreamFailure);
        assert_eq!(buf.last_error(), Some(ErrorKind::StreamFailure));
        assert!(!buf.is_finished());

        // No silent data loss: the bytes read before the failure are there,
        // but the caller had to check the result to trust them.
        assert_eq!(buf.as_bytes(), b"partial ");

        let e = buf.put_slice("more").unwrap_err();
        assert_eq!(e.kind(), ErrorKind::IllegalState);
    }

    #[test]
    fn source_larger_than_a_fixed_buffer_is_an_overflow() {
        let mut scratch = [0_u8; 8];
        let mut buf = StrBuf::fixed(&mut scratch);

        let e = buf.load_from(Cursor::new(b"far too much content")).unwrap_err();

        assert_eq!(e.kind(), ErrorKind::OutOfRoom);
        assert_eq!(buf.last_error(), Some(ErrorKind::OutOfRoom));
    }

    #[test]
    fn loading_a_finished_buffer_starts_over() {
        let mut buf = StrBuf::new();
        buf.load_from(Cursor::new(b"first")).unwrap();

        buf.load_from(Cursor::new(b"second")).unwrap();

        assert_eq!(buf.as_bytes(), b"second");
    }
}
