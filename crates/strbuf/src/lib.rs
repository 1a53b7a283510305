// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! A state-tracked, growable string/byte buffer for assembling and
//! inspecting content.
//!
//! The [`StrBuf`] type is a contiguous byte container that knows where it is
//! in its own lifecycle: content is appended while the buffer is mutable,
//! frozen by [`finish()`], and consumed afterward. A failed mutation leaves
//! a sticky fault behind that rejects further mutation until the buffer is
//! explicitly cleared, so a chain of writes can be checked once at the end
//! without corrupt content slipping through.
//!
//! # Assembling content
//!
//! A buffer created via [`StrBuf::new()`] owns its storage and grows on
//! demand, reserving one slot behind the content for the terminator byte
//! that [`finish()`] places there:
//!
//! ```
//! use strbuf::StrBuf;
//!
//! let mut buf = StrBuf::new();
//!
//! buf.put_slice("Hello, ")?;
//! buf.put_slice("world!")?;
//! buf.finish()?;
//!
//! assert!(buf.is_finished());
//! assert_eq!(buf.as_bytes(), b"Hello, world!");
//! # Ok::<(), strbuf::Error>(())
//! ```
//!
//! Alternatively, a buffer can work over a caller-supplied slice. A
//! [`fixed()`] buffer never outgrows the slice and reports
//! [`ErrorKind::OutOfRoom`] instead; a [`fixed_extendable()`] buffer copies
//! the content into owned storage the first time it no longer fits:
//!
//! ```
//! use strbuf::{ErrorKind, StrBuf};
//!
//! let mut scratch = [0_u8; 8];
//! let mut buf = StrBuf::fixed(&mut scratch);
//!
//! buf.put_slice("1234567")?;
//!
//! let e = buf.put_byte(b'8').unwrap_err();
//! assert_eq!(e.kind(), ErrorKind::OutOfRoom);
//! # Ok::<(), strbuf::Error>(())
//! ```
//!
//! # Transferring storage
//!
//! Ownership of the backing storage is explicit and checked. A caller can
//! hand a buffer its storage via [`attach()`] and take it back - content,
//! length, and capacity together - via [`detach()`]:
//!
//! ```
//! use strbuf::StrBuf;
//!
//! let mut buf = StrBuf::new();
//!
//! let mut storage = Vec::with_capacity(4);
//! storage.extend_from_slice(b"abc");
//!
//! buf.attach(storage, 3)?;
//! buf.put_slice("def")?;
//!
//! let detached = buf.detach()?;
//!
//! assert_eq!(detached, b"abcdef");
//! assert!(buf.is_empty());
//! # Ok::<(), strbuf::Error>(())
//! ```
//!
//! # Derived text operations
//!
//! The buffer carries the text operations its content is usually inspected
//! with - whitespace trimming, prefix/suffix/substring predicates, and bulk
//! loading from any [`std::io::Read`] source:
//!
//! ```
//! use strbuf::StrBuf;
//!
//! let mut buf = StrBuf::new();
//!
//! buf.set_content("  request GET /index  ")?;
//! buf.trim()?;
//!
//! assert!(buf.starts_with("request"));
//! assert!(buf.contains("GET"));
//! assert!(buf.ends_with("/index"));
//! # Ok::<(), strbuf::Error>(())
//! ```
//!
//! [`load_from()`][StrBuf::load_from] fills a buffer from any
//! [`std::io::Read`] source in one call, finishing it when the source is
//! exhausted.
//!
//! # Draining and sections
//!
//! For content that should flow onward instead of accumulating, a drain
//! sink (any `std::io::Write`) can be attached via [`set_drain()`]. The
//! buffer then flushes completed content to the sink - either whenever it
//! runs out of room ([`DrainMode::WhenFull`]) or at section boundaries
//! ([`DrainMode::SectionEnd`], together with [`open_section()`] /
//! [`close_section()`]).
//!
//! # Testing
//!
//! Behind the `test-util` Cargo feature, this crate exposes deterministic
//! stream collaborators for exercising corner cases of buffer-consuming
//! code, such as chunk-size independence of stream loading:
//!
//! * `ChunkReader` - a byte source that fragments its data into chunks of a
//!   fixed size. You can go down to as low as 1 byte per read!
//! * `FailingReader` - a byte source that fails after yielding a prefix.
//! * `SharedSink` - an inspectable drain sink, optionally consuming only a
//!   few bytes per write.
//! * `FailingSink` - a drain sink that rejects everything.
//!
//! [`finish()`]: StrBuf::finish
//! [`fixed()`]: StrBuf::fixed
//! [`fixed_extendable()`]: StrBuf::fixed_extendable
//! [`attach()`]: StrBuf::attach
//! [`detach()`]: StrBuf::detach
//! [`set_drain()`]: StrBuf::set_drain
//! [`open_section()`]: StrBuf::open_section
//! [`close_section()`]: StrBuf::close_section

mod buf;
mod buf_find;
mod buf_load;
mod buf_put;
mod buf_trim;
mod constants;
mod drain;
mod error;
mod storage;

pub use buf::StrBuf;
pub use constants::MAX_INLINE_SECTIONS;
pub use drain::DrainMode;
pub use error::{Error, ErrorKind, Result};

#[cfg(any(test, feature = "test-util"))]
mod testing;

#[cfg(any(test, feature = "test-util"))]
pub use testing::{ChunkReader, FailingReader, FailingSink, SharedSink};
