// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;
use std::io;

use smallvec::SmallVec;
use tracing::{Level, event};

use crate::constants::MAX_INLINE_SECTIONS;
use crate::drain::{DrainMode, DrainState};
use crate::error::{Error, ErrorKind, Result};
use crate::storage::Storage;

/// The lifecycle state of a [`StrBuf`].
///
/// Every operation is gated on this state, so illegal calls are rejected by
/// an exhaustive match instead of a collection of ad hoc flag tests.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    /// No content and no write has happened since creation or the last clear.
    Empty,

    /// At least one write has been accepted; content is still mutable.
    Appending,

    /// Content is frozen for read access until the buffer is cleared.
    Finished,

    /// A mutation failed. The fault is sticky: every further mutation is
    /// rejected with [`ErrorKind::IllegalState`] until the buffer is
    /// cleared.
    Faulted(ErrorKind),
}

/// A state-tracked, growable string/byte buffer.
///
/// Content is assembled by appending and consumed after [`finish()`] freezes
/// it. The buffer tracks its own lifecycle (`empty -> appending -> finished`,
/// with a sticky fault state on failure) and every operation is checked
/// against that lifecycle, so a misused buffer reports errors instead of
/// corrupting content.
///
/// # Storage ownership
///
/// A buffer either owns its storage (created via [`new()`] or
/// [`with_capacity()`], or adopted via [`attach()`]) or borrows a
/// caller-supplied slice (created via [`fixed()`] or [`fixed_extendable()`]).
/// Borrowed storage is never reallocated or released; when a growable buffer
/// outgrows a borrowed slice, the content is copied into fresh owned storage
/// and the slice plays no further part. [`detach()`] transfers owned storage
/// to the caller and resets the buffer.
///
/// Growable storage extends to the next power of two of the required
/// capacity (at least 16 bytes), always keeping one slot in reserve for the
/// terminator byte that [`finish()`] places behind the content.
///
/// # Draining
///
/// An optional drain sink ([`set_drain()`]) turns the buffer into a staging
/// area: when the buffer runs out of room, and at finish, buffered content
/// is flushed to the sink instead of accumulating. [`DrainMode::SectionEnd`]
/// defers flushing to section boundaries; see [`open_section()`].
///
/// # Example
///
/// ```
/// use strbuf::StrBuf;
///
/// let mut buf = StrBuf::new();
///
/// buf.put_slice("Hello, ")?;
/// buf.put_slice("world!")?;
/// buf.finish()?;
///
/// assert_eq!(buf.as_bytes(), b"Hello, world!");
/// # Ok::<(), strbuf::Error>(())
/// ```
///
/// # Thread safety
///
/// The buffer is single-owner: it can be sent to another thread but provides
/// no internal locking for shared mutation.
///
/// [`new()`]: Self::new
/// [`with_capacity()`]: Self::with_capacity
/// [`fixed()`]: Self::fixed
/// [`fixed_extendable()`]: Self::fixed_extendable
/// [`attach()`]: Self::attach
/// [`detach()`]: Self::detach
/// [`finish()`]: Self::finish
/// [`set_drain()`]: Self::set_drain
/// [`open_section()`]: Self::open_section
pub struct StrBuf<'s> {
    storage: Storage<'s>,

    state: State,

    /// Start offsets of the currently open sections, innermost last.
    ///
    /// Content-shifting operations are rejected while this is non-empty,
    /// as they would invalidate the recorded offsets.
    sections: SmallVec<[usize; MAX_INLINE_SECTIONS]>,

    drain: Option<DrainState>,

    /// Whether the terminator byte counts toward the logical length once
    /// the buffer is finished.
    include_terminator: bool,
}

impl<'s> StrBuf<'s> {
    /// Creates a growable buffer that owns its storage.
    ///
    /// No storage is allocated until the first append.
    #[must_use]
    pub const fn new() -> Self {
        Self::from_storage(Storage::owned(true))
    }

    /// Creates a growable buffer with room for at least `capacity` content
    /// bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_storage(Storage::owned_with_capacity(capacity))
    }

    /// Creates a fixed-capacity buffer over caller-supplied storage.
    ///
    /// The buffer writes into `storage` but never grows past it: one slot is
    /// reserved for the terminator, so up to `storage.len() - 1` content
    /// bytes fit and further appends fail with [`ErrorKind::OutOfRoom`].
    ///
    /// # Panics
    ///
    /// Panics if `storage` is empty, as there would be no room for the
    /// terminator slot.
    #[must_use]
    pub fn fixed(storage: &'s mut [u8]) -> Self {
        assert!(!storage.is_empty(), "fixed storage must have room for the terminator slot");

        Self::from_storage(Storage::borrowed(storage, false))
    }

    /// Creates a growable buffer that starts on caller-supplied storage.
    ///
    /// While content fits, it is written into `storage`. The first append
    /// that does not fit copies the content into fresh owned storage and the
    /// caller's slice is no longer touched.
    ///
    /// # Panics
    ///
    /// Panics if `storage` is empty, as there would be no room for the
    /// terminator slot.
    #[must_use]
    pub fn fixed_extendable(storage: &'s mut [u8]) -> Self {
        assert!(!storage.is_empty(), "fixed storage must have room for the terminator slot");

        Self::from_storage(Storage::borrowed(storage, true))
    }

    const fn from_storage(storage: Storage<'s>) -> Self {
        Self {
            storage,
            state: State::Empty,
            sections: SmallVec::new_const(),
            drain: None,
            include_terminator: false,
        }
    }

    /// The buffer's content: frozen once finished, in-progress otherwise.
    ///
    /// The terminator byte is not part of the content unless
    /// [`set_include_terminator()`][Self::set_include_terminator] asked for
    /// it and the buffer is finished.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.storage.content()
    }

    /// Number of logically valid content bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Whether the buffer holds no content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// How many content bytes the current storage can hold.
    ///
    /// This excludes the slot reserved for the terminator. A growable buffer
    /// extends its capacity on demand; a fixed buffer never does.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage.usable_capacity()
    }

    /// Whether the buffer may extend its storage.
    #[must_use]
    pub fn is_growable(&self) -> bool {
        self.storage.is_growable()
    }

    /// Whether [`finish()`][Self::finish] has frozen the content.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self.state, State::Finished)
    }

    /// The kind of the mutation failure the buffer is stuck on, if any.
    ///
    /// [`clear()`][Self::clear] resets the fault.
    #[must_use]
    pub const fn last_error(&self) -> Option<ErrorKind> {
        match self.state {
            State::Faulted(kind) => Some(kind),
            _ => None,
        }
    }

    /// Whether at least one section is open.
    #[must_use]
    pub fn in_section(&self) -> bool {
        !self.sections.is_empty()
    }

    /// How many sections are currently open.
    #[must_use]
    pub fn section_depth(&self) -> usize {
        self.sections.len()
    }

    /// The flush mode of the attached drain sink, if any.
    #[must_use]
    pub fn drain_mode(&self) -> Option<DrainMode> {
        self.drain.as_ref().map(DrainState::mode)
    }

    /// Whether the terminator byte will count toward the logical length at
    /// finish time.
    #[must_use]
    pub const fn includes_terminator(&self) -> bool {
        self.include_terminator
    }

    /// Controls whether the terminator byte counts toward the logical length
    /// once the buffer is finished.
    ///
    /// Takes effect at the next [`finish()`][Self::finish].
    pub fn set_include_terminator(&mut self, include: bool) {
        self.include_terminator = include;
    }

    /// Attaches a drain sink that receives buffered content at the flush
    /// points selected by `mode`.
    ///
    /// While a sink is attached, a full buffer prefers flushing over growing
    /// and left trims are rejected (already-drained bytes cannot be
    /// un-sent).
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::IllegalState`] unless the buffer is empty,
    /// unfinished, unfaulted, and outside of any section. The rejection
    /// leaves the buffer state unchanged.
    pub fn set_drain(&mut self, sink: impl io::Write + Send + 'static, mode: DrainMode) -> Result<()> {
        if self.state != State::Empty || !self.storage.is_empty() || !self.sections.is_empty() {
            return Err(Error::illegal_state("a drain sink can only be attached to a pristine buffer"));
        }

        self.drain = Some(DrainState::new(Box::new(sink), mode));

        Ok(())
    }

    /// Resets the buffer to empty and mutable.
    ///
    /// Content length returns to zero, open sections are discarded, and any
    /// finished or faulted state is forgotten. Storage, capacity, and the
    /// drain configuration are retained.
    pub fn clear(&mut self) {
        self.storage.truncate(0);
        self.sections.clear();
        self.state = State::Empty;
    }

    /// Freezes the content for read access.
    ///
    /// If a drain sink is attached, all remaining buffered content is
    /// flushed to it first. The terminator byte is written behind the
    /// content (and counted, if so configured). Once finished, the buffer is
    /// read-only until [`clear()`][Self::clear].
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::IllegalState`] if the buffer is already
    /// finished, faulted, or still inside a section; with
    /// [`ErrorKind::StreamFailure`] if the drain sink rejects the final
    /// flush; with [`ErrorKind::AllocationFailure`] if the terminator slot
    /// requires growth that cannot be satisfied. All of these leave the
    /// buffer faulted.
    pub fn finish(&mut self) -> Result<()> {
        self.gate_mutable()?;

        if !self.sections.is_empty() {
            return Err(self.fail(Error::illegal_state("cannot finish while a section is open")));
        }

        if self.drain.is_some() && !self.storage.is_empty() {
            if let Err(e) = self.flush_all_buffered() {
                return Err(self.fail(e));
            }
        }

        if !self.storage.has_terminator_room() {
            if self.storage.is_growable() {
                if let Err(e) = self.storage.grow_to_fit(0) {
                    return Err(self.fail(e));
                }
            } else {
                return Err(self.fail(Error::out_of_room("no room is left for the terminator")));
            }
        }

        self.storage.write_terminator(self.include_terminator);
        self.state = State::Finished;

        Ok(())
    }

    /// Opens a section at the current end of content.
    ///
    /// Sections nest. While any section is open, operations that would shift
    /// recorded start offsets (the trims) are rejected, and
    /// [`DrainMode::SectionEnd`] defers out-of-section flushing.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::IllegalState`] on a finished or faulted
    /// buffer, leaving the buffer faulted.
    pub fn open_section(&mut self) -> Result<()> {
        self.gate_mutable()?;

        self.sections.push(self.storage.len());

        Ok(())
    }

    /// Closes the innermost open section.
    ///
    /// With a [`DrainMode::SectionEnd`] sink attached, the section's bytes
    /// are flushed to the sink and removed from the buffer; content written
    /// before the section stays buffered until the next flush point.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::IllegalState`] if no section is open or the
    /// buffer is finished or faulted, and with [`ErrorKind::StreamFailure`]
    /// if the sink rejects the section content. Failures leave the buffer
    /// faulted.
    pub fn close_section(&mut self) -> Result<()> {
        self.gate_mutable()?;

        let Some(start) = self.sections.pop() else {
            return Err(self.fail(Error::illegal_state("no section is open")));
        };

        let drains_on_close = self.drain.as_ref().is_some_and(|d| d.mode() == DrainMode::SectionEnd);

        if drains_on_close && self.storage.len() > start {
            if let Err(e) = self.flush_from(start) {
                return Err(self.fail(e));
            }

            self.storage.truncate(start);
        }

        Ok(())
    }

    /// Replaces the buffer's storage with caller-supplied storage.
    ///
    /// The first `len` bytes of `storage` become the content;
    /// `storage.capacity()` becomes the capacity. The previously owned
    /// storage is released, open sections are discarded, and any finished or
    /// faulted state is cleared, so attach also doubles as a reset.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::IllegalState`] if the buffer is not growable
    /// and with [`ErrorKind::InvalidArgument`] if `len` exceeds the
    /// initialized length of `storage`. A rejection changes nothing: the
    /// offered storage is dropped and the buffer keeps its state.
    pub fn attach(&mut self, mut storage: Vec<u8>, len: usize) -> Result<()> {
        if !self.storage.is_growable() {
            return Err(Error::illegal_state("storage can only be attached to a growable buffer"));
        }

        if len > storage.len() {
            return Err(Error::invalid_argument("attached length exceeds the initialized storage length"));
        }

        storage.truncate(len);

        event!(Level::DEBUG, message = "caller storage attached", len, capacity = storage.capacity());

        self.sections.clear();
        self.state = if len == 0 { State::Empty } else { State::Appending };
        self.storage.attach_owned(storage);

        Ok(())
    }

    /// Hands the buffer's storage to the caller and resets the buffer.
    ///
    /// The buffer is finished first if it is not already (flushing a drain
    /// sink and placing the terminator as usual). The returned vector's
    /// length is the logical content length and its capacity is the storage
    /// capacity. Afterward the buffer holds fresh zero-length owned storage
    /// and is empty and mutable again.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::IllegalState`] if the buffer is not growable
    /// or if its storage is a borrowed caller slice; these rejections change
    /// nothing. If the implied [`finish()`][Self::finish] fails, its error
    /// propagates, storage is not transferred, and the buffer remains in
    /// whatever state finish left it.
    pub fn detach(&mut self) -> Result<Vec<u8>> {
        if !self.storage.is_growable() {
            return Err(Error::illegal_state("only a growable buffer can be detached"));
        }

        if self.storage.is_borrowed() {
            return Err(Error::illegal_state("caller-supplied storage cannot be detached"));
        }

        if !self.is_finished() {
            self.finish()?;
        }

        let detached = self.storage.take_owned().expect("owned backing was verified above");

        event!(
            Level::DEBUG,
            message = "storage detached",
            len = detached.len(),
            capacity = detached.capacity()
        );

        self.clear();

        Ok(detached)
    }

    /// Appends bytes, making room by draining or growing as configured.
    ///
    /// This is the private workhorse behind the public append operations in
    /// `buf_put.rs`.
    pub(crate) fn append_bytes(&mut self, mut src: &[u8]) -> Result<()> {
        self.gate_mutable()?;

        self.state = State::Appending;

        while !src.is_empty() {
            let room = self.storage.room();

            if room == 0 {
                if let Err(e) = self.make_room(src.len()) {
                    return Err(self.fail(e));
                }

                continue;
            }

            let (chunk, rest) = src.split_at(room.min(src.len()));

            self.storage.append(chunk);
            src = rest;
        }

        Ok(())
    }

    /// Rejects mutation in the finished and faulted states, recording the
    /// rejection as the sticky fault where one is not already present.
    pub(crate) fn gate_mutable(&mut self) -> Result<()> {
        let rejection = match self.state {
            State::Empty | State::Appending => return Ok(()),
            State::Faulted(_) => Error::illegal_state("the buffer holds a sticky fault; clear it before mutating"),
            State::Finished => Error::illegal_state("the buffer is finished; clear it before mutating"),
        };

        Err(self.fail(rejection))
    }

    /// Marks the buffer faulted with the error's kind, unless a fault is
    /// already recorded, and passes the error back for propagation.
    pub(crate) fn fail(&mut self, error: Error) -> Error {
        if !matches!(self.state, State::Faulted(_)) {
            self.state = State::Faulted(error.kind());
        }

        error
    }

    pub(crate) fn has_drain(&self) -> bool {
        self.drain.is_some()
    }

    /// Removes the first `n` content bytes with an in-place shift.
    ///
    /// Only for use from trimming, which has verified that no section
    /// offsets or drained bytes depend on current positions.
    pub(crate) fn discard_leading(&mut self, n: usize) {
        self.storage.remove_prefix(n);
    }

    /// Shrinks the content to at most `keep` bytes.
    pub(crate) fn truncate_content(&mut self, keep: usize) {
        self.storage.truncate(keep);
    }

    /// Makes room for at least one more content byte.
    ///
    /// An attached drain sink is flushed in preference to growing, unless
    /// section-end draining defers the flush; growth is the fallback, and a
    /// buffer that can do neither is out of room.
    fn make_room(&mut self, additional: usize) -> Result<()> {
        if let Some(drain) = &self.drain {
            let deferred = drain.mode() == DrainMode::SectionEnd && !self.sections.is_empty();

            if !deferred && !self.storage.is_empty() {
                return self.flush_all_buffered();
            }
        }

        if self.storage.is_growable() {
            return self.storage.grow_to_fit(additional);
        }

        Err(Error::out_of_room("append exceeds the capacity of a fixed buffer"))
    }

    /// Flushes all buffered content to the drain sink and removes it,
    /// rebasing any recorded section offsets.
    fn flush_all_buffered(&mut self) -> Result<()> {
        let flushed = self.storage.len();

        let Some(drain) = self.drain.as_mut() else {
            return Ok(());
        };

        drain.flush(self.storage.content())?;

        self.storage.remove_prefix(flushed);

        for start in &mut self.sections {
            *start = start.saturating_sub(flushed);
        }

        Ok(())
    }

    /// Flushes the content from `start` to the end to the drain sink,
    /// without removing it.
    fn flush_from(&mut self, start: usize) -> Result<()> {
        let Some(drain) = self.drain.as_mut() else {
            return Ok(());
        };

        drain.flush(&self.storage.content()[start..])
    }
}

impl Default for StrBuf<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StrBuf<'_> {
    #[cfg_attr(test, mutants::skip)] // There is no API contract on the debug representation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrBuf")
            .field("state", &self.state)
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("section_depth", &self.section_depth())
            .field("drain", &self.drain_mode())
            .finish_non_exhaustive()
    }
}
