// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::mem;

use tracing::{Level, event};

use crate::constants::MIN_EXTEND_CAPACITY;
use crate::error::{Error, ErrorKind, Result};

/// The backing memory of a buffer, tagged by ownership.
///
/// Owned storage belongs to the buffer and may be reallocated when the buffer
/// grows. Borrowed storage was supplied by the caller - the buffer writes
/// into it but never reallocates or releases it. Growth past borrowed
/// capacity copies the content into fresh owned storage and flips the tag,
/// leaving the caller's slice untouched from that point on.
#[derive(Debug)]
enum Backing<'s> {
    Owned(Vec<u8>),
    Borrowed(&'s mut [u8]),
}

/// Contiguous byte storage with a reserved trailing terminator slot.
///
/// Once any capacity exists, `len + 1 <= raw capacity` holds so that a
/// terminator byte can always be placed behind the content. Auto-growing
/// storage starts with no capacity at all; the first append allocates.
#[derive(Debug)]
pub(crate) struct Storage<'s> {
    backing: Backing<'s>,

    /// Number of logically valid content bytes.
    ///
    /// For owned backing this tracks the vector length, except after the
    /// terminator has been written: the terminator byte lives inside the
    /// vector but is only counted here when terminator accounting asks
    /// for it.
    len: usize,

    growable: bool,
}

impl Storage<'static> {
    /// Owned storage with no initial capacity; allocation is deferred to the
    /// first append.
    pub(crate) const fn owned(growable: bool) -> Self {
        Self {
            backing: Backing::Owned(Vec::new()),
            len: 0,
            growable,
        }
    }

    /// Owned growable storage with room for at least `min_usable` content
    /// bytes plus the terminator slot.
    pub(crate) fn owned_with_capacity(min_usable: usize) -> Self {
        let raw = grown_capacity(min_usable.checked_add(1).expect("buffer capacity cannot exceed usize::MAX"));

        Self {
            backing: Backing::Owned(Vec::with_capacity(raw)),
            len: 0,
            growable: true,
        }
    }
}

impl<'s> Storage<'s> {
    /// Storage over a caller-supplied slice. The slice is never reallocated;
    /// if `growable` is set, growth copies into owned storage instead.
    pub(crate) const fn borrowed(slice: &'s mut [u8], growable: bool) -> Self {
        Self {
            backing: Backing::Borrowed(slice),
            len: 0,
            growable,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) const fn is_growable(&self) -> bool {
        self.growable
    }

    pub(crate) const fn is_borrowed(&self) -> bool {
        matches!(self.backing, Backing::Borrowed(_))
    }

    /// Total capacity including the reserved terminator slot.
    pub(crate) fn raw_capacity(&self) -> usize {
        match &self.backing {
            Backing::Owned(vec) => vec.capacity(),
            Backing::Borrowed(slice) => slice.len(),
        }
    }

    /// Capacity available for content bytes.
    pub(crate) fn usable_capacity(&self) -> usize {
        self.raw_capacity().saturating_sub(1)
    }

    /// How many more content bytes fit without growing.
    pub(crate) fn room(&self) -> usize {
        self.usable_capacity().saturating_sub(self.len)
    }

    pub(crate) fn has_terminator_room(&self) -> bool {
        self.raw_capacity() > self.len
    }

    /// The logically valid content bytes.
    pub(crate) fn content(&self) -> &[u8] {
        match &self.backing {
            Backing::Owned(vec) => &vec[..self.len],
            Backing::Borrowed(slice) => &slice[..self.len],
        }
    }

    /// Appends bytes into reserved room. The caller has already made room.
    pub(crate) fn append(&mut self, bytes: &[u8]) {
        debug_assert!(self.room() >= bytes.len());

        match &mut self.backing {
            Backing::Owned(vec) => vec.extend_from_slice(bytes),
            Backing::Borrowed(slice) => {
                let end = self.len + bytes.len();
                slice[self.len..end].copy_from_slice(bytes);
            }
        }

        self.len += bytes.len();
    }

    /// Removes the first `n` content bytes with an in-place shift.
    ///
    /// The terminator slot invariant is unaffected: the raw capacity does
    /// not change and the length only shrinks.
    pub(crate) fn remove_prefix(&mut self, n: usize) {
        debug_assert!(n <= self.len);

        if n == 0 {
            return;
        }

        let new_len = self.len - n;

        match &mut self.backing {
            Backing::Owned(vec) => {
                vec.copy_within(n.., 0);
                vec.truncate(new_len);
            }
            Backing::Borrowed(slice) => slice.copy_within(n..self.len, 0),
        }

        self.len = new_len;
    }

    /// Shrinks the content to at most `new_len` bytes.
    pub(crate) fn truncate(&mut self, new_len: usize) {
        let new_len = new_len.min(self.len);

        if let Backing::Owned(vec) = &mut self.backing {
            vec.truncate(new_len);
        }

        self.len = new_len;
    }

    /// Extends capacity so that `additional` more content bytes plus the
    /// terminator slot fit, flipping borrowed backing to owned if needed.
    ///
    /// # Panics
    ///
    /// Panics if the resulting capacity would be greater than `usize::MAX`.
    pub(crate) fn grow_to_fit(&mut self, additional: usize) -> Result<()> {
        debug_assert!(self.growable);

        let needed = self
            .len
            .checked_add(additional)
            .and_then(|n| n.checked_add(1))
            .expect("buffer capacity cannot exceed usize::MAX");

        if self.raw_capacity() >= needed {
            return Ok(());
        }

        let old_capacity = self.raw_capacity();
        let target = grown_capacity(needed);

        if self.is_borrowed() {
            let mut vec = Vec::new();
            vec.try_reserve_exact(target)
                .map_err(|e| Error::with_source(ErrorKind::AllocationFailure, "extending buffer storage failed", e))?;
            vec.extend_from_slice(self.content());

            self.backing = Backing::Owned(vec);

            event!(Level::DEBUG, message = "borrowed storage copied into owned storage", capacity = target);
        } else if let Backing::Owned(vec) = &mut self.backing {
            vec.try_reserve_exact(target - self.len)
                .map_err(|e| Error::with_source(ErrorKind::AllocationFailure, "extending buffer storage failed", e))?;
        }

        event!(
            Level::TRACE,
            message = "storage extended",
            old_capacity,
            new_capacity = self.raw_capacity()
        );

        Ok(())
    }

    /// Writes the terminator byte into the reserved slot behind the content.
    ///
    /// The caller has already guaranteed the slot exists. With
    /// `include_in_len` the terminator counts toward the logical length.
    pub(crate) fn write_terminator(&mut self, include_in_len: bool) {
        debug_assert!(self.has_terminator_room());

        match &mut self.backing {
            Backing::Owned(vec) => {
                debug_assert_eq!(vec.len(), self.len);
                vec.push(0);
            }
            Backing::Borrowed(slice) => {
                let slot = slice.get_mut(self.len).expect("terminator slot is reserved by every append");
                *slot = 0;
            }
        }

        if include_in_len {
            self.len += 1;
        }
    }

    /// Adopts caller-supplied owned storage whose first `vec.len()` bytes
    /// are the content. The previous owned storage (if any) is released.
    pub(crate) fn attach_owned(&mut self, vec: Vec<u8>) {
        self.len = vec.len();
        self.backing = Backing::Owned(vec);
    }

    /// Hands out the owned storage, truncated to the logical length, and
    /// resets to fresh zero-length owned storage.
    ///
    /// Returns `None` if the backing is borrowed - a caller's slice cannot
    /// be transferred out.
    pub(crate) fn take_owned(&mut self) -> Option<Vec<u8>> {
        match &mut self.backing {
            Backing::Owned(vec) => {
                vec.truncate(self.len);
                self.len = 0;
                Some(mem::take(vec))
            }
            Backing::Borrowed(_) => None,
        }
    }
}

/// The capacity to extend to when `needed` raw bytes are required: the next
/// power of two, at least [`MIN_EXTEND_CAPACITY`].
#[cfg_attr(test, mutants::skip)] // Mutating the loop bound turns this into an infinite loop.
fn grown_capacity(needed: usize) -> usize {
    let mut size = MIN_EXTEND_CAPACITY;

    while size < needed {
        size = size.checked_mul(2).unwrap_or(needed);
    }

    size
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_targets_power_of_two() {
        assert_eq!(grown_capacity(1), 16);
        assert_eq!(grown_capacity(16), 16);
        assert_eq!(grown_capacity(17), 32);
        assert_eq!(grown_capacity(100), 128);
        assert_eq!(grown_capacity(4097), 8192);
    }

    #[test]
    fn owned_storage_defers_allocation() {
        let storage = Storage::owned(true);

        assert_eq!(storage.raw_capacity(), 0);
        assert_eq!(storage.usable_capacity(), 0);
        assert_eq!(storage.room(), 0);
        assert!(storage.is_empty());
        assert!(!storage.is_borrowed());
    }

    #[test]
    fn growth_preserves_content() {
        let mut storage = Storage::owned(true);
        storage.grow_to_fit(5).unwrap();

        assert_eq!(storage.raw_capacity(), 16);

        storage.append(b"hello");
        storage.grow_to_fit(100).unwrap();

        assert_eq!(storage.raw_capacity(), 128);
        assert_eq!(storage.content(), b"hello");
    }

    #[test]
    fn borrowed_storage_flips_to_owned_on_growth() {
        let mut scratch = [0_u8; 8];
        let mut storage = Storage::borrowed(&mut scratch, true);

        storage.append(b"abcd");
        assert!(storage.is_borrowed());
        assert_eq!(storage.room(), 3);

        storage.grow_to_fit(20).unwrap();

        assert!(!storage.is_borrowed());
        assert_eq!(storage.content(), b"abcd");
        assert_eq!(storage.raw_capacity(), 32);
    }

    #[test]
    fn prefix_removal_shifts_in_place() {
        let mut storage = Storage::owned(true);
        storage.grow_to_fit(11).unwrap();
        storage.append(b"  abc def  ");

        storage.remove_prefix(2);

        assert_eq!(storage.content(), b"abc def  ");
        assert_eq!(storage.len(), 9);
        assert_eq!(storage.raw_capacity(), 16);
    }

    #[test]
    fn terminator_lands_behind_borrowed_content() {
        let mut scratch = [0xFF_u8; 8];

        {
            let mut storage = Storage::borrowed(&mut scratch, false);
            storage.append(b"abc");
            storage.write_terminator(false);
            assert_eq!(storage.len(), 3);
        }

        assert_eq!(&scratch[..4], b"abc\0");
    }

    #[test]
    fn terminator_can_count_toward_length() {
        let mut storage = Storage::owned(true);
        storage.grow_to_fit(3).unwrap();
        storage.append(b"abc");

        storage.write_terminator(true);

        assert_eq!(storage.len(), 4);
        assert_eq!(storage.content(), b"abc\0");
    }

    #[test]
    fn detached_storage_is_truncated_to_content() {
        let mut storage = Storage::owned(true);
        storage.grow_to_fit(3).unwrap();
        storage.append(b"abc");
        storage.write_terminator(false);

        let vec = storage.take_owned().unwrap();

        assert_eq!(vec, b"abc");
        assert_eq!(vec.capacity(), 16);
        assert!(storage.is_empty());
        assert_eq!(storage.raw_capacity(), 0);
    }

    #[test]
    fn borrowed_storage_cannot_be_taken() {
        let mut scratch = [0_u8; 4];
        let mut storage = Storage::borrowed(&mut scratch, true);

        assert!(storage.take_owned().is_none());
    }
}
