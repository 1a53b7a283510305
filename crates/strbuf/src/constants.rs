// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// Minimum raw storage capacity allocated when a growable buffer extends.
///
/// Extension always targets a power of two at least this large, so repeated
/// small appends do not trigger repeated reallocations.
pub(crate) const MIN_EXTEND_CAPACITY: usize = 16;

/// Chunk length used when bulk-loading from a byte stream.
///
/// This is an internal tuning constant - observable behavior of the loader
/// does not depend on it.
pub(crate) const READ_CHUNK_LEN: usize = 1024;

/// The number of section start offsets a buffer can track without a dynamic
/// allocation.
///
/// Deeper section nesting is supported but spills the offset stack onto the
/// heap.
pub const MAX_INLINE_SECTIONS: usize = 4;
