//! Arena allocator for zero-copy JSON parsing.
//!
//! This module provides a thin wrapper around `bumpalo::Bump` that provides
//! arena allocation for parsed documents. All values produced by a parse are
//! allocated from the arena and have lifetimes bound to it.

use core::ops::{Deref, DerefMut};
use std::sync::Arc;

use bumpalo::Bump;

pub use bumpalo::collections::Vec as BumpVec;

/// Arena-allocated vector that can be frozen to an immutable slice.
///
/// This is a newtype wrapper around BumpVec that implements BufMut so that
/// serialized output can be written directly into arena memory.
pub struct ArenaVec<'arena, T>(BumpVec<'arena, T>);

impl<'arena, T> ArenaVec<'arena, T> {
    /// Freeze the vector into an immutable arena slice (zero-copy).
    #[inline]
    pub fn freeze(self) -> &'arena [T] {
        self.0.into_bump_slice()
    }

    /// Appends an element to the back of the vector.
    #[inline]
    pub fn push(&mut self, value: T) {
        self.0.push(value);
    }

    /// Reserves capacity for at least `additional` more elements.
    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        self.0.reserve(additional);
    }

    /// Returns the number of elements in the vector.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the vector contains no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the total capacity of the vector.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.0.capacity()
    }

    /// Extends the vector from a slice (convenience method).
    #[inline]
    pub fn extend_from_slice(&mut self, other: &[T])
    where
        T: Clone,
    {
        self.0.extend_from_slice(other);
    }

    /// Shortens the vector to `len` elements.
    #[inline]
    pub fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }
}

impl<'arena, T> Deref for ArenaVec<'arena, T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'arena, T> DerefMut for ArenaVec<'arena, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<'arena, T> core::iter::Extend<T> for ArenaVec<'arena, T> {
    #[inline]
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

/// An arena allocator for JSON documents.
///
/// All values parsed with this arena will have their storage allocated from
/// the arena and will be tied to the arena's lifetime. The arena uses a bump
/// allocator internally, which means:
///
/// - Allocation is very fast (just increment a pointer)
/// - Individual items cannot be freed (all freed at once when arena drops)
/// - Memory is reclaimed when the arena is dropped or reset
///
/// Arena identity matters: two distinct arenas never compare equal, and a
/// value tree never mixes storage from two arenas. Moving a value into
/// another arena is always a deep copy.
///
/// # Examples
///
/// ```
/// use millstream::Arena;
///
/// let arena = Arena::new();
/// let doc = millstream::parse(b"[1,2,3]", &arena).unwrap();
/// assert_eq!(doc.as_array().unwrap().len(), 3);
/// // All allocations freed when arena drops
/// ```
pub struct Arena {
    bump: Bump,
}

impl Arena {
    /// Creates a new arena with default capacity.
    #[inline]
    pub fn new() -> Self {
        Arena { bump: Bump::new() }
    }

    /// Creates a new arena with the specified capacity in bytes.
    ///
    /// The arena will allocate an initial chunk of at least `capacity` bytes.
    /// This can improve performance if you know approximately how large the
    /// parsed document will be.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Arena {
            bump: Bump::with_capacity(capacity),
        }
    }

    /// Allocates a string slice in the arena.
    ///
    /// The string data is copied into the arena and a reference with the
    /// arena's lifetime is returned.
    #[inline]
    pub fn alloc_str(&self, s: &str) -> &str {
        self.bump.alloc_str(s)
    }

    /// Allocates a copy of a slice in the arena.
    #[inline]
    pub fn alloc_slice_copy<T: Copy>(&self, src: &[T]) -> &[T] {
        self.bump.alloc_slice_copy(src)
    }

    /// Allocates a value in the arena.
    #[inline]
    pub fn alloc<T>(&self, value: T) -> &mut T {
        self.bump.alloc(value)
    }

    /// Creates a new arena-allocated Vec for accumulating elements.
    ///
    /// During parsing, arrays and objects accumulate elements into this Vec.
    /// After construction completes, convert to an immutable slice via
    /// `freeze()`.
    #[inline]
    pub fn new_vec<T>(&self) -> ArenaVec<'_, T> {
        ArenaVec(BumpVec::new_in(&self.bump))
    }

    /// Creates a new arena-allocated Vec with the specified capacity.
    #[inline]
    pub fn new_vec_with_capacity<T>(&self, capacity: usize) -> ArenaVec<'_, T> {
        ArenaVec(BumpVec::with_capacity_in(capacity, &self.bump))
    }

    /// Returns true if `self` and `other` are the same arena.
    ///
    /// Arena equality is identity. Containers refuse to alias storage
    /// across arenas; use [`crate::Value::deep_copy`] to transfer a value
    /// tree between arenas.
    #[inline]
    pub fn ptr_eq(&self, other: &Arena) -> bool {
        core::ptr::eq(self, other)
    }

    /// Resets the arena, reclaiming all allocated memory.
    ///
    /// Taking `&mut self` guarantees no parsed value still borrows from the
    /// arena. This is useful for reusing the same arena across multiple
    /// parses (e.g. in a request handler that processes many documents).
    #[inline]
    pub fn reset(&mut self) {
        self.bump.reset();
    }

    /// Returns the number of bytes currently allocated in the arena.
    #[inline]
    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }

    #[inline]
    pub(crate) fn bump(&self) -> &Bump {
        &self.bump
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Arena {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Arena")
            .field("allocated_bytes", &self.allocated_bytes())
            .finish()
    }
}

/// A reference-counted arena.
///
/// `SharedArena` hands out shared ownership of an [`Arena`] so that the
/// arena reliably outlives every container referring to it, even when the
/// creating scope has returned. Cloning is cheap; the underlying arena is
/// dropped when the last handle goes away.
///
/// Dereferences to [`Arena`], so a `&SharedArena` works anywhere a
/// `&Arena` is expected.
#[derive(Clone, Debug)]
pub struct SharedArena(Arc<Arena>);

impl SharedArena {
    /// Creates a new counted arena with default capacity.
    #[inline]
    pub fn new() -> Self {
        SharedArena(Arc::new(Arena::new()))
    }

    /// Creates a new counted arena with the specified capacity in bytes.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        SharedArena(Arc::new(Arena::with_capacity(capacity)))
    }
}

impl Default for SharedArena {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for SharedArena {
    type Target = Arena;

    #[inline]
    fn deref(&self) -> &Arena {
        &self.0
    }
}

/// Implement BufMut for ArenaVec so serialized output can be written
/// directly into arena memory.
unsafe impl<'arena> bytes::BufMut for ArenaVec<'arena, u8> {
    #[inline]
    fn remaining_mut(&self) -> usize {
        self.0.capacity() - self.0.len()
    }

    #[inline]
    unsafe fn advance_mut(&mut self, cnt: usize) {
        let len = self.0.len();
        let new_len = len + cnt;
        debug_assert!(new_len <= self.0.capacity());
        self.0.set_len(new_len);
    }

    #[inline]
    fn chunk_mut(&mut self) -> &mut bytes::buf::UninitSlice {
        if self.0.capacity() == self.0.len() {
            self.0.reserve(64); // grow if needed
        }

        let cap = self.0.capacity();
        let len = self.0.len();
        let ptr = self.0.as_mut_ptr();

        unsafe {
            let slice = core::slice::from_raw_parts_mut(ptr.add(len), cap - len);
            bytes::buf::UninitSlice::from_raw_parts_mut(slice.as_mut_ptr() as *mut _, slice.len())
        }
    }
}
