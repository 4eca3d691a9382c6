//! # Chunked Pool
//!
//! Dense, index-addressed storage for the values of one component family.

use std::any::Any;

/// Chunked storage for values of a single type.
///
/// Index `i` lives in chunk `i / chunk_len` at offset `i % chunk_len`.
/// Capacity grows by whole chunks and a chunk, once allocated, is never
/// reallocated or moved, so growth never relocates existing values.
///
/// Destroying a slot overwrites it with `T::default()`; storage never shrinks.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. It is owned and mutated by a single store.
///
/// # Example
///
/// ```rust,ignore
/// let mut pool: ChunkedPool<u32> = ChunkedPool::new(64);
/// pool.expand(10);
/// *pool.get_mut(3).unwrap() = 7;
/// pool.destroy(3);
/// assert_eq!(pool.get(3), Some(&0));
/// ```
pub struct ChunkedPool<T> {
    /// Allocated chunks, each exactly `chunk_len` long.
    chunks: Vec<Box<[T]>>,
    /// Values per chunk.
    chunk_len: usize,
    /// Number of addressable slots.
    len: usize,
}

impl<T: Default> ChunkedPool<T> {
    /// Creates an empty pool holding `chunk_len` values per chunk.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_len` is zero.
    #[must_use]
    pub fn new(chunk_len: usize) -> Self {
        assert!(chunk_len > 0, "Chunk length must be greater than zero");
        Self {
            chunks: Vec::new(),
            chunk_len,
            len: 0,
        }
    }

    /// Values held by one chunk.
    #[inline]
    #[must_use]
    pub const fn chunk_len(&self) -> usize {
        self.chunk_len
    }

    /// Number of addressable slots.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no slot is addressable.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots backed by allocated chunks.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.chunks.len() * self.chunk_len
    }

    /// Guarantees slots `[0, n)` are addressable.
    ///
    /// Never shrinks the pool.
    pub fn expand(&mut self, n: usize) {
        if n <= self.len {
            return;
        }
        self.reserve(n);
        self.len = n;
    }

    /// Allocates whole chunks until at least `n` slots are backed.
    pub fn reserve(&mut self, n: usize) {
        while self.capacity() < n {
            let chunk: Box<[T]> = (0..self.chunk_len).map(|_| T::default()).collect();
            self.chunks.push(chunk);
        }
    }

    /// Gets the value at `index`, or `None` past the addressable range.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        self.chunks
            .get(index / self.chunk_len)
            .and_then(|chunk| chunk.get(index % self.chunk_len))
    }

    /// Gets the value at `index` mutably, or `None` past the addressable range.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len {
            return None;
        }
        let chunk_len = self.chunk_len;
        self.chunks
            .get_mut(index / chunk_len)
            .and_then(|chunk| chunk.get_mut(index % chunk_len))
    }

    /// Resets the value at `index` to `T::default()`.
    #[inline]
    pub fn destroy(&mut self, index: usize) {
        if let Some(slot) = self.get_mut(index) {
            *slot = T::default();
        }
    }

    /// Iterates over every addressable slot with its index.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.chunks
            .iter()
            .flat_map(|chunk| chunk.iter())
            .take(self.len)
            .enumerate()
    }
}

/// Type-erased view of a [`ChunkedPool`], as held by a store.
pub trait AnyPool {
    /// See [`ChunkedPool::expand`].
    fn expand(&mut self, n: usize);

    /// See [`ChunkedPool::destroy`].
    fn destroy(&mut self, index: usize);

    /// See [`ChunkedPool::len`].
    fn len(&self) -> usize;

    /// Returns `true` if no slot is addressable.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Upcast for typed access.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for typed access.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Default + 'static> AnyPool for ChunkedPool<T> {
    fn expand(&mut self, n: usize) {
        ChunkedPool::expand(self, n);
    }

    fn destroy(&mut self, index: usize) {
        ChunkedPool::destroy(self, index);
    }

    fn len(&self) -> usize {
        self.len
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_grows_by_whole_chunks() {
        let mut pool: ChunkedPool<u32> = ChunkedPool::new(4);
        assert!(pool.is_empty());

        pool.expand(5);
        assert_eq!(pool.len(), 5);
        assert_eq!(pool.capacity(), 8);

        pool.expand(3);
        assert_eq!(pool.len(), 5, "expand never shrinks");
    }

    #[test]
    fn test_get_bounds() {
        let mut pool: ChunkedPool<u32> = ChunkedPool::new(4);
        pool.expand(6);
        assert!(pool.get(5).is_some());
        assert!(pool.get(6).is_none(), "slot 6 is backed but not addressable");
    }

    #[test]
    fn test_destroy_resets_to_default() {
        let mut pool: ChunkedPool<String> = ChunkedPool::new(2);
        pool.expand(3);
        *pool.get_mut(2).unwrap() = "sprite".to_string();

        pool.destroy(2);
        assert_eq!(pool.get(2).map(String::as_str), Some(""));
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_chunks_do_not_move_on_growth() {
        let mut pool: ChunkedPool<u64> = ChunkedPool::new(2);
        pool.expand(2);
        let before: *const u64 = pool.get(1).unwrap();

        pool.expand(64);
        let after: *const u64 = pool.get(1).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_iter_stops_at_len() {
        let mut pool: ChunkedPool<u8> = ChunkedPool::new(4);
        pool.expand(5);
        assert_eq!(pool.iter().count(), 5);
        assert_eq!(pool.iter().last().map(|(i, _)| i), Some(4));
    }

    #[test]
    fn test_erased_access() {
        let mut pool: ChunkedPool<i32> = ChunkedPool::new(8);
        let erased: &mut dyn AnyPool = &mut pool;
        erased.expand(3);
        assert_eq!(erased.len(), 3);

        let typed = erased.as_any_mut().downcast_mut::<ChunkedPool<i32>>().unwrap();
        *typed.get_mut(0).unwrap() = -1;
        erased.destroy(0);
        let typed = erased.as_any().downcast_ref::<ChunkedPool<i32>>().unwrap();
        assert_eq!(typed.get(0), Some(&0));
    }
}
