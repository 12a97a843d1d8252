//! Fixed-capacity circular FIFO.
//!
//! [`RingBuffer`] is the storage substrate of the reader: the persistent
//! presence cache and the per-cycle inventory batch are both ring buffers of
//! [`TagRecord`](crate::TagRecord)s.
//!
//! # Layout
//!
//! ```text
//!  physical slots:  [ e ][ a ][ b ][ c ][ - ]
//!                          ^head          ^tail
//!  logical view:    a(0) b(1) c(2) e(3)   ... wraps past the end
//! ```
//!
//! Only the `len` slots reachable from `head` hold data. Everything is
//! addressed through *logical* indices in `0..len`, oldest first; physical
//! slot positions never leave this module.
//!
//! # Example
//!
//! ```
//! use tagwatch_core::RingBuffer;
//!
//! let mut queue: RingBuffer<u8, 3> = RingBuffer::new();
//! queue.enqueue(1).unwrap();
//! queue.enqueue(2).unwrap();
//! queue.enqueue(3).unwrap();
//! assert!(queue.enqueue(4).is_err());
//!
//! assert_eq!(queue.dequeue().unwrap(), 1);
//! assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec![2, 3]);
//! ```

use crate::{Result, error::Error};
use std::iter::FusedIterator;
use std::ops::{Index, IndexMut};

/// Bounded FIFO with `N` slots.
///
/// Enqueueing into a full buffer fails with [`Error::QueueFull`] and leaves
/// the buffer untouched. [`RingBuffer::enqueue_evicting`] is the capture
/// variant that drops the oldest entry instead.
///
/// `N` must be at least 1; a zero capacity is rejected at compile time.
#[derive(Debug, Clone)]
pub struct RingBuffer<T, const N: usize> {
    /// Backing store. Slots outside the logical range are `None`.
    slots: [Option<T>; N],

    /// Physical slot of the oldest element.
    head: usize,

    /// Physical slot the next element is written to.
    tail: usize,

    /// Number of valid elements.
    len: usize,
}

impl<T, const N: usize> RingBuffer<T, N> {
    /// Create an empty buffer.
    pub fn new() -> Self {
        const { assert!(N > 0, "RingBuffer capacity must be at least 1") };
        Self {
            slots: std::array::from_fn(|_| None),
            head: 0,
            tail: 0,
            len: 0,
        }
    }

    /// Check whether the buffer holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check whether the buffer holds `N` elements.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Number of valid elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Fixed capacity (`N`).
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Append `item` as the newest element.
    ///
    /// # Errors
    /// Returns [`Error::QueueFull`] when the buffer is full. The buffer is
    /// left unchanged and `item` is dropped.
    pub fn enqueue(&mut self, item: T) -> Result<()> {
        if self.is_full() {
            return Err(Error::QueueFull { capacity: N });
        }

        self.slots[self.tail] = Some(item);
        self.tail = (self.tail + 1) % N;
        self.len += 1;
        Ok(())
    }

    /// Remove the oldest element and hand it back.
    ///
    /// # Errors
    /// Returns [`Error::QueueEmpty`] when there is nothing to remove.
    pub fn dequeue(&mut self) -> Result<T> {
        if self.is_empty() {
            return Err(Error::QueueEmpty);
        }

        let item = self.slots[self.head].take().ok_or(Error::QueueEmpty)?;
        self.head = (self.head + 1) % N;
        self.len -= 1;
        Ok(item)
    }

    /// Append `item`, dropping the oldest element first if the buffer is full.
    ///
    /// This never fails. The evicted element, if any, is returned.
    ///
    /// ```
    /// use tagwatch_core::RingBuffer;
    ///
    /// let mut batch: RingBuffer<u8, 2> = RingBuffer::new();
    /// assert_eq!(batch.enqueue_evicting(1), None);
    /// assert_eq!(batch.enqueue_evicting(2), None);
    /// assert_eq!(batch.enqueue_evicting(3), Some(1));
    /// ```
    pub fn enqueue_evicting(&mut self, item: T) -> Option<T> {
        let evicted = if self.is_full() {
            self.dequeue().ok()
        } else {
            None
        };

        // Cannot fail: at least one slot is free at this point.
        let _ = self.enqueue(item);
        evicted
    }

    /// Oldest element.
    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    /// Newest element.
    pub fn back(&self) -> Option<&T> {
        self.len.checked_sub(1).and_then(|last| self.get(last))
    }

    /// Element at logical `index` (0 is the oldest).
    ///
    /// Returns `None` for `index >= len()`.
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        self.slots[self.physical(index)].as_ref()
    }

    /// Mutable element at logical `index` (0 is the oldest).
    ///
    /// Returns `None` for `index >= len()`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len {
            return None;
        }
        let slot = self.physical(index);
        self.slots[slot].as_mut()
    }

    /// Logical index of the first element (oldest first) matching `predicate`.
    pub fn position<P>(&self, predicate: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().position(predicate)
    }

    /// Iterate from oldest to newest.
    ///
    /// The iterator is lazy and can be cloned to restart a traversal.
    pub fn iter(&self) -> Iter<'_, T, N> {
        Iter {
            buffer: self,
            front: 0,
            back: self.len,
        }
    }

    /// Iterate mutably from oldest to newest.
    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut T> {
        let len = self.len;
        let (wrapped, from_head) = self.slots.split_at_mut(self.head);
        let first_run = len.min(from_head.len());
        from_head[..first_run]
            .iter_mut()
            .chain(wrapped[..len - first_run].iter_mut())
            .filter_map(Option::as_mut)
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.head = 0;
        self.tail = 0;
        self.len = 0;
    }

    fn physical(&self, index: usize) -> usize {
        (self.head + index) % N
    }
}

impl<T, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Index<usize> for RingBuffer<T, N> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        let len = self.len;
        self.get(index)
            .unwrap_or_else(|| panic!("index {index} out of range for ring buffer of length {len}"))
    }
}

impl<T, const N: usize> IndexMut<usize> for RingBuffer<T, N> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len;
        self.get_mut(index)
            .unwrap_or_else(|| panic!("index {index} out of range for ring buffer of length {len}"))
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a RingBuffer<T, N> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Oldest-to-newest iterator over a [`RingBuffer`].
#[derive(Debug)]
pub struct Iter<'a, T, const N: usize> {
    buffer: &'a RingBuffer<T, N>,
    front: usize,
    back: usize,
}

impl<T, const N: usize> Clone for Iter<'_, T, N> {
    fn clone(&self) -> Self {
        Self {
            buffer: self.buffer,
            front: self.front,
            back: self.back,
        }
    }
}

impl<'a, T, const N: usize> Iterator for Iter<'a, T, N> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let item = self.buffer.get(self.front);
        self.front += 1;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T, const N: usize> DoubleEndedIterator for Iter<'_, T, N> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        self.buffer.get(self.back)
    }
}

impl<T, const N: usize> ExactSizeIterator for Iter<'_, T, N> {}

impl<T, const N: usize> FusedIterator for Iter<'_, T, N> {}
