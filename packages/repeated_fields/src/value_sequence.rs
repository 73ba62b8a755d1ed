use std::any::type_name;
use std::fmt;
use std::mem;
use std::ops::{Index, IndexMut};
use std::slice;

use tracing::trace;

use crate::growth::{next_capacity, regrow, try_regrow};
use crate::{BackInserter, Cursor, CursorMut, Recyclable, Result};

/// The number of elements a [`ValueSequence`] stores inline, without a heap allocation,
/// unless a different capacity is specified via its const generic parameter.
pub const DEFAULT_INLINE_CAPACITY: usize = 4;

/// A growable sequence of value elements that stores the first `INLINE` elements inside the
/// sequence itself and moves to a heap buffer once more space is needed.
///
/// This is the storage behind a repeated field of scalar values. Message objects hold one
/// sequence per repeated field and mostly call [`add()`][Self::add], [`get()`][Self::get] and
/// [`set()`][Self::set] on it.
///
/// # Storage
///
/// A new sequence is inline-backed and does not allocate. When an element is added to a full
/// sequence, or [`reserve()`][Self::reserve] asks for more than `INLINE` slots, the elements move
/// to a heap buffer. The move is one-way: the sequence stays heap-backed for the rest of its
/// lifetime, even if it is later cleared or truncated.
///
/// Heap capacity grows according to [`next_capacity()`][crate::next_capacity]: appending one
/// element at a time doubles the capacity, while an explicit large reservation is honored
/// exactly.
///
/// # Example
///
/// ```
/// use repeated_fields::ValueSequence;
///
/// let mut field = ValueSequence::<i32>::new();
///
/// field.add(5);
/// field.add(42);
/// field.set(1, 23);
///
/// assert_eq!(field.len(), 2);
/// assert_eq!(*field.get(0), 5);
/// assert_eq!(*field.get(1), 23);
///
/// // Small sequences do not own any heap memory.
/// assert_eq!(field.space_used_excluding_self(), 0);
/// ```
pub struct ValueSequence<T, const INLINE: usize = DEFAULT_INLINE_CAPACITY> {
    storage: Storage<T, INLINE>,
}

enum Storage<T, const INLINE: usize> {
    Inline(heapless::Vec<T, INLINE>),

    /// The capacity of the vector is managed exactly - we only ever allocate it through
    /// `regrow()`, never through the amortizing growth logic of `Vec` itself.
    Heap(Vec<T>),
}

impl<T, const INLINE: usize> ValueSequence<T, INLINE> {
    /// Creates an empty, inline-backed sequence. This does not allocate.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            storage: Storage::Inline(heapless::Vec::new()),
        }
    }

    /// Creates an empty sequence that can hold at least `capacity` elements without
    /// reallocating.
    ///
    /// A capacity of up to `INLINE` does not allocate; a larger one allocates exactly
    /// `capacity` slots on the heap.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut sequence = Self::new();
        sequence.reserve(capacity);
        sequence
    }

    /// The number of elements in the sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.storage {
            Storage::Inline(items) => items.len(),
            Storage::Heap(items) => items.len(),
        }
    }

    /// Whether the sequence contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of elements the sequence can hold without reallocating.
    ///
    /// This is `INLINE` while the sequence is inline-backed.
    #[must_use]
    pub fn capacity(&self) -> usize {
        match &self.storage {
            Storage::Inline(_) => INLINE,
            Storage::Heap(items) => items.capacity(),
        }
    }

    /// Capacity of the heap buffer, zero while inline-backed. This is what the growth policy
    /// considers the current capacity when honoring an explicit reservation.
    fn heap_capacity(&self) -> usize {
        match &self.storage {
            Storage::Inline(_) => 0,
            Storage::Heap(items) => items.capacity(),
        }
    }

    /// The elements as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        match &self.storage {
            Storage::Inline(items) => items.as_slice(),
            Storage::Heap(items) => items.as_slice(),
        }
    }

    /// The elements as a mutable slice.
    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match &mut self.storage {
            Storage::Inline(items) => items.as_mut_slice(),
            Storage::Heap(items) => items.as_mut_slice(),
        }
    }

    /// A pointer to the first element slot of the active storage.
    ///
    /// The pointer identifies the storage: it stays the same for as long as no reallocation
    /// happens (and, while inline-backed, the sequence is not moved).
    #[must_use]
    pub fn as_ptr(&self) -> *const T {
        self.as_slice().as_ptr()
    }

    /// Appends an element to the end of the sequence, growing the storage if it is full.
    pub fn add(&mut self, value: T) {
        let len = self.len();

        if len == self.capacity() {
            let requested = len
                .checked_add(1)
                .expect("a sequence cannot hold more than usize::MAX elements");

            self.grow_to(next_capacity(self.capacity(), requested));
        }

        match &mut self.storage {
            Storage::Inline(items) => {
                let pushed = items.push(value);
                assert!(
                    pushed.is_ok(),
                    "inline storage of {} was full after ensuring capacity",
                    type_name::<T>()
                );
            }
            Storage::Heap(items) => items.push(value),
        }
    }

    /// Returns a reference to the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn get(&self, index: usize) -> &T {
        let len = self.len();

        self.as_slice()
            .get(index)
            .unwrap_or_else(|| panic!("{}", out_of_bounds_message::<T>(index, len)))
    }

    /// Returns an exclusive reference to the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn get_mut(&mut self, index: usize) -> &mut T {
        let len = self.len();

        self.as_mut_slice()
            .get_mut(index)
            .unwrap_or_else(|| panic!("{}", out_of_bounds_message::<T>(index, len)))
    }

    /// Replaces the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn set(&mut self, index: usize, value: T) {
        *self.get_mut(index) = value;
    }

    /// Removes and returns the last element. Capacity is retained.
    ///
    /// # Panics
    ///
    /// Panics if the sequence is empty.
    pub fn remove_last(&mut self) -> T {
        let removed = match &mut self.storage {
            Storage::Inline(items) => items.pop(),
            Storage::Heap(items) => items.pop(),
        };

        removed.unwrap_or_else(|| {
            panic!(
                "remove_last() called on an empty sequence of {}",
                type_name::<T>()
            )
        })
    }

    /// Removes all elements. Capacity and the storage kind (inline or heap) are retained.
    pub fn clear(&mut self) {
        match &mut self.storage {
            Storage::Inline(items) => items.clear(),
            Storage::Heap(items) => items.clear(),
        }
    }

    /// Shortens the sequence to `new_len` elements. Capacity is retained.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if `new_len` is greater than the current length. Truncation can
    /// only shrink a sequence; in release builds such a call leaves the sequence unchanged.
    pub fn truncate(&mut self, new_len: usize) {
        debug_assert!(
            new_len <= self.len(),
            "truncate() to new_len {new_len} would grow a sequence of {} with length {}",
            type_name::<T>(),
            self.len()
        );

        match &mut self.storage {
            Storage::Inline(items) => items.truncate(new_len),
            Storage::Heap(items) => items.truncate(new_len),
        }
    }

    /// Ensures that the sequence can hold at least `capacity` elements in total.
    ///
    /// If the current capacity is already sufficient, this does nothing and the storage is not
    /// moved. Otherwise the new capacity is chosen by [`next_capacity()`][crate::next_capacity],
    /// which means the first reservation that moves a sequence to the heap allocates exactly
    /// `capacity` slots.
    ///
    /// # Example
    ///
    /// ```
    /// use repeated_fields::ValueSequence;
    ///
    /// let mut field = ValueSequence::<u64>::new();
    ///
    /// field.reserve(20);
    /// assert_eq!(field.capacity(), 20);
    ///
    /// // Less than double: we double instead.
    /// field.reserve(30);
    /// assert_eq!(field.capacity(), 40);
    ///
    /// // Already enough: nothing happens.
    /// field.reserve(10);
    /// assert_eq!(field.capacity(), 40);
    /// ```
    #[cfg_attr(test, mutants::skip)] // Can be mutated to infinitely growing memory use.
    pub fn reserve(&mut self, capacity: usize) {
        if capacity <= self.capacity() {
            return;
        }

        self.grow_to(next_capacity(self.heap_capacity(), capacity));
    }

    /// Fallible variant of [`reserve()`][Self::reserve].
    ///
    /// # Errors
    ///
    /// Returns an error if the storage could not be allocated. The sequence is unchanged in
    /// that case.
    pub fn try_reserve(&mut self, capacity: usize) -> Result<()> {
        if capacity <= self.capacity() {
            return Ok(());
        }

        let new_capacity = next_capacity(self.heap_capacity(), capacity);

        match &mut self.storage {
            Storage::Inline(items) => {
                let mut heap = Vec::new();
                try_regrow(&mut heap, new_capacity)?;
                heap.extend(mem::take(items));

                trace!(
                    element_type = type_name::<T>(),
                    to_capacity = new_capacity,
                    "value sequence moved to heap storage"
                );

                self.storage = Storage::Heap(heap);
            }
            Storage::Heap(items) => {
                try_regrow(items, new_capacity)?;

                trace!(
                    element_type = type_name::<T>(),
                    to_capacity = new_capacity,
                    "value sequence heap storage regrown"
                );
            }
        }

        Ok(())
    }

    fn grow_to(&mut self, new_capacity: usize) {
        match &mut self.storage {
            Storage::Inline(items) => {
                let mut heap = Vec::with_capacity(new_capacity);
                heap.extend(mem::take(items));

                trace!(
                    element_type = type_name::<T>(),
                    len = heap.len(),
                    to_capacity = new_capacity,
                    "value sequence moved to heap storage"
                );

                self.storage = Storage::Heap(heap);
            }
            Storage::Heap(items) => {
                trace!(
                    element_type = type_name::<T>(),
                    from_capacity = items.capacity(),
                    to_capacity = new_capacity,
                    "value sequence heap storage regrown"
                );

                regrow(items, new_capacity);
            }
        }
    }

    /// Exchanges the entire contents of two sequences: elements, length, capacity and
    /// storage kind.
    ///
    /// When both sequences are heap-backed, only the buffer handles are exchanged. Inline
    /// elements live inside the sequence value and are moved along with it.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.storage, &mut other.storage);
    }

    /// Swaps the elements at two indexes.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn swap_elements(&mut self, a: usize, b: usize) {
        let len = self.len();

        assert!(a < len, "{}", out_of_bounds_message::<T>(a, len));
        assert!(b < len, "{}", out_of_bounds_message::<T>(b, len));

        self.as_mut_slice().swap(a, b);
    }

    /// The number of heap bytes owned by the sequence, not counting `size_of::<Self>()`.
    ///
    /// This is zero while the sequence is inline-backed and the full heap buffer size once it
    /// has moved to the heap, regardless of how many elements are currently present.
    #[must_use]
    pub fn space_used_excluding_self(&self) -> usize {
        self.heap_capacity()
            .checked_mul(size_of::<T>())
            .expect("an existing allocation cannot be larger than the address space")
    }

    /// Iterates over the elements.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Iterates over exclusive references to the elements.
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// A cursor positioned at the first element.
    #[must_use]
    pub fn begin(&self) -> Cursor<'_, T> {
        Cursor::new(self.as_slice(), 0)
    }

    /// A cursor positioned one past the last element.
    #[must_use]
    pub fn end(&self) -> Cursor<'_, T> {
        let items = self.as_slice();
        Cursor::new(items, items.len())
    }

    /// A mutable cursor positioned at the first element.
    #[must_use]
    pub fn begin_mut(&mut self) -> CursorMut<'_, T> {
        CursorMut::new(self.as_mut_slice(), 0)
    }

    /// A mutable cursor positioned one past the last element.
    #[must_use]
    pub fn end_mut(&mut self) -> CursorMut<'_, T> {
        let items = self.as_mut_slice();
        let len = items.len();
        CursorMut::new(items, len)
    }

    /// An insertion adapter that appends every value written to it.
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::LinkedList;
    ///
    /// use repeated_fields::ValueSequence;
    ///
    /// let fibonacci = LinkedList::from([1, 1, 2, 3, 5, 8]);
    ///
    /// let mut field = ValueSequence::<i32>::new();
    /// field.back_inserter().extend(&fibonacci);
    ///
    /// assert!(field.iter().eq(fibonacci.iter()));
    /// ```
    #[must_use]
    pub fn back_inserter(&mut self) -> BackInserter<'_, Self> {
        BackInserter::new(self)
    }
}

impl<T: Clone, const INLINE: usize> ValueSequence<T, INLINE> {
    /// Appends a copy of every element of `other`, in order.
    ///
    /// # Example
    ///
    /// ```
    /// use repeated_fields::ValueSequence;
    ///
    /// let source: ValueSequence<i32> = [4, 5].into_iter().collect();
    /// let mut destination: ValueSequence<i32> = [1, 2, 3].into_iter().collect();
    ///
    /// destination.merge_from(&source);
    ///
    /// assert_eq!(destination.as_slice(), [1, 2, 3, 4, 5]);
    /// ```
    pub fn merge_from(&mut self, other: &Self) {
        let total = self
            .len()
            .checked_add(other.len())
            .expect("a sequence cannot hold more than usize::MAX elements");

        self.reserve(total);

        for value in other {
            self.add(value.clone());
        }
    }
}

fn out_of_bounds_message<T>(index: usize, len: usize) -> String {
    format!(
        "index {index} out of bounds in sequence of {} with length {len}",
        type_name::<T>()
    )
}

impl<T, const INLINE: usize> Default for ValueSequence<T, INLINE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, const INLINE: usize> Clone for ValueSequence<T, INLINE> {
    fn clone(&self) -> Self {
        let mut clone = Self::new();
        clone.merge_from(self);
        clone
    }
}

impl<T: fmt::Debug, const INLINE: usize> fmt::Debug for ValueSequence<T, INLINE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T: PartialEq, const INLINE: usize> PartialEq for ValueSequence<T, INLINE> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, const INLINE: usize> Eq for ValueSequence<T, INLINE> {}

impl<T, const INLINE: usize> Index<usize> for ValueSequence<T, INLINE> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        self.get(index)
    }
}

impl<T, const INLINE: usize> IndexMut<usize> for ValueSequence<T, INLINE> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        self.get_mut(index)
    }
}

impl<T, const INLINE: usize> Extend<T> for ValueSequence<T, INLINE> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();

        let (lower_bound, _) = iter.size_hint();
        if let Some(total) = self.len().checked_add(lower_bound) {
            self.reserve(total);
        }

        for value in iter {
            self.add(value);
        }
    }
}

impl<'a, T: Clone + 'a, const INLINE: usize> Extend<&'a T> for ValueSequence<T, INLINE> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().cloned());
    }
}

impl<T, const INLINE: usize> FromIterator<T> for ValueSequence<T, INLINE> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut sequence = Self::new();
        sequence.extend(iter);
        sequence
    }
}

impl<'a, T, const INLINE: usize> IntoIterator for &'a ValueSequence<T, INLINE> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, const INLINE: usize> IntoIterator for &'a mut ValueSequence<T, INLINE> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T: Clone, const INLINE: usize> Recyclable for ValueSequence<T, INLINE> {
    fn reset(&mut self) {
        self.clear();
    }

    fn merge_from(&mut self, other: &Self) {
        Self::merge_from(self, other);
    }

    fn space_used_excluding_self(&self) -> usize {
        Self::space_used_excluding_self(self)
    }
}
