use std::any::type_name;
use std::fmt;
use std::mem;
use std::ops::{Index, IndexMut};

use tracing::trace;

use crate::growth::{next_capacity, regrow, try_regrow};
use crate::{
    AllocatedBackInserter, BackInserter, Cursor, CursorMut, ElementCursor, ElementCursorMut, Iter,
    IterMut, Recyclable, Result,
};

/// A growable sequence of individually boxed objects that keeps removed objects around for reuse.
///
/// This is the storage behind a repeated field of strings or nested messages. Elements are
/// created by the sequence itself: [`add()`][Self::add] returns a reference to a fresh (or
/// recycled) default-state object that the caller then fills in.
///
/// # Recycling
///
/// The sequence owns two kinds of objects:
///
/// * active objects, which are the elements of the sequence;
/// * cleared objects, which were removed via [`remove_last()`][Self::remove_last] or
///   [`clear()`][Self::clear] and have been [reset][Recyclable::reset] to the empty state.
///
/// `add()` hands out a cleared object if there is one, so a message that is cleared and
/// refilled over and over does not allocate after the first round. Cleared objects are never
/// visible through the element accessors; they only count toward
/// [`cleared_count()`][Self::cleared_count] and
/// [`space_used_excluding_self()`][Self::space_used_excluding_self].
///
/// # Ownership transfer
///
/// Boxed objects can be moved in and out of the sequence without copying:
///
/// * [`release_last()`][Self::release_last] and [`release_cleared()`][Self::release_cleared]
///   hand an object to the caller;
/// * [`add_allocated()`][Self::add_allocated] and [`add_cleared()`][Self::add_cleared] take one
///   from the caller.
///
/// # Example
///
/// ```
/// use repeated_fields::PointerSequence;
///
/// let mut names = PointerSequence::<String>::new();
///
/// names.add().push_str("foo");
/// names.add().push_str("bar");
/// assert_eq!(names.len(), 2);
///
/// names.clear();
/// assert_eq!(names.len(), 0);
/// assert_eq!(names.cleared_count(), 2);
///
/// // The cleared strings are reused, keeping their buffers.
/// names.add().push_str("baz");
/// assert_eq!(names.cleared_count(), 1);
/// assert_eq!(names[0], "baz");
/// ```
pub struct PointerSequence<T> {
    // [0, active) are the elements, [active, len) are cleared objects.
    // The capacity of the vector is managed exactly via `regrow()`.
    slots: Vec<Box<T>>,

    active: usize,
}

impl<T> PointerSequence<T> {
    /// Creates an empty sequence. This does not allocate.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            active: 0,
        }
    }

    /// Creates an empty sequence whose pointer array has room for exactly `capacity` objects.
    ///
    /// Only the pointer array is allocated up front. The objects themselves are allocated
    /// when they are first added.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            active: 0,
        }
    }

    /// The number of elements (active objects) in the sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active
    }

    /// Whether the sequence contains no elements. Cleared objects do not count.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active == 0
    }

    /// The number of objects, active and cleared combined, that the pointer array can hold
    /// without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// The number of cleared objects held for reuse.
    #[must_use]
    pub fn cleared_count(&self) -> usize {
        self.slots
            .len()
            .checked_sub(self.active)
            .expect("active objects are always a prefix of the owned objects")
    }

    /// The boxed elements, in order. Cleared objects are not included.
    #[must_use]
    pub fn pointers(&self) -> &[Box<T>] {
        self.slots
            .get(..self.active)
            .expect("active objects are always a prefix of the owned objects")
    }

    /// The boxed elements, in order, with permission to reorder or replace the boxes.
    ///
    /// Replacing a box through this slice drops the replaced object.
    #[must_use]
    pub fn pointers_mut(&mut self) -> &mut [Box<T>] {
        self.slots
            .get_mut(..self.active)
            .expect("active objects are always a prefix of the owned objects")
    }

    /// Returns a reference to the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn get(&self, index: usize) -> &T {
        let len = self.active;

        self.pointers()
            .get(index)
            .unwrap_or_else(|| panic!("{}", out_of_bounds_message::<T>("get", index, len)))
    }

    /// Returns an exclusive reference to the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn get_mut(&mut self, index: usize) -> &mut T {
        let len = self.active;

        self.pointers_mut()
            .get_mut(index)
            .unwrap_or_else(|| panic!("{}", out_of_bounds_message::<T>("get_mut", index, len)))
    }

    /// Removes the last element and transfers ownership of it to the caller.
    ///
    /// The object is not reset. The number of cleared objects is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the sequence is empty.
    pub fn release_last(&mut self) -> Box<T> {
        let Some(last) = self.active.checked_sub(1) else {
            panic!(
                "release_last() called on an empty sequence of {}",
                type_name::<T>()
            );
        };

        self.active = last;

        // The last cleared object, if any, moves into the vacated slot.
        self.slots.swap_remove(last)
    }

    /// Removes one cleared object and transfers ownership of it to the caller.
    ///
    /// # Panics
    ///
    /// Panics if there are no cleared objects.
    pub fn release_cleared(&mut self) -> Box<T> {
        assert!(
            self.cleared_count() > 0,
            "release_cleared() called on a sequence of {} without cleared objects",
            type_name::<T>()
        );

        self.slots
            .pop()
            .expect("we just verified that there is at least one cleared object")
    }

    /// Appends an object allocated by the caller as the new last element, taking ownership.
    ///
    /// The object is not copied. If the pointer array is full but holds cleared objects, one
    /// cleared object is dropped to make room instead of growing the array.
    ///
    /// # Example
    ///
    /// ```
    /// use repeated_fields::PointerSequence;
    ///
    /// let mut names = PointerSequence::<String>::new();
    ///
    /// names.add_allocated(Box::new("foo".to_string()));
    ///
    /// assert_eq!(names[0], "foo");
    /// ```
    pub fn add_allocated(&mut self, value: Box<T>) {
        let len = self.slots.len();

        if len < self.slots.capacity() {
            // Appended after the cleared objects, then swapped with the first cleared object.
            self.slots.push(value);
            self.slots.swap(self.active, len);
        } else if self.active < len {
            // Drops the first cleared object.
            *self.slot_mut(self.active) = value;
        } else {
            self.ensure_spare_slot();
            self.slots.push(value);
        }

        self.active = self
            .active
            .checked_add(1)
            .expect("active count is bounded by the number of owned objects");
    }

    /// Exchanges the entire contents of two sequences, including cleared objects.
    ///
    /// Only the pointer arrays are exchanged; no object is moved or copied.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Swaps the elements at two indexes by exchanging their boxes.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn swap_elements(&mut self, a: usize, b: usize) {
        let len = self.active;

        assert!(
            a < len,
            "{}",
            out_of_bounds_message::<T>("swap_elements", a, len)
        );
        assert!(
            b < len,
            "{}",
            out_of_bounds_message::<T>("swap_elements", b, len)
        );

        self.slots.swap(a, b);
    }

    /// Ensures that the pointer array can hold at least `capacity` objects in total, active
    /// and cleared combined.
    ///
    /// Follows the same policy as [`ValueSequence::reserve()`][crate::ValueSequence::reserve]:
    /// nothing happens if the capacity is sufficient, otherwise the array grows to
    /// [`next_capacity()`][crate::next_capacity]. Cleared objects are carried over.
    #[cfg_attr(test, mutants::skip)] // Can be mutated to infinitely growing memory use.
    pub fn reserve(&mut self, capacity: usize) {
        if capacity <= self.slots.capacity() {
            return;
        }

        self.grow_to(next_capacity(self.slots.capacity(), capacity));
    }

    /// Fallible variant of [`reserve()`][Self::reserve].
    ///
    /// # Errors
    ///
    /// Returns an error if the pointer array could not be allocated. The sequence is unchanged
    /// in that case.
    pub fn try_reserve(&mut self, capacity: usize) -> Result<()> {
        if capacity <= self.slots.capacity() {
            return Ok(());
        }

        let new_capacity = next_capacity(self.slots.capacity(), capacity);
        try_regrow(&mut self.slots, new_capacity)?;

        trace!(
            element_type = type_name::<T>(),
            to_capacity = new_capacity,
            "pointer sequence slot array regrown"
        );

        Ok(())
    }

    /// Iterates over the elements.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.pointers())
    }

    /// Iterates over exclusive references to the elements.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self.pointers_mut())
    }

    /// A cursor positioned at the first element.
    #[must_use]
    pub fn begin(&self) -> ElementCursor<'_, T> {
        ElementCursor::new(self.pointers(), 0)
    }

    /// A cursor positioned one past the last element.
    #[must_use]
    pub fn end(&self) -> ElementCursor<'_, T> {
        ElementCursor::new(self.pointers(), self.active)
    }

    /// A mutable cursor positioned at the first element.
    #[must_use]
    pub fn begin_mut(&mut self) -> ElementCursorMut<'_, T> {
        ElementCursorMut::new(self.pointers_mut(), 0)
    }

    /// A mutable cursor positioned one past the last element.
    #[must_use]
    pub fn end_mut(&mut self) -> ElementCursorMut<'_, T> {
        let len = self.active;
        ElementCursorMut::new(self.pointers_mut(), len)
    }

    /// A cursor over the boxes themselves, positioned at the first element.
    #[must_use]
    pub fn pointer_begin(&self) -> Cursor<'_, Box<T>> {
        Cursor::new(self.pointers(), 0)
    }

    /// A cursor over the boxes themselves, positioned one past the last element.
    #[must_use]
    pub fn pointer_end(&self) -> Cursor<'_, Box<T>> {
        Cursor::new(self.pointers(), self.active)
    }

    /// A mutable cursor over the boxes themselves, positioned at the first element.
    ///
    /// Through this cursor a slot's box can be replaced, e.g. via [`std::mem::replace()`],
    /// which hands the previous box to the caller.
    #[must_use]
    pub fn pointer_begin_mut(&mut self) -> CursorMut<'_, Box<T>> {
        CursorMut::new(self.pointers_mut(), 0)
    }

    /// A mutable cursor over the boxes themselves, positioned one past the last element.
    #[must_use]
    pub fn pointer_end_mut(&mut self) -> CursorMut<'_, Box<T>> {
        let len = self.active;
        CursorMut::new(self.pointers_mut(), len)
    }

    /// An insertion adapter that copies every value written to it into a new element.
    #[must_use]
    pub fn back_inserter(&mut self) -> BackInserter<'_, Self> {
        BackInserter::new(self)
    }

    /// An insertion adapter that adopts every box written to it as a new element, via
    /// [`add_allocated()`][Self::add_allocated].
    ///
    /// # Example
    ///
    /// ```
    /// use repeated_fields::PointerSequence;
    ///
    /// let words = ["foo", "bar", "baz"].map(|word| Box::new(word.to_string()));
    ///
    /// let mut field = PointerSequence::<String>::new();
    /// field.allocated_back_inserter().extend(words);
    ///
    /// assert!(field.iter().eq(["foo", "bar", "baz"].iter()));
    /// ```
    #[must_use]
    pub fn allocated_back_inserter(&mut self) -> AllocatedBackInserter<'_, T> {
        AllocatedBackInserter::new(self)
    }

    fn slot_mut(&mut self, index: usize) -> &mut Box<T> {
        self.slots
            .get_mut(index)
            .expect("slot index was derived from the owned object count")
    }

    /// Makes room in the pointer array for one more object, growing it if it is full.
    fn ensure_spare_slot(&mut self) {
        let len = self.slots.len();

        if len == self.slots.capacity() {
            let requested = len
                .checked_add(1)
                .expect("a sequence cannot hold more than usize::MAX objects");

            self.grow_to(next_capacity(self.slots.capacity(), requested));
        }
    }

    fn grow_to(&mut self, new_capacity: usize) {
        trace!(
            element_type = type_name::<T>(),
            from_capacity = self.slots.capacity(),
            to_capacity = new_capacity,
            active = self.active,
            cleared = self.cleared_count(),
            "pointer sequence slot array regrown"
        );

        regrow(&mut self.slots, new_capacity);
    }
}

impl<T: Recyclable> PointerSequence<T> {
    /// Appends a new element in the default (empty) state and returns a reference to it.
    ///
    /// If a cleared object is available it is reused and nothing is allocated.
    pub fn add(&mut self) -> &mut T {
        if self.active == self.slots.len() {
            self.ensure_spare_slot();
            self.slots.push(Box::default());
        }

        let index = self.active;

        self.active = index
            .checked_add(1)
            .expect("active count is bounded by the number of owned objects");

        self.slot_mut(index)
    }

    /// Removes the last element, resetting it and keeping it as a cleared object for reuse.
    ///
    /// # Panics
    ///
    /// Panics if the sequence is empty.
    pub fn remove_last(&mut self) {
        let Some(last) = self.active.checked_sub(1) else {
            panic!(
                "remove_last() called on an empty sequence of {}",
                type_name::<T>()
            );
        };

        self.slot_mut(last).reset();
        self.active = last;
    }

    /// Removes all elements, resetting them and keeping them as cleared objects for reuse.
    pub fn clear(&mut self) {
        for object in self.pointers_mut() {
            object.reset();
        }

        self.active = 0;
    }

    /// Takes ownership of an object allocated by the caller and keeps it as a cleared object,
    /// to be handed out by a later [`add()`][Self::add]. The object is reset first.
    pub fn add_cleared(&mut self, mut value: Box<T>) {
        value.reset();

        self.ensure_spare_slot();
        self.slots.push(value);
    }

    /// Appends a copy of every element of `other`, in order.
    ///
    /// Each copy is made by merging into a fresh element from [`add()`][Self::add], so cleared
    /// objects are reused where available.
    pub fn merge_from(&mut self, other: &Self) {
        let total = self
            .active
            .checked_add(other.active)
            .expect("a sequence cannot hold more than usize::MAX objects");

        self.reserve(total);

        for value in other {
            self.add().merge_from(value);
        }
    }

    /// The number of heap bytes owned by the sequence, not counting `size_of::<Self>()`.
    ///
    /// This covers the pointer array and every owned object, active or cleared, together with
    /// the heap memory each object reports for itself.
    #[must_use]
    pub fn space_used_excluding_self(&self) -> usize {
        let pointer_array = self
            .slots
            .capacity()
            .checked_mul(size_of::<Box<T>>())
            .expect("an existing allocation cannot be larger than the address space");

        self.slots.iter().fold(pointer_array, |total, object| {
            total
                .checked_add(size_of::<T>())
                .and_then(|total| total.checked_add(object.space_used_excluding_self()))
                .expect("existing allocations cannot be larger than the address space")
        })
    }
}

fn out_of_bounds_message<T>(operation: &str, index: usize, len: usize) -> String {
    format!(
        "{operation}() index {index} out of bounds in sequence of {} with length {len}",
        type_name::<T>()
    )
}

impl<T> Default for PointerSequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Recyclable> Clone for PointerSequence<T> {
    /// Clones the elements. Cleared objects are not carried over.
    fn clone(&self) -> Self {
        let mut clone = Self::new();
        clone.merge_from(self);
        clone
    }
}

impl<T: fmt::Debug> fmt::Debug for PointerSequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for PointerSequence<T> {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for PointerSequence<T> {}

impl<T> Index<usize> for PointerSequence<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        self.get(index)
    }
}

impl<T> IndexMut<usize> for PointerSequence<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        self.get_mut(index)
    }
}

impl<T: Recyclable> Extend<T> for PointerSequence<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();

        let (lower_bound, _) = iter.size_hint();
        if let Some(total) = self.active.checked_add(lower_bound) {
            self.reserve(total);
        }

        for value in iter {
            *self.add() = value;
        }
    }
}

impl<T: Recyclable> FromIterator<T> for PointerSequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut sequence = Self::new();
        sequence.extend(iter);
        sequence
    }
}

impl<'a, T> IntoIterator for &'a PointerSequence<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut PointerSequence<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T: Recyclable> Recyclable for PointerSequence<T> {
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
