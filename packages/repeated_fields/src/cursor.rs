//! Random-access cursors over sequence storage.
//!
//! A cursor is a position in a sequence, in the range `0..=len`. It can be moved with `+`, `-`,
//! `+=` and `-=` by a signed distance, compared with other cursors from the same sequence and,
//! for the copyable shared cursors, subtracted from another cursor to obtain a distance.
//!
//! A default-constructed cursor is detached: it belongs to no sequence, compares unequal to every
//! cursor obtained from a sequence (including that sequence's begin and end cursors) and panics
//! if dereferenced.

use std::any::type_name;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Index, IndexMut, Sub, SubAssign};
use std::slice;

use crate::{Iter, IterMut};

/// Identifies the storage a cursor moves over. `None` for detached cursors.
///
/// Only ever compared, never dereferenced.
type Origin = Option<(*const (), usize)>;

fn origin_of<T>(items: &[T], detached: bool) -> Origin {
    (!detached).then(|| (items.as_ptr().cast::<()>(), items.len()))
}

fn offset_position<T>(position: usize, delta: isize, len: usize) -> usize {
    position
        .checked_add_signed(delta)
        .filter(|target| *target <= len)
        .unwrap_or_else(|| {
            panic!(
                "cursor over {} at position {position} cannot move by {delta} within a sequence of length {len}",
                type_name::<T>()
            )
        })
}

fn signed(position: usize) -> isize {
    isize::try_from(position).expect("sequence positions never exceed isize::MAX")
}

fn item_at<T>(items: &[T], position: usize) -> &T {
    items.get(position).unwrap_or_else(|| {
        panic!(
            "cursor at position {position} does not point to an element of {} (length {})",
            type_name::<T>(),
            items.len()
        )
    })
}

fn item_at_mut<T>(items: &mut [T], position: usize) -> &mut T {
    let len = items.len();

    items.get_mut(position).unwrap_or_else(|| {
        panic!(
            "cursor at position {position} does not point to an element of {} (length {len})",
            type_name::<T>()
        )
    })
}

/// Implements movement, comparison and relative indexing in terms of the inherent
/// `position()`, `origin()` and `move_by()` methods of each cursor type.
macro_rules! impl_random_access {
    ($cursor:ident) => {
        impl<T> Add<isize> for $cursor<'_, T> {
            type Output = Self;

            fn add(mut self, delta: isize) -> Self {
                self.move_by(delta);
                self
            }
        }

        impl<T> Sub<isize> for $cursor<'_, T> {
            type Output = Self;

            fn sub(mut self, delta: isize) -> Self {
                self.move_by(delta.checked_neg().expect("cursor distance cannot be isize::MIN"));
                self
            }
        }

        impl<T> AddAssign<isize> for $cursor<'_, T> {
            fn add_assign(&mut self, delta: isize) {
                self.move_by(delta);
            }
        }

        impl<T> SubAssign<isize> for $cursor<'_, T> {
            fn sub_assign(&mut self, delta: isize) {
                self.move_by(delta.checked_neg().expect("cursor distance cannot be isize::MIN"));
            }
        }

        impl<T> PartialEq for $cursor<'_, T> {
            fn eq(&self, other: &Self) -> bool {
                self.origin() == other.origin() && self.position() == other.position()
            }
        }

        impl<T> Eq for $cursor<'_, T> {}

        impl<T> PartialOrd for $cursor<'_, T> {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                (self.origin() == other.origin()).then(|| self.position().cmp(&other.position()))
            }
        }
    };
}

/// A copyable random-access cursor over shared elements.
///
/// Obtained from [`ValueSequence::begin()`][crate::ValueSequence::begin] and
/// [`ValueSequence::end()`][crate::ValueSequence::end]. The pointer view of a
/// [`PointerSequence`][crate::PointerSequence] is also a `Cursor`, over the owned boxes
/// themselves, obtained via
/// [`PointerSequence::pointer_begin()`][crate::PointerSequence::pointer_begin].
///
/// # Example
///
/// ```
/// use repeated_fields::ValueSequence;
///
/// let sequence: ValueSequence<i32> = [0, 1, 2].into_iter().collect();
///
/// let begin = sequence.begin();
/// let end = sequence.end();
///
/// assert_eq!(end - begin, 3);
/// assert_eq!(*(end - 1).get(), 2);
/// assert_eq!(begin[2], 2);
/// assert!(begin < end);
///
/// let sum: i32 = begin.until(end).sum();
/// assert_eq!(sum, 3);
/// ```
pub struct Cursor<'a, T> {
    items: &'a [T],
    position: usize,
    detached: bool,
}

impl<'a, T> Cursor<'a, T> {
    pub(crate) fn new(items: &'a [T], position: usize) -> Self {
        debug_assert!(position <= items.len());

        Self {
            items,
            position,
            detached: false,
        }
    }

    fn origin(&self) -> Origin {
        origin_of(self.items, self.detached)
    }

    fn move_by(&mut self, delta: isize) {
        self.position = offset_position::<T>(self.position, delta, self.items.len());
    }

    /// The index of the element this cursor points to.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Whether the cursor is positioned one past the last element.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.position == self.items.len()
    }

    /// The element the cursor points to.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is at the end position or is detached.
    #[must_use]
    pub fn get(&self) -> &'a T {
        item_at(self.items, self.position)
    }

    /// Moves the cursor one element forward (pre-increment).
    ///
    /// # Panics
    ///
    /// Panics if the cursor is already at the end position.
    pub fn move_next(&mut self) -> &mut Self {
        self.move_by(1);
        self
    }

    /// Moves the cursor one element backward (pre-decrement).
    ///
    /// # Panics
    ///
    /// Panics if the cursor is already at the first position.
    pub fn move_prev(&mut self) -> &mut Self {
        self.move_by(-1);
        self
    }

    /// Moves the cursor one element forward, returning the cursor as it was before the move
    /// (post-increment).
    ///
    /// # Panics
    ///
    /// Panics if the cursor is already at the end position.
    pub fn post_increment(&mut self) -> Self {
        let previous = *self;
        self.move_by(1);
        previous
    }

    /// Moves the cursor one element backward, returning the cursor as it was before the move
    /// (post-decrement).
    ///
    /// # Panics
    ///
    /// Panics if the cursor is already at the first position.
    pub fn post_decrement(&mut self) -> Self {
        let previous = *self;
        self.move_by(-1);
        previous
    }

    /// Returns an iterator over the elements from this cursor up to (not including) `end`.
    ///
    /// This is how a range delimited by two cursors is handed to iterator-based algorithms.
    ///
    /// # Panics
    ///
    /// Panics if the cursors belong to different sequences or `end` is before `self`.
    #[must_use]
    pub fn until(self, end: Self) -> slice::Iter<'a, T> {
        assert!(
            self.origin() == end.origin() && self.position <= end.position,
            "cursor range {}..{} over {} is not a valid range of a single sequence",
            self.position,
            end.position,
            type_name::<T>()
        );

        self.items
            .get(self.position..end.position)
            .expect("guarded by range assertion above")
            .iter()
    }
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T> {}

impl<T> Default for Cursor<'_, T> {
    fn default() -> Self {
        Self {
            items: &[],
            position: 0,
            detached: true,
        }
    }
}

impl<T> fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("position", &self.position)
            .field("len", &self.items.len())
            .field("detached", &self.detached)
            .finish()
    }
}

impl_random_access!(Cursor);

impl<T> Sub for Cursor<'_, T> {
    type Output = isize;

    /// The signed distance from `other` to `self`.
    ///
    /// # Panics
    ///
    /// Panics if the cursors belong to different sequences.
    fn sub(self, other: Self) -> isize {
        assert!(
            self.origin() == other.origin(),
            "cannot measure the distance between cursors of different sequences of {}",
            type_name::<T>()
        );

        signed(self.position)
            .checked_sub(signed(other.position))
            .expect("difference of two in-range positions cannot overflow")
    }
}

impl<T> Index<isize> for Cursor<'_, T> {
    type Output = T;

    fn index(&self, delta: isize) -> &T {
        item_at(
            self.items,
            offset_position::<T>(self.position, delta, self.items.len()),
        )
    }
}

impl<'a, T> IntoIterator for Cursor<'a, T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    /// Iterates from the cursor position to the end of the sequence.
    fn into_iter(self) -> Self::IntoIter {
        self.items
            .get(self.position..)
            .expect("cursor positions are always within 0..=len")
            .iter()
    }
}

/// A random-access cursor over exclusive elements.
///
/// Obtained from [`ValueSequence::begin_mut()`][crate::ValueSequence::begin_mut]. The mutable
/// pointer view of a [`PointerSequence`][crate::PointerSequence], obtained via
/// [`PointerSequence::pointer_begin_mut()`][crate::PointerSequence::pointer_begin_mut], is a
/// `CursorMut` over the owned boxes, which allows a slot's box to be replaced.
///
/// Converts into a shared [`Cursor`] via `From`, never the other way around.
pub struct CursorMut<'a, T> {
    items: &'a mut [T],
    position: usize,
    detached: bool,
}

impl<'a, T> CursorMut<'a, T> {
    pub(crate) fn new(items: &'a mut [T], position: usize) -> Self {
        debug_assert!(position <= items.len());

        Self {
            items,
            position,
            detached: false,
        }
    }

    fn origin(&self) -> Origin {
        origin_of(self.items, self.detached)
    }

    fn move_by(&mut self, delta: isize) {
        self.position = offset_position::<T>(self.position, delta, self.items.len());
    }

    /// The index of the element this cursor points to.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Whether the cursor is positioned one past the last element.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.position == self.items.len()
    }

    /// The element the cursor points to.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is at the end position or is detached.
    #[must_use]
    pub fn get(&self) -> &T {
        item_at(self.items, self.position)
    }

    /// Exclusive access to the element the cursor points to.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is at the end position or is detached.
    #[must_use]
    pub fn get_mut(&mut self) -> &mut T {
        item_at_mut(self.items, self.position)
    }

    /// Consumes the cursor, returning exclusive access to the element it points to for the
    /// full lifetime of the underlying borrow.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is at the end position or is detached.
    #[must_use]
    pub fn into_mut(self) -> &'a mut T {
        item_at_mut(self.items, self.position)
    }

    /// Moves the cursor one element forward (pre-increment).
    ///
    /// # Panics
    ///
    /// Panics if the cursor is already at the end position.
    pub fn move_next(&mut self) -> &mut Self {
        self.move_by(1);
        self
    }

    /// Moves the cursor one element backward (pre-decrement).
    ///
    /// # Panics
    ///
    /// Panics if the cursor is already at the first position.
    pub fn move_prev(&mut self) -> &mut Self {
        self.move_by(-1);
        self
    }

    /// A shared cursor at the same position, borrowing from this one.
    #[must_use]
    pub fn as_cursor(&self) -> Cursor<'_, T> {
        Cursor {
            items: self.items,
            position: self.position,
            detached: self.detached,
        }
    }
}

impl<T> Default for CursorMut<'_, T> {
    fn default() -> Self {
        Self {
            items: &mut [],
            position: 0,
            detached: true,
        }
    }
}

impl<T> fmt::Debug for CursorMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorMut")
            .field("position", &self.position)
            .field("len", &self.items.len())
            .field("detached", &self.detached)
            .finish()
    }
}

impl_random_access!(CursorMut);

impl<T> Index<isize> for CursorMut<'_, T> {
    type Output = T;

    fn index(&self, delta: isize) -> &T {
        item_at(
            self.items,
            offset_position::<T>(self.position, delta, self.items.len()),
        )
    }
}

impl<T> IndexMut<isize> for CursorMut<'_, T> {
    fn index_mut(&mut self, delta: isize) -> &mut T {
        let position = offset_position::<T>(self.position, delta, self.items.len());
        item_at_mut(self.items, position)
    }
}

impl<'a, T> From<CursorMut<'a, T>> for Cursor<'a, T> {
    fn from(value: CursorMut<'a, T>) -> Self {
        Self {
            items: value.items,
            position: value.position,
            detached: value.detached,
        }
    }
}

impl<'a, T> IntoIterator for CursorMut<'a, T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    /// Iterates from the cursor position to the end of the sequence.
    fn into_iter(self) -> Self::IntoIter {
        self.items
            .get_mut(self.position..)
            .expect("cursor positions are always within 0..=len")
            .iter_mut()
    }
}

/// A copyable random-access cursor over the elements of a
/// [`PointerSequence`][crate::PointerSequence], dereferencing through the owned boxes.
///
/// Obtained from [`PointerSequence::begin()`][crate::PointerSequence::begin] and
/// [`PointerSequence::end()`][crate::PointerSequence::end].
///
/// # Example
///
/// ```
/// use repeated_fields::PointerSequence;
///
/// let mut sequence = PointerSequence::<String>::new();
/// for word in ["a", "c", "d", "n", "p", "x", "y"] {
///     sequence.add().push_str(word);
/// }
///
/// // Binary search for the first element not less than "f".
/// let mut first = sequence.begin();
/// let mut count = sequence.end() - sequence.begin();
/// while count > 0 {
///     let step = count / 2;
///     let middle = first + step;
///     if middle.get().as_str() < "f" {
///         first = middle + 1;
///         count -= step + 1;
///     } else {
///         count = step;
///     }
/// }
///
/// assert_eq!(first.get(), "n");
/// assert!(first == sequence.begin() + 3);
/// ```
pub struct ElementCursor<'a, T> {
    inner: Cursor<'a, Box<T>>,
}

impl<'a, T> ElementCursor<'a, T> {
    pub(crate) fn new(slots: &'a [Box<T>], position: usize) -> Self {
        Self {
            inner: Cursor::new(slots, position),
        }
    }

    fn origin(&self) -> Origin {
        self.inner.origin()
    }

    fn move_by(&mut self, delta: isize) {
        self.inner.move_by(delta);
    }

    /// The index of the element this cursor points to.
    #[must_use]
    pub fn position(&self) -> usize {
        self.inner.position()
    }

    /// Whether the cursor is positioned one past the last element.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.inner.is_end()
    }

    /// The element the cursor points to.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is at the end position or is detached.
    #[must_use]
    pub fn get(&self) -> &'a T {
        self.inner.get()
    }

    /// Moves the cursor one element forward (pre-increment).
    ///
    /// # Panics
    ///
    /// Panics if the cursor is already at the end position.
    pub fn move_next(&mut self) -> &mut Self {
        self.move_by(1);
        self
    }

    /// Moves the cursor one element backward (pre-decrement).
    ///
    /// # Panics
    ///
    /// Panics if the cursor is already at the first position.
    pub fn move_prev(&mut self) -> &mut Self {
        self.move_by(-1);
        self
    }

    /// Moves the cursor one element forward, returning the cursor as it was before the move
    /// (post-increment).
    ///
    /// # Panics
    ///
    /// Panics if the cursor is already at the end position.
    pub fn post_increment(&mut self) -> Self {
        let previous = *self;
        self.move_by(1);
        previous
    }

    /// Moves the cursor one element backward, returning the cursor as it was before the move
    /// (post-decrement).
    ///
    /// # Panics
    ///
    /// Panics if the cursor is already at the first position.
    pub fn post_decrement(&mut self) -> Self {
        let previous = *self;
        self.move_by(-1);
        previous
    }

    /// Returns an iterator over the elements from this cursor up to (not including) `end`.
    ///
    /// # Panics
    ///
    /// Panics if the cursors belong to different sequences or `end` is before `self`.
    #[must_use]
    pub fn until(self, end: Self) -> Iter<'a, T> {
        Iter::new(self.inner.until(end.inner).as_slice())
    }
}

impl<T> Clone for ElementCursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ElementCursor<'_, T> {}

impl<T> Default for ElementCursor<'_, T> {
    fn default() -> Self {
        Self {
            inner: Cursor::default(),
        }
    }
}

impl<T> fmt::Debug for ElementCursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementCursor")
            .field("position", &self.inner.position)
            .field("len", &self.inner.items.len())
            .field("detached", &self.inner.detached)
            .finish()
    }
}

impl_random_access!(ElementCursor);

impl<T> Sub for ElementCursor<'_, T> {
    type Output = isize;

    /// The signed distance from `other` to `self`.
    ///
    /// # Panics
    ///
    /// Panics if the cursors belong to different sequences.
    fn sub(self, other: Self) -> isize {
        self.inner - other.inner
    }
}

impl<T> Index<isize> for ElementCursor<'_, T> {
    type Output = T;

    fn index(&self, delta: isize) -> &T {
        &self.inner[delta]
    }
}

impl<'a, T> IntoIterator for ElementCursor<'a, T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    /// Iterates from the cursor position to the end of the sequence.
    fn into_iter(self) -> Self::IntoIter {
        Iter::new(self.inner.into_iter().as_slice())
    }
}

/// A random-access cursor over exclusive elements of a
/// [`PointerSequence`][crate::PointerSequence], dereferencing through the owned boxes.
///
/// Obtained from [`PointerSequence::begin_mut()`][crate::PointerSequence::begin_mut].
/// Converts into a shared [`ElementCursor`] via `From`, never the other way around.
pub struct ElementCursorMut<'a, T> {
    inner: CursorMut<'a, Box<T>>,
}

impl<'a, T> ElementCursorMut<'a, T> {
    pub(crate) fn new(slots: &'a mut [Box<T>], position: usize) -> Self {
        Self {
            inner: CursorMut::new(slots, position),
        }
    }

    fn origin(&self) -> Origin {
        self.inner.origin()
    }

    fn move_by(&mut self, delta: isize) {
        self.inner.move_by(delta);
    }

    /// The index of the element this cursor points to.
    #[must_use]
    pub fn position(&self) -> usize {
        self.inner.position()
    }

    /// Whether the cursor is positioned one past the last element.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.inner.is_end()
    }

    /// The element the cursor points to.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is at the end position or is detached.
    #[must_use]
    pub fn get(&self) -> &T {
        self.inner.get()
    }

    /// Exclusive access to the element the cursor points to.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is at the end position or is detached.
    #[must_use]
    pub fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut()
    }

    /// Consumes the cursor, returning exclusive access to the element it points to for the
    /// full lifetime of the underlying borrow.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is at the end position or is detached.
    #[must_use]
    pub fn into_mut(self) -> &'a mut T {
        self.inner.into_mut()
    }

    /// Moves the cursor one element forward (pre-increment).
    ///
    /// # Panics
    ///
    /// Panics if the cursor is already at the end position.
    pub fn move_next(&mut self) -> &mut Self {
        self.move_by(1);
        self
    }

    /// Moves the cursor one element backward (pre-decrement).
    ///
    /// # Panics
    ///
    /// Panics if the cursor is already at the first position.
    pub fn move_prev(&mut self) -> &mut Self {
        self.move_by(-1);
        self
    }

    /// A shared cursor at the same position, borrowing from this one.
    #[must_use]
    pub fn as_cursor(&self) -> ElementCursor<'_, T> {
        ElementCursor {
            inner: self.inner.as_cursor(),
        }
    }
}

impl<T> Default for ElementCursorMut<'_, T> {
    fn default() -> Self {
        Self {
            inner: CursorMut::default(),
        }
    }
}

impl<T> fmt::Debug for ElementCursorMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementCursorMut")
            .field("position", &self.inner.position)
            .field("len", &self.inner.items.len())
            .field("detached", &self.inner.detached)
            .finish()
    }
}

impl_random_access!(ElementCursorMut);

impl<T> Index<isize> for ElementCursorMut<'_, T> {
    type Output = T;

    fn index(&self, delta: isize) -> &T {
        &self.inner[delta]
    }
}

impl<T> IndexMut<isize> for ElementCursorMut<'_, T> {
    fn index_mut(&mut self, delta: isize) -> &mut T {
        &mut self.inner[delta]
    }
}

impl<'a, T> From<ElementCursorMut<'a, T>> for ElementCursor<'a, T> {
    fn from(value: ElementCursorMut<'a, T>) -> Self {
        Self {
            inner: value.inner.into(),
        }
    }
}

impl<'a, T> IntoIterator for ElementCursorMut<'a, T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    /// Iterates from the cursor position to the end of the sequence.
    fn into_iter(self) -> Self::IntoIter {
        IterMut::new(self.inner.into_iter().into_slice())
    }
}
