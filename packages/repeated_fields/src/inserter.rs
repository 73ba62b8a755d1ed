//! Insertion adapters that let generic code append to a sequence through `Extend`.
//!
//! There are two flavors:
//!
//! * [`BackInserter`] copies. It works with both sequence types and accepts owned values or
//!   references.
//! * [`AllocatedBackInserter`] adopts. It works only with [`PointerSequence`] and accepts boxed
//!   objects, which become elements without being copied or reallocated.
//!
//! Both append in source order.

use std::fmt;

use crate::{PointerSequence, Recyclable, ValueSequence};

/// An insertion adapter that appends a copy of every value written to it.
///
/// Obtained from [`ValueSequence::back_inserter()`] or [`PointerSequence::back_inserter()`].
///
/// # Example
///
/// ```
/// use repeated_fields::PointerSequence;
///
/// let words = vec!["foo".to_string(), "bar".to_string()];
///
/// let mut field = PointerSequence::<String>::new();
/// field.back_inserter().extend(&words);
///
/// assert!(field.iter().eq(words.iter()));
/// ```
pub struct BackInserter<'a, S> {
    target: &'a mut S,
}

impl<'a, S> BackInserter<'a, S> {
    pub(crate) fn new(target: &'a mut S) -> Self {
        Self { target }
    }
}

impl<T, const INLINE: usize> BackInserter<'_, ValueSequence<T, INLINE>> {
    /// Appends `value` to the end of the sequence.
    pub fn push(&mut self, value: T) {
        self.target.add(value);
    }
}

impl<T, const INLINE: usize> Extend<T> for BackInserter<'_, ValueSequence<T, INLINE>> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.target.extend(iter);
    }
}

impl<'a, T: Clone + 'a, const INLINE: usize> Extend<&'a T>
    for BackInserter<'_, ValueSequence<T, INLINE>>
{
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.target.extend(iter);
    }
}

impl<T: Recyclable> BackInserter<'_, PointerSequence<T>> {
    /// Appends `value` as a new element, assigning it into an object obtained from
    /// [`PointerSequence::add()`] (which may be a recycled one).
    pub fn push(&mut self, value: T) {
        *self.target.add() = value;
    }

    /// Appends a copy of `value`, merged into an object obtained from
    /// [`PointerSequence::add()`]. A recycled object keeps its allocations.
    pub fn push_copy(&mut self, value: &T) {
        self.target.add().merge_from(value);
    }
}

impl<T: Recyclable> Extend<T> for BackInserter<'_, PointerSequence<T>> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.target.extend(iter);
    }
}

impl<'a, T: Recyclable + 'a> Extend<&'a T> for BackInserter<'_, PointerSequence<T>> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        for value in iter {
            self.push_copy(value);
        }
    }
}

impl<S> fmt::Debug for BackInserter<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackInserter").finish_non_exhaustive()
    }
}

/// An insertion adapter that adopts every boxed object written to it as a new element of a
/// [`PointerSequence`], via [`PointerSequence::add_allocated()`].
///
/// Obtained from [`PointerSequence::allocated_back_inserter()`].
pub struct AllocatedBackInserter<'a, T> {
    target: &'a mut PointerSequence<T>,
}

impl<'a, T> AllocatedBackInserter<'a, T> {
    pub(crate) fn new(target: &'a mut PointerSequence<T>) -> Self {
        Self { target }
    }

    /// Takes ownership of `value` and appends it as the new last element.
    pub fn push(&mut self, value: Box<T>) {
        self.target.add_allocated(value);
    }
}

impl<T> Extend<Box<T>> for AllocatedBackInserter<'_, T> {
    fn extend<I: IntoIterator<Item = Box<T>>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<T> fmt::Debug for AllocatedBackInserter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllocatedBackInserter")
            .finish_non_exhaustive()
    }
}
