use std::any::type_name;

use crate::{Error, Result};

/// Calculates the capacity to grow a sequence to, given its current capacity and the minimum
/// capacity that the caller needs.
///
/// The result is the larger of `requested_minimum` and double the current capacity. Incremental
/// appends therefore see amortized doubling, while an explicit large reservation is honored
/// exactly instead of being rounded up.
///
/// Both sequence types only call this when growth is actually needed, that is, when
/// `requested_minimum` exceeds `current_capacity`.
///
/// # Example
///
/// ```
/// use repeated_fields::next_capacity;
///
/// // A fresh heap allocation is sized exactly as requested.
/// assert_eq!(next_capacity(0, 20), 20);
///
/// // Growing by a little still doubles.
/// assert_eq!(next_capacity(20, 21), 40);
///
/// // Growing by a lot takes the request as-is.
/// assert_eq!(next_capacity(20, 100), 100);
/// ```
#[must_use]
pub fn next_capacity(current_capacity: usize, requested_minimum: usize) -> usize {
    debug_assert!(
        requested_minimum > current_capacity,
        "growth requested to {requested_minimum} but capacity is already {current_capacity}"
    );

    current_capacity.saturating_mul(2).max(requested_minimum)
}

/// Moves the contents of `storage` into a new buffer with exactly `new_capacity` slots.
///
/// Never call `Vec::reserve()` on sequence storage, it may round the capacity up.
pub(crate) fn regrow<T>(storage: &mut Vec<T>, new_capacity: usize) {
    debug_assert!(new_capacity >= storage.len());

    let mut replacement = Vec::with_capacity(new_capacity);
    replacement.append(storage);
    *storage = replacement;
}

/// Fallible counterpart of [`regrow()`]. On failure, `storage` is left untouched.
pub(crate) fn try_regrow<T>(storage: &mut Vec<T>, new_capacity: usize) -> Result<()> {
    debug_assert!(new_capacity >= storage.len());

    let mut replacement = Vec::new();
    replacement
        .try_reserve_exact(new_capacity)
        .map_err(|source| Error::AllocationFailed {
            requested: new_capacity,
            element_type: type_name::<T>(),
            source,
        })?;

    replacement.append(storage);
    *storage = replacement;
    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn first_growth_is_exact() {
        assert_eq!(next_capacity(0, 1), 1);
        assert_eq!(next_capacity(0, 5), 5);
        assert_eq!(next_capacity(0, 20), 20);
    }

    #[test]
    fn small_request_doubles() {
        assert_eq!(next_capacity(4, 5), 8);
        assert_eq!(next_capacity(20, 30), 40);
        assert_eq!(next_capacity(20, 40), 40);
    }

    #[test]
    fn large_request_is_honored_exactly() {
        assert_eq!(next_capacity(20, 41), 41);
        assert_eq!(next_capacity(1, 1000), 1000);
    }

    #[test]
    fn doubling_saturates() {
        assert_eq!(next_capacity(usize::MAX / 2 + 1, usize::MAX), usize::MAX);
        assert_eq!(next_capacity(usize::MAX - 1, usize::MAX), usize::MAX);
    }

    #[test]
    fn regrow_keeps_contents_and_sets_capacity() {
        let mut storage = Vec::with_capacity(2);
        storage.push(1_u32);
        storage.push(2);

        regrow(&mut storage, 7);

        assert_eq!(storage, [1, 2]);
        assert_eq!(storage.capacity(), 7);
    }

    #[test]
    fn try_regrow_failure_leaves_storage_untouched() {
        let mut storage = vec![1_u64, 2, 3];
        let original_ptr = storage.as_ptr();

        let result = try_regrow(&mut storage, usize::MAX);

        assert!(matches!(result, Err(Error::AllocationFailed { requested, .. }) if requested == usize::MAX));
        assert_eq!(storage, [1, 2, 3]);
        assert_eq!(storage.as_ptr(), original_ptr);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "growth requested")]
    fn growth_without_need_is_rejected() {
        _ = next_capacity(10, 10);
    }
}
