/// An object that can be stored in a [`PointerSequence`][crate::PointerSequence] and recycled
/// through its pool of cleared objects.
///
/// When an element is removed from a pointer sequence, the sequence keeps the allocated object
/// and calls [`reset()`][Self::reset] on it instead of dropping it. A later `add()` hands the
/// same object out again. Implementations should therefore keep any owned allocations (string
/// buffers, nested storage) across a reset, so that reuse is as cheap as possible.
///
/// # Example
///
/// ```
/// use repeated_fields::{PointerSequence, Recyclable};
///
/// #[derive(Debug, Default)]
/// struct Person {
///     name: String,
///     age: u32,
/// }
///
/// impl Recyclable for Person {
///     fn reset(&mut self) {
///         self.name.reset();
///         self.age = 0;
///     }
///
///     fn merge_from(&mut self, other: &Self) {
///         self.name.merge_from(&other.name);
///         self.age = other.age;
///     }
///
///     fn space_used_excluding_self(&self) -> usize {
///         self.name.space_used_excluding_self()
///     }
/// }
///
/// let mut people = PointerSequence::<Person>::new();
/// people.add().name.push_str("Alice");
/// people.remove_last();
///
/// // The recycled object is back in its default state.
/// assert!(people.add().name.is_empty());
/// ```
pub trait Recyclable: Default {
    /// Returns the object to its default (empty) state.
    ///
    /// After this call the object must compare equal (where equality is defined) to a freshly
    /// default-constructed instance, though it may retain allocated capacity.
    fn reset(&mut self);

    /// Merges the contents of `other` into `self`.
    ///
    /// For scalar and string-like types this is a plain copy. For composite types, repeated
    /// contents are appended. Merging into a freshly reset object is equivalent to a copy.
    fn merge_from(&mut self, other: &Self);

    /// The number of heap bytes owned by this object, not counting `size_of::<Self>()`.
    fn space_used_excluding_self(&self) -> usize {
        0
    }
}

impl Recyclable for String {
    fn reset(&mut self) {
        self.clear();
    }

    fn merge_from(&mut self, other: &Self) {
        self.clone_from(other);
    }

    fn space_used_excluding_self(&self) -> usize {
        self.capacity()
    }
}

impl<T: Clone> Recyclable for Vec<T> {
    fn reset(&mut self) {
        self.clear();
    }

    fn merge_from(&mut self, other: &Self) {
        self.extend_from_slice(other);
    }

    fn space_used_excluding_self(&self) -> usize {
        self.capacity()
            .checked_mul(size_of::<T>())
            .expect("an existing allocation cannot be larger than the address space")
    }
}

macro_rules! impl_recyclable_for_scalars {
    ($($scalar:ty),* $(,)?) => {
        $(
            impl Recyclable for $scalar {
                fn reset(&mut self) {
                    *self = <$scalar>::default();
                }

                fn merge_from(&mut self, other: &Self) {
                    *self = *other;
                }
            }
        )*
    };
}

impl_recyclable_for_scalars!(
    bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn string_reset_keeps_capacity() {
        let mut value = String::with_capacity(64);
        value.push_str("hello");

        value.reset();

        assert!(value.is_empty());
        assert!(value.capacity() >= 64);
        assert!(value.space_used_excluding_self() >= 64);
    }

    #[test]
    fn string_merge_is_copy() {
        let mut value = "old".to_string();
        value.merge_from(&"new".to_string());
        assert_eq!(value, "new");
    }

    #[test]
    fn vec_merge_appends() {
        let mut value = vec![1, 2];
        value.merge_from(&vec![3, 4]);
        assert_eq!(value, [1, 2, 3, 4]);

        value.reset();
        assert!(value.is_empty());
        assert!(value.space_used_excluding_self() >= 4 * size_of::<i32>());
    }

    #[test]
    fn scalar_reset_and_merge() {
        let mut value = 42_u64;
        value.reset();
        assert_eq!(value, 0);

        value.merge_from(&7);
        assert_eq!(value, 7);
        assert_eq!(value.space_used_excluding_self(), 0);

        let mut flag = true;
        flag.reset();
        assert!(!flag);
    }
}
