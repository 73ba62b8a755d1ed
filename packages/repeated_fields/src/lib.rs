#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Growable sequence containers that serve as the storage of repeated fields in serialized
//! message types.
//!
//! There are two containers:
//!
//! * [`ValueSequence`] holds value elements (integers, floats, booleans, enums) directly. Small
//!   sequences live inline inside the container and only move to the heap once they outgrow
//!   their inline capacity.
//! * [`PointerSequence`] holds individually boxed objects (strings, nested messages). Elements that
//!   are removed are reset and kept for reuse, so a message that is cleared and refilled does not
//!   allocate again. Boxed objects can also be moved into and out of the sequence without copying.
//!
//! Both grow according to the same policy, [`next_capacity()`]: appending one element at a time
//! doubles the capacity, while an explicit [`reserve()`][ValueSequence::reserve] is honored
//! exactly.
//!
//! # Iteration and insertion
//!
//! Besides ordinary Rust iterators, both containers offer random-access cursors
//! ([`Cursor`], [`ElementCursor`] and their mutable counterparts) for algorithms that work with
//! positions, and insertion adapters ([`BackInserter`], [`AllocatedBackInserter`]) that implement
//! `Extend` for filling a sequence from any iterator.
//!
//! # Example
//!
//! ```
//! use repeated_fields::{PointerSequence, ValueSequence};
//!
//! let mut scores = ValueSequence::<u32>::new();
//! scores.add(90);
//! scores.add(75);
//! assert_eq!(scores.as_slice(), [90, 75]);
//!
//! let mut names = PointerSequence::<String>::new();
//! names.add().push_str("Alice");
//! names.add().push_str("Bob");
//!
//! names.clear();
//!
//! // The strings are kept for reuse.
//! assert_eq!(names.cleared_count(), 2);
//! names.add().push_str("Carol");
//! assert_eq!(names[0], "Carol");
//! ```
//!
//! # Logging
//!
//! Storage growth is reported through `tracing` at the trace level. The crate never installs a
//! subscriber.

mod cursor;
mod error;
mod growth;
mod inserter;
mod iter;
mod pointer_sequence;
mod recyclable;
mod value_sequence;

pub use cursor::*;
pub use error::Error;
pub(crate) use error::Result;
pub use growth::next_capacity;
pub use inserter::*;
pub use iter::*;
pub use pointer_sequence::*;
pub use recyclable::*;
pub use value_sequence::*;
