use std::collections::TryReserveError;

use thiserror::Error;

/// Errors that can occur when growing a sequence through one of the fallible methods.
///
/// The infallible methods (e.g. `reserve()` and `add()`) treat allocation failure as fatal,
/// like the standard collections do.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The memory allocator could not provide storage for the requested number of slots, or the
    /// request was too large to even describe as an allocation.
    #[error("failed to allocate storage for {requested} slots of {element_type}")]
    AllocationFailed {
        /// The total capacity (in elements or pointer slots) that was being allocated.
        requested: usize,

        /// Name of the type stored in each slot.
        element_type: &'static str,

        /// The underlying reservation failure.
        #[source]
        source: TryReserveError,
    },
}

/// A specialized `Result` type for sequence operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
