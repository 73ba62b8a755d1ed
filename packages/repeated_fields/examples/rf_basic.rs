//! Basic usage of the `repeated_fields` crate:
//!
//! * Storing scalar values in a `ValueSequence`.
//! * Storing strings in a `PointerSequence` and reusing them after a clear.
//! * Moving boxed objects in and out without copying.
//! * Filling sequences from iterators.

use repeated_fields::{PointerSequence, ValueSequence};

fn main() {
    let mut scores = ValueSequence::<u32>::new();

    scores.add(90);
    scores.add(75);
    scores.add(82);

    // Up to four values fit inside the sequence itself, without a heap allocation.
    println!(
        "Value sequence holds {} items in a capacity of {}, using {} heap bytes",
        scores.len(),
        scores.capacity(),
        scores.space_used_excluding_self()
    );

    scores.back_inserter().extend([64, 99, 71]);

    println!(
        "After growing past the inline capacity: {} items, capacity {}, {} heap bytes",
        scores.len(),
        scores.capacity(),
        scores.space_used_excluding_self()
    );

    let mut names = PointerSequence::<String>::new();

    names.add().push_str("Alice");
    names.add().push_str("Bob");

    println!("Names: {names:?}");

    // Clearing keeps the strings around for reuse by the next `add()`.
    names.clear();
    println!(
        "After clear: {} names, {} cleared strings held for reuse",
        names.len(),
        names.cleared_count()
    );

    names.add().push_str("Carol");
    println!("Reused a cleared string for: {}", names[0]);

    // Boxed objects can be handed over and taken back without copying.
    names.add_allocated(Box::new("Dave".to_string()));
    let dave = names.release_last();
    println!("Took back ownership of: {dave}");

    let guests = ["Erin", "Frank"].map(String::from);
    names.back_inserter().extend(&guests);

    for (index, name) in names.iter().enumerate() {
        println!("Name #{index}: {name}");
    }
}
