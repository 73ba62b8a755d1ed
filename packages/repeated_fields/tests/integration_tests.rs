//! Integration tests that use both sequence types the way message types do: as the repeated
//! fields of nested, recyclable messages.

#![allow(
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    reason = "panic is fine in tests"
)]

use std::ptr;

use repeated_fields::{Cursor, ElementCursor, PointerSequence, Recyclable, ValueSequence};

#[derive(Debug, Default, PartialEq, Eq)]
struct PhoneNumber {
    number: String,
    kind: i32,
}

impl Recyclable for PhoneNumber {
    fn reset(&mut self) {
        self.number.reset();
        self.kind.reset();
    }

    fn merge_from(&mut self, other: &Self) {
        self.number.merge_from(&other.number);
        self.kind.merge_from(&other.kind);
    }

    fn space_used_excluding_self(&self) -> usize {
        self.number.space_used_excluding_self()
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Person {
    name: String,
    lucky_numbers: ValueSequence<i64>,
    phones: PointerSequence<PhoneNumber>,
}

impl Recyclable for Person {
    fn reset(&mut self) {
        self.name.reset();
        self.lucky_numbers.clear();
        self.phones.clear();
    }

    fn merge_from(&mut self, other: &Self) {
        self.name.merge_from(&other.name);
        self.lucky_numbers.merge_from(&other.lucky_numbers);
        self.phones.merge_from(&other.phones);
    }

    fn space_used_excluding_self(&self) -> usize {
        self.name.space_used_excluding_self()
            + self.lucky_numbers.space_used_excluding_self()
            + self.phones.space_used_excluding_self()
    }
}

fn fill_person(person: &mut Person, name: &str, phone_count: usize) {
    person.name.push_str(name);

    for i in 0..phone_count {
        let phone = person.phones.add();
        phone.number.push_str(&format!("555-{i:04}"));
        phone.kind = i32::try_from(i).unwrap();
    }

    for i in 0..10 {
        person.lucky_numbers.add(i * 7);
    }
}

#[test]
fn refill_reuses_nested_objects() {
    let mut people = PointerSequence::<Person>::new();

    fill_person(people.add(), "Alice", 3);
    fill_person(people.add(), "Bob", 1);

    let alice = ptr::from_ref(people.get(0));
    let alice_first_phone = ptr::from_ref(people.get(0).phones.get(0));
    let space_before = people.space_used_excluding_self();

    people.clear();

    assert!(people.is_empty());
    assert_eq!(people.cleared_count(), 2);
    // Cleared objects keep everything they own.
    assert_eq!(people.space_used_excluding_self(), space_before);

    let person = people.add();
    assert!(person.name.is_empty());
    assert!(person.lucky_numbers.is_empty());
    assert!(person.phones.is_empty());
    assert_eq!(person.phones.cleared_count(), 3);

    fill_person(person, "Carol", 2);

    assert_eq!(ptr::from_ref(people.get(0)), alice);
    assert_eq!(ptr::from_ref(people.get(0).phones.get(0)), alice_first_phone);
    assert_eq!(people[0].name, "Carol");
    assert_eq!(people[0].phones[1].number, "555-0001");
    assert_eq!(people[0].phones.cleared_count(), 1);
}

#[test]
fn merge_is_a_deep_copy() {
    let mut source = PointerSequence::<Person>::new();
    fill_person(source.add(), "Alice", 2);

    let mut destination = PointerSequence::<Person>::new();
    fill_person(destination.add(), "Zed", 0);

    destination.merge_from(&source);

    assert_eq!(destination.len(), 2);
    assert_eq!(destination[0].name, "Zed");
    assert_eq!(destination[1], source[0]);

    // Modifying the copy leaves the source alone.
    destination[1].phones[0].number.push('!');
    destination[1].lucky_numbers.set(0, -1);

    assert_eq!(source[0].phones[0].number, "555-0000");
    assert_eq!(*source[0].lucky_numbers.get(0), 0);
}

#[test]
fn clone_drops_cleared_objects_but_keeps_elements() {
    let mut people = PointerSequence::<Person>::new();
    fill_person(people.add(), "Alice", 1);
    fill_person(people.add(), "Bob", 1);
    people.remove_last();

    let clone = people.clone();

    assert_eq!(clone, people);
    assert_eq!(clone.cleared_count(), 0);
    assert_eq!(people.cleared_count(), 1);
}

#[test]
fn released_objects_can_move_between_sequences() {
    let mut first = PointerSequence::<Person>::new();
    let mut second = PointerSequence::<Person>::new();

    fill_person(first.add(), "Alice", 1);
    let address = ptr::from_ref(first.get(0));

    let alice = first.release_last();
    second.add_allocated(alice);

    assert!(first.is_empty());
    assert_eq!(first.cleared_count(), 0);
    assert_eq!(ptr::from_ref(second.get(0)), address);
    assert_eq!(second[0].name, "Alice");
}

#[test]
fn swap_exchanges_whole_fields() {
    let mut alice = Person::default();
    let mut bob = Person::default();
    fill_person(&mut alice, "Alice", 3);
    fill_person(&mut bob, "Bob", 1);

    alice.phones.swap(&mut bob.phones);
    alice.lucky_numbers.swap(&mut bob.lucky_numbers);

    assert_eq!(alice.phones.len(), 1);
    assert_eq!(bob.phones.len(), 3);
    assert_eq!(alice.lucky_numbers.len(), 10);
}

#[test]
fn value_lower_bound_with_cursors() {
    fn lower_bound<'a>(
        mut first: Cursor<'a, i32>,
        last: Cursor<'a, i32>,
        value: i32,
    ) -> Cursor<'a, i32> {
        let mut count = last - first;

        while count > 0 {
            let step = count / 2;
            let middle = first + step;

            if *middle.get() < value {
                first = middle + 1;
                count -= step + 1;
            } else {
                count = step;
            }
        }

        first
    }

    let field: ValueSequence<i32> = [3, 5, 8, 13, 21, 34].into_iter().collect();

    let found = lower_bound(field.begin(), field.end(), 10);
    assert!(found == field.begin() + 3);
    assert_eq!(*found.get(), 13);
    assert_eq!(found - field.begin(), 3);

    let past_all = lower_bound(field.begin(), field.end(), 100);
    assert!(past_all == field.end());
    assert!(past_all.is_end());
}

#[test]
fn pointer_lower_bound_with_element_cursors() {
    let mut field = PointerSequence::<String>::new();
    for word in ["a", "c", "d", "n", "p", "x", "y"] {
        field.add().push_str(word);
    }

    let position = field
        .begin()
        .until(field.end())
        .position(|word| word.as_str() >= "f")
        .unwrap();

    let cursor = field.begin() + isize::try_from(position).unwrap();
    assert_eq!(cursor.get(), "n");
    assert!(cursor == field.begin() + 3);
    assert!(cursor > field.begin());
    assert!(cursor < field.end());
}

#[test]
fn cursor_relational_operators() {
    let field: ValueSequence<i32> = (0..5).collect();

    let begin = field.begin();
    let middle = begin + 2;
    let end = field.end();

    assert!(begin < middle && middle < end);
    assert!(begin <= middle && end >= middle);
    assert!(end > begin);
    assert_eq!(end - begin, 5);
    assert_eq!(begin - end, -5);
    assert_eq!(middle[-1], 1);
    assert_eq!(middle[2], 4);
    assert_eq!(*(end - 1).get(), 4);

    let mut moving = begin;
    moving += 4;
    moving -= 1;
    assert_eq!(*moving.get(), 3);

    let before = moving.post_decrement();
    assert_eq!(*before.get(), 3);
    assert_eq!(*moving.get(), 2);
}

#[test]
fn default_cursors_are_detached() {
    let field: ValueSequence<i32> = (0..3).collect();
    let detached = Cursor::<i32>::default();

    assert!(detached != field.begin());
    assert!(detached != field.end());
    assert!(detached.partial_cmp(&field.begin()).is_none());

    let mut empty = PointerSequence::<String>::new();
    assert!(ElementCursor::<String>::default() != empty.begin());
    assert!(empty.begin() == empty.end());

    empty.add();
    assert!(ElementCursor::<String>::default() != empty.end());
}

#[test]
fn cursors_of_different_sequences_are_unordered() {
    let first: ValueSequence<i32> = (0..3).collect();
    let second: ValueSequence<i32> = (0..3).collect();

    assert!(first.begin() != second.begin());
    assert!(first.begin().partial_cmp(&second.begin()).is_none());
}

#[test]
fn cursor_iteration() {
    let field: ValueSequence<i32> = (1..=5).collect();

    let tail: Vec<i32> = (field.begin() + 2).into_iter().copied().collect();
    assert_eq!(tail, [3, 4, 5]);

    let middle: Vec<i32> = (field.begin() + 1).until(field.end() - 1).copied().collect();
    assert_eq!(middle, [2, 3, 4]);

    let mut cursor = field.begin();
    let mut sum = 0;
    while cursor != field.end() {
        sum += *cursor.post_increment().get();
    }
    assert_eq!(sum, 15);
}

#[test]
fn pointer_view_sort_with_comparator() {
    let mut field = PointerSequence::<String>::new();
    for word in ["bbb", "a", "cc"] {
        field.add().push_str(word);
    }
    let longest = ptr::from_ref(field.get(0));

    // Sort by descending length; only ownership records move.
    field.pointers_mut().sort_by(|a, b| b.len().cmp(&a.len()));

    assert!(field.iter().eq(["bbb", "cc", "a"].iter()));
    assert_eq!(ptr::from_ref(field.get(0)), longest);
}

#[test]
fn pointer_view_cursor_reads_boxes() {
    let mut field = PointerSequence::<String>::new();
    field.add().push_str("first");
    field.add().push_str("second");

    let boxes: Vec<_> = field.pointer_begin().until(field.pointer_end()).collect();
    assert_eq!(boxes.len(), 2);
    assert_eq!(boxes[1].as_str(), "second");

    let mut cursor = field.pointer_end_mut() - 1;
    *cursor.get_mut() = Box::new("replaced".to_string());
    assert_eq!(field[1], "replaced");
}

#[test]
fn heap_sequences_survive_recycling() {
    let mut outer = PointerSequence::<ValueSequence<u16>>::new();

    outer.add().extend(0..100);
    let space = outer.space_used_excluding_self();

    outer.clear();
    let recycled = outer.add();

    assert!(recycled.is_empty());
    assert!(recycled.capacity() >= 100);
    assert_eq!(outer.space_used_excluding_self(), space);
}
