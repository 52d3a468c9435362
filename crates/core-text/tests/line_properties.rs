use core_text::width::{advance, column_of};
use core_text::{Document, Location, MAX_LINE_CAPACITY};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Edit {
    Insert(u8),
    Backspace,
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        3 => (0x20u8..0x7f).prop_map(Edit::Insert),
        1 => Just(Edit::Backspace),
    ]
}

fn line_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop_oneof![4 => 0x20u8..0x7f, 1 => Just(b'\t')], 0..=MAX_LINE_CAPACITY)
}

proptest! {
    // Appending edits mirror a plain Vec model: length and content always agree.
    #[test]
    fn insert_then_read_round_trip(edits in prop::collection::vec(edit_strategy(), 0..200)) {
        let mut doc = Document::with_budget(64 * 1024).unwrap();
        let mut loc = Location::start_of(doc.head());
        let mut model: Vec<u8> = Vec::new();
        for edit in edits {
            match edit {
                Edit::Insert(b) => {
                    if model.len() == MAX_LINE_CAPACITY {
                        continue;
                    }
                    doc.insert(&mut loc, b).unwrap();
                    model.push(b);
                }
                Edit::Backspace => {
                    doc.delete_before(&mut loc).unwrap();
                    model.pop();
                }
            }
            prop_assert_eq!(doc.line_len(loc.line), model.len());
            prop_assert_eq!(doc.text(loc.line), model.as_slice());
            prop_assert!(doc.line_len(loc.line) <= doc.capacity(loc.line));
            prop_assert_eq!(loc.offset, model.len());
        }
        prop_assert_eq!(doc.line_count(), 1);
    }

    #[test]
    fn split_preserves_concatenation(bytes in line_bytes(), cut in 0usize..=MAX_LINE_CAPACITY) {
        let mut doc = Document::with_budget(64 * 1024).unwrap();
        let mut loc = Location::start_of(doc.head());
        for &b in &bytes {
            doc.insert(&mut loc, b).unwrap();
        }
        let k = cut.min(bytes.len());
        let first = loc.line;
        loc.offset = k;
        let second = doc.split(&mut loc).unwrap();

        prop_assert_eq!(doc.line_len(first), k);
        prop_assert_eq!(doc.line_len(second), bytes.len() - k);
        let mut joined = doc.text(first).to_vec();
        joined.extend_from_slice(doc.text(second));
        prop_assert_eq!(joined, bytes);
        prop_assert_eq!(doc.next(first), Some(second));
        prop_assert_eq!(doc.prev(second), Some(first));
    }

    // Tracking the column through single right moves matches recomputing it from scratch.
    #[test]
    fn column_is_idempotent(bytes in line_bytes(), origin in 0usize..40) {
        let mut tracked = origin;
        for offset in 0..=bytes.len() {
            prop_assert_eq!(column_of(&bytes, offset, origin), tracked);
            prop_assert_eq!(column_of(&bytes, offset, origin), column_of(&bytes, offset, origin));
            if offset < bytes.len() {
                tracked = advance(tracked, bytes[offset]);
            }
        }
    }
}
