//! Size-class line allocator.
//!
//! Every `Line` lives in a single `LineArena` and is addressed through a
//! stable `LineId` handle. Capacities are restricted to a handful of coarse
//! size classes; a request rounds up to the smallest class that fits it.
//!
//! Lifecycle:
//! * A fresh line is carved from the arena budget (bump style, word aligned).
//!   The budget is never returned: released lines go back to the free list of
//!   their class and are handed out again before any new budget is consumed.
//! * Free lists are singly linked through the same `next` field the document
//!   uses for adjacency, so a line is on exactly one of {document, free list}.
//! * Lines never grow in place. `grow` reallocates one class up, copies the
//!   payload, moves the neighbours' links over to the new handle and releases
//!   the old one. Callers must replace every handle they hold to the old line.
//!
//! Failure modes (`AllocError`) are both fatal for an editing session: asking
//! for more than `MAX_LINE_CAPACITY` bytes, or running out of arena budget.
//! The allocator reports them and leaves teardown to the caller.

use std::ops::Range;
use thiserror::Error;
use tracing::{debug, trace};

/// Configured line capacities, smallest first.
pub const SIZE_CLASSES: [usize; 4] = [8, 32, 64, 128];

/// Largest capacity a single line can ever have.
pub const MAX_LINE_CAPACITY: usize = SIZE_CLASSES[SIZE_CLASSES.len() - 1];

/// Arena bytes charged per fresh line on top of its payload (links, length, capacity).
pub const LINE_HEADER_BYTES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocError {
    #[error("requested line too large: {requested} bytes exceeds largest size class ({max})")]
    LineTooLarge { requested: usize, max: usize },
    #[error("out of memory, could not allocate line ({requested} bytes needed, {remaining} left)")]
    ArenaExhausted { requested: usize, remaining: usize },
}

/// Stable handle to a line slot inside a `LineArena`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(u32);

impl LineId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index into `SIZE_CLASSES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SizeClass(usize);

impl SizeClass {
    /// Smallest class able to hold `min_size` bytes.
    pub fn for_size(min_size: usize) -> Result<Self, AllocError> {
        SIZE_CLASSES
            .iter()
            .position(|&cap| min_size <= cap)
            .map(SizeClass)
            .ok_or(AllocError::LineTooLarge {
                requested: min_size,
                max: MAX_LINE_CAPACITY,
            })
    }

    pub fn capacity(self) -> usize {
        SIZE_CLASSES[self.0]
    }
}

#[derive(Debug)]
struct LineSlot {
    prev: Option<LineId>,
    next: Option<LineId>,
    len: usize,
    class: SizeClass,
    live: bool,
    data: Box<[u8]>,
}

#[derive(Debug)]
pub struct LineArena {
    slots: Vec<LineSlot>,
    free_heads: [Option<LineId>; SIZE_CLASSES.len()],
    budget: usize,
    used: usize,
}

impl LineArena {
    /// Arena with `budget` bytes of backing memory.
    pub fn new(budget: usize) -> Self {
        Self {
            slots: Vec::new(),
            free_heads: [None; SIZE_CLASSES.len()],
            budget,
            used: 0,
        }
    }

    /// Arena bytes a fresh line of `capacity` consumes, rounded to the next word.
    pub const fn charge(capacity: usize) -> usize {
        ((LINE_HEADER_BYTES + capacity) / 4 + 1) * 4
    }

    /// Bytes of backing memory not yet carved into lines.
    pub fn free_bytes(&self) -> usize {
        self.budget - self.used
    }

    /// Return a line whose capacity is the smallest size class >= `min_size`.
    pub fn allocate(&mut self, min_size: usize) -> Result<LineId, AllocError> {
        let class = SizeClass::for_size(min_size)?;
        self.take(class)
    }

    fn take(&mut self, class: SizeClass) -> Result<LineId, AllocError> {
        if let Some(id) = self.free_heads[class.0] {
            let slot = &mut self.slots[id.index()];
            self.free_heads[class.0] = slot.next;
            slot.prev = None;
            slot.next = None;
            slot.len = 0;
            slot.live = true;
            trace!(target: "text.alloc", line = id.0, capacity = class.capacity(), "reuse");
            return Ok(id);
        }

        let cost = Self::charge(class.capacity());
        let remaining = self.free_bytes();
        if cost >= remaining {
            return Err(AllocError::ArenaExhausted {
                requested: cost,
                remaining,
            });
        }
        self.used += cost;
        let id = LineId(self.slots.len() as u32);
        self.slots.push(LineSlot {
            prev: None,
            next: None,
            len: 0,
            class,
            live: true,
            data: vec![0; class.capacity()].into_boxed_slice(),
        });
        trace!(
            target: "text.alloc",
            line = id.0,
            capacity = class.capacity(),
            remaining = self.free_bytes(),
            "fresh"
        );
        Ok(id)
    }

    /// Push `id` onto its class free list. The handle must not be used afterwards.
    pub fn release(&mut self, id: LineId) {
        let slot = &mut self.slots[id.index()];
        debug_assert!(slot.live, "double release of line {id:?}");
        let class = slot.class;
        slot.live = false;
        slot.len = 0;
        slot.prev = None;
        slot.next = self.free_heads[class.0];
        self.free_heads[class.0] = Some(id);
        trace!(target: "text.alloc", line = id.0, capacity = class.capacity(), "release");
    }

    /// Reallocate `id` one size class up, preserving payload and adjacency.
    pub fn grow(&mut self, id: LineId) -> Result<LineId, AllocError> {
        let (capacity, len, prev, next) = {
            let slot = self.slot(id);
            (slot.class.capacity(), slot.len, slot.prev, slot.next)
        };
        let class = SizeClass::for_size(capacity + 1)?;
        let grown = self.take(class)?;

        self.copy_between(id, 0..len, grown, 0);
        {
            let slot = &mut self.slots[grown.index()];
            slot.len = len;
            slot.prev = prev;
            slot.next = next;
        }
        if let Some(p) = prev {
            self.slots[p.index()].next = Some(grown);
        }
        if let Some(n) = next {
            self.slots[n.index()].prev = Some(grown);
        }
        self.release(id);

        debug!(
            target: "text.alloc",
            from = id.0,
            to = grown.0,
            capacity = class.capacity(),
            len,
            "grow"
        );
        Ok(grown)
    }

    fn slot(&self, id: LineId) -> &LineSlot {
        let slot = &self.slots[id.index()];
        debug_assert!(slot.live, "access to released line {id:?}");
        slot
    }

    fn slot_mut(&mut self, id: LineId) -> &mut LineSlot {
        let slot = &mut self.slots[id.index()];
        debug_assert!(slot.live, "access to released line {id:?}");
        slot
    }

    fn pair_mut(&mut self, a: LineId, b: LineId) -> (&mut LineSlot, &mut LineSlot) {
        let (ai, bi) = (a.index(), b.index());
        assert_ne!(ai, bi, "pair_mut on a single line");
        if ai < bi {
            let (left, right) = self.slots.split_at_mut(bi);
            (&mut left[ai], &mut right[0])
        } else {
            let (left, right) = self.slots.split_at_mut(ai);
            (&mut right[0], &mut left[bi])
        }
    }

    pub fn is_live(&self, id: LineId) -> bool {
        self.slots.get(id.index()).is_some_and(|s| s.live)
    }

    pub fn len(&self, id: LineId) -> usize {
        self.slot(id).len
    }

    pub fn capacity(&self, id: LineId) -> usize {
        self.slot(id).class.capacity()
    }

    /// The `len` used bytes of the line.
    pub fn bytes(&self, id: LineId) -> &[u8] {
        let slot = self.slot(id);
        &slot.data[..slot.len]
    }

    pub fn prev(&self, id: LineId) -> Option<LineId> {
        self.slot(id).prev
    }

    pub fn next(&self, id: LineId) -> Option<LineId> {
        self.slot(id).next
    }

    /// Number of lines waiting on the free list for `capacity`'s class.
    pub fn free_list_len(&self, capacity: usize) -> usize {
        let Ok(class) = SizeClass::for_size(capacity) else {
            return 0;
        };
        let mut count = 0;
        let mut it = self.free_heads[class.0];
        while let Some(id) = it {
            count += 1;
            it = self.slots[id.index()].next;
        }
        count
    }

    pub(crate) fn set_len(&mut self, id: LineId, len: usize) {
        let slot = self.slot_mut(id);
        debug_assert!(len <= slot.class.capacity());
        slot.len = len;
    }

    /// Full-capacity payload, including bytes past `len`.
    pub(crate) fn data_mut(&mut self, id: LineId) -> &mut [u8] {
        &mut self.slot_mut(id).data
    }

    pub(crate) fn set_prev(&mut self, id: LineId, prev: Option<LineId>) {
        self.slot_mut(id).prev = prev;
    }

    pub(crate) fn set_next(&mut self, id: LineId, next: Option<LineId>) {
        self.slot_mut(id).next = next;
    }

    pub(crate) fn copy_between(
        &mut self,
        src: LineId,
        range: Range<usize>,
        dst: LineId,
        at: usize,
    ) {
        if range.is_empty() {
            return;
        }
        let (s, d) = self.pair_mut(src, dst);
        d.data[at..at + range.len()].copy_from_slice(&s.data[range]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_up_to_smallest_class() {
        let mut arena = LineArena::new(4096);
        let cases = [
            (0, 8),
            (1, 8),
            (8, 8),
            (9, 32),
            (32, 32),
            (33, 64),
            (65, 128),
            (128, 128),
        ];
        for (request, expected) in cases {
            let id = arena.allocate(request).unwrap();
            assert_eq!(arena.capacity(id), expected, "request {request}");
            assert_eq!(arena.len(id), 0);
        }
    }

    #[test]
    fn oversized_request_is_rejected() {
        let mut arena = LineArena::new(4096);
        let err = arena.allocate(129).unwrap_err();
        assert_eq!(
            err,
            AllocError::LineTooLarge {
                requested: 129,
                max: MAX_LINE_CAPACITY
            }
        );
    }

    #[test]
    fn released_lines_are_reused_before_fresh_budget() {
        let mut arena = LineArena::new(4096);
        let a = arena.allocate(8).unwrap();
        let before = arena.free_bytes();
        arena.release(a);
        assert_eq!(arena.free_list_len(8), 1);
        let b = arena.allocate(5).unwrap();
        assert_eq!(a, b);
        assert_eq!(arena.free_bytes(), before);
        assert_eq!(arena.free_list_len(8), 0);
    }

    #[test]
    fn free_lists_are_per_class() {
        let mut arena = LineArena::new(4096);
        let small = arena.allocate(8).unwrap();
        arena.release(small);
        let big = arena.allocate(30).unwrap();
        assert_ne!(small, big);
        assert_eq!(arena.capacity(big), 32);
        assert_eq!(arena.free_list_len(8), 1);
    }

    #[test]
    fn exhaustion_reports_remaining_budget() {
        let cost = LineArena::charge(8);
        let mut arena = LineArena::new(cost * 2);
        arena.allocate(8).unwrap();
        let err = arena.allocate(8).unwrap_err();
        assert_eq!(
            err,
            AllocError::ArenaExhausted {
                requested: cost,
                remaining: cost
            }
        );
    }

    #[test]
    fn grow_copies_payload_and_rewires_neighbours() {
        let mut arena = LineArena::new(4096);
        let a = arena.allocate(8).unwrap();
        let b = arena.allocate(8).unwrap();
        let c = arena.allocate(8).unwrap();
        arena.set_next(a, Some(b));
        arena.set_prev(b, Some(a));
        arena.set_next(b, Some(c));
        arena.set_prev(c, Some(b));
        arena.data_mut(b)[..3].copy_from_slice(b"xyz");
        arena.set_len(b, 3);

        let grown = arena.grow(b).unwrap();
        assert_ne!(grown, b);
        assert!(!arena.is_live(b));
        assert_eq!(arena.capacity(grown), 32);
        assert_eq!(arena.bytes(grown), b"xyz");
        assert_eq!(arena.next(a), Some(grown));
        assert_eq!(arena.prev(c), Some(grown));
        assert_eq!(arena.prev(grown), Some(a));
        assert_eq!(arena.next(grown), Some(c));
        assert_eq!(arena.free_list_len(8), 1);
    }

    #[test]
    fn grow_past_largest_class_fails() {
        let mut arena = LineArena::new(4096);
        let id = arena.allocate(MAX_LINE_CAPACITY).unwrap();
        assert!(matches!(
            arena.grow(id),
            Err(AllocError::LineTooLarge { .. })
        ));
        assert!(arena.is_live(id));
    }
}
