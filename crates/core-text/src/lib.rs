//! Line-structured document backed by the size-class line allocator.
//!
//! The document is a doubly linked list of arena lines (`LineId` handles)
//! starting at `head`. It is never empty. Edits take a `Location` by mutable
//! reference and leave it at the post-edit cursor position; any handle that
//! was invalidated by a regrowth is reported back so the caller can remap its
//! other locations (the scroll anchor, a saved cursor).

use tracing::{debug, trace};

pub mod alloc;
pub mod width;

pub use alloc::{AllocError, LineArena, LineId, MAX_LINE_CAPACITY, SIZE_CLASSES};

/// Capacity requested for a brand new, empty line.
pub const INITIAL_LINE_CAPACITY: usize = SIZE_CLASSES[0];

/// A (line, byte offset) position. At rest `offset <= line length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: LineId,
    pub offset: usize,
}

impl Location {
    pub fn new(line: LineId, offset: usize) -> Self {
        Self { line, offset }
    }

    pub fn start_of(line: LineId) -> Self {
        Self { line, offset: 0 }
    }
}

/// A line handle replaced by `LineArena::grow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Regrowth {
    pub old: LineId,
    pub new: LineId,
}

impl Regrowth {
    /// Point `loc` at the new handle if it referenced the old one.
    pub fn remap(&self, loc: &mut Location) {
        if loc.line == self.old {
            loc.line = self.new;
        }
    }
}

/// Outcome of a single-byte deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    /// Nothing to delete (buffer edge, or the merged line would not fit).
    Unchanged,
    /// A byte was removed inside the line.
    InLine,
    /// `removed` was appended onto `into` and released.
    Merged {
        into: LineId,
        removed: LineId,
        regrowth: Option<Regrowth>,
    },
}

#[derive(Debug)]
pub struct Document {
    arena: LineArena,
    head: LineId,
}

impl Document {
    /// Single empty line document drawing from `arena`.
    pub fn new(mut arena: LineArena) -> Result<Self, AllocError> {
        let head = arena.allocate(INITIAL_LINE_CAPACITY)?;
        Ok(Self { arena, head })
    }

    pub fn with_budget(budget: usize) -> Result<Self, AllocError> {
        Self::new(LineArena::new(budget))
    }

    /// Release every line and start over with a single empty line.
    pub fn reset(&mut self) -> Result<LineId, AllocError> {
        let mut it = Some(self.head);
        let mut released = 0usize;
        while let Some(id) = it {
            it = self.arena.next(id);
            self.arena.release(id);
            released += 1;
        }
        self.head = self.arena.allocate(INITIAL_LINE_CAPACITY)?;
        debug!(target: "text.document", released, "reset");
        Ok(self.head)
    }

    /// A line that is not linked into the document (used by the prompt).
    pub fn allocate_detached(&mut self, min_size: usize) -> Result<LineId, AllocError> {
        self.arena.allocate(min_size)
    }

    pub fn clear_line(&mut self, id: LineId) {
        self.arena.set_len(id, 0);
    }

    pub fn arena(&self) -> &LineArena {
        &self.arena
    }

    pub fn head(&self) -> LineId {
        self.head
    }

    pub fn text(&self, id: LineId) -> &[u8] {
        self.arena.bytes(id)
    }

    pub fn line_len(&self, id: LineId) -> usize {
        self.arena.len(id)
    }

    pub fn capacity(&self, id: LineId) -> usize {
        self.arena.capacity(id)
    }

    pub fn prev(&self, id: LineId) -> Option<LineId> {
        self.arena.prev(id)
    }

    pub fn next(&self, id: LineId) -> Option<LineId> {
        self.arena.next(id)
    }

    /// Walk the document from `start` in order.
    pub fn lines_from(&self, start: LineId) -> Lines<'_> {
        Lines {
            arena: &self.arena,
            next: Some(start),
        }
    }

    pub fn lines(&self) -> Lines<'_> {
        self.lines_from(self.head)
    }

    pub fn line_count(&self) -> usize {
        self.lines().count()
    }

    /// Lossy text of every line, in order.
    pub fn line_strings(&self) -> Vec<String> {
        self.lines()
            .map(|id| String::from_utf8_lossy(self.text(id)).into_owned())
            .collect()
    }

    fn grow_line(&mut self, id: LineId) -> Result<LineId, AllocError> {
        let grown = self.arena.grow(id)?;
        if self.head == id {
            self.head = grown;
        }
        Ok(grown)
    }

    /// Grow `id` until it holds at least `min_capacity` bytes.
    fn grow_to(&mut self, id: LineId, min_capacity: usize) -> Result<Option<Regrowth>, AllocError> {
        let mut current = id;
        while self.arena.capacity(current) < min_capacity {
            current = self.grow_line(current)?;
        }
        Ok((current != id).then_some(Regrowth {
            old: id,
            new: current,
        }))
    }

    /// Insert `byte` at `loc`, advancing it by one.
    pub fn insert(&mut self, loc: &mut Location, byte: u8) -> Result<Option<Regrowth>, AllocError> {
        let len = self.arena.len(loc.line);
        debug_assert!(loc.offset <= len, "location past end of line");
        let regrowth = self.grow_to(loc.line, len + 1)?;
        if let Some(r) = regrowth {
            r.remap(loc);
        }

        let at = loc.offset.min(len);
        let data = self.arena.data_mut(loc.line);
        data.copy_within(at..len, at + 1);
        data[at] = byte;
        self.arena.set_len(loc.line, len + 1);
        loc.offset = at + 1;
        Ok(regrowth)
    }

    /// Split the line at `loc`; the tail moves to a new line linked right after
    /// it and `loc` moves to the start of that new line.
    pub fn split(&mut self, loc: &mut Location) -> Result<LineId, AllocError> {
        let current = loc.line;
        let len = self.arena.len(current);
        let at = loc.offset.min(len);
        let tail = len - at;

        let fresh = self.arena.allocate(tail.max(INITIAL_LINE_CAPACITY))?;
        self.arena.copy_between(current, at..len, fresh, 0);
        self.arena.set_len(fresh, tail);
        self.arena.set_len(current, at);

        let after = self.arena.next(current);
        self.arena.set_prev(fresh, Some(current));
        self.arena.set_next(fresh, after);
        if let Some(n) = after {
            self.arena.set_prev(n, Some(fresh));
        }
        self.arena.set_next(current, Some(fresh));

        trace!(target: "text.document", at, tail, "split");
        *loc = Location::start_of(fresh);
        Ok(fresh)
    }

    /// Backspace semantics: remove the byte before `loc`. At the start of a
    /// line the line is merged onto the end of its predecessor.
    pub fn delete_before(&mut self, loc: &mut Location) -> Result<Deletion, AllocError> {
        if loc.offset > 0 {
            loc.offset -= 1;
            self.remove_at(loc.line, loc.offset);
            return Ok(Deletion::InLine);
        }
        let Some(prev) = self.arena.prev(loc.line) else {
            return Ok(Deletion::Unchanged);
        };
        let join_at = self.arena.len(prev);
        let outcome = self.merge_next(prev)?;
        if let Deletion::Merged { into, .. } = outcome {
            *loc = Location::new(into, join_at);
        }
        Ok(outcome)
    }

    /// Forward delete: remove the byte at `loc`. At end of line the next line
    /// is merged onto this one.
    pub fn delete_at(&mut self, loc: &mut Location) -> Result<Deletion, AllocError> {
        if loc.offset < self.arena.len(loc.line) {
            self.remove_at(loc.line, loc.offset);
            return Ok(Deletion::InLine);
        }
        let outcome = self.merge_next(loc.line)?;
        if let Deletion::Merged { into, .. } = outcome {
            loc.line = into;
        }
        Ok(outcome)
    }

    fn remove_at(&mut self, id: LineId, at: usize) {
        let len = self.arena.len(id);
        self.arena.data_mut(id).copy_within(at + 1..len, at);
        self.arena.set_len(id, len - 1);
    }

    /// Replace `id` with a line of the class fitting `joined` bytes, holding
    /// the payload of `id` and taking its place before the follower.
    fn joined_line(&mut self, id: LineId, joined: usize) -> Result<LineId, AllocError> {
        let len = self.arena.len(id);
        let prev = self.arena.prev(id);
        let follower = self.arena.next(id);
        let fresh = self.arena.allocate(joined)?;
        self.arena.copy_between(id, 0..len, fresh, 0);
        self.arena.set_len(fresh, len);
        self.arena.set_prev(fresh, prev);
        self.arena.set_next(fresh, follower);
        if let Some(p) = prev {
            self.arena.set_next(p, Some(fresh));
        }
        if self.head == id {
            self.head = fresh;
        }
        self.arena.release(id);
        Ok(fresh)
    }

    /// Append the line following `id` onto `id`, unlink it and release it.
    fn merge_next(&mut self, id: LineId) -> Result<Deletion, AllocError> {
        let Some(follower) = self.arena.next(id) else {
            return Ok(Deletion::Unchanged);
        };
        let head_len = self.arena.len(id);
        let tail_len = self.arena.len(follower);
        let joined = head_len + tail_len;
        if joined > MAX_LINE_CAPACITY {
            trace!(target: "text.document", joined, "merge_refused");
            return Ok(Deletion::Unchanged);
        }

        let regrowth = if self.arena.capacity(id) < joined {
            Some(Regrowth {
                old: id,
                new: self.joined_line(id, joined)?,
            })
        } else {
            None
        };
        let into = regrowth.map_or(id, |r| r.new);
        self.arena.copy_between(follower, 0..tail_len, into, head_len);
        self.arena.set_len(into, joined);

        let after = self.arena.next(follower);
        self.arena.set_next(into, after);
        if let Some(n) = after {
            self.arena.set_prev(n, Some(into));
        }
        self.arena.release(follower);

        trace!(target: "text.document", joined, "merge");
        Ok(Deletion::Merged {
            into,
            removed: follower,
            regrowth,
        })
    }
}

/// Forward iterator over line handles.
pub struct Lines<'a> {
    arena: &'a LineArena,
    next: Option<LineId>,
}

impl Iterator for Lines<'_> {
    type Item = LineId;

    fn next(&mut self) -> Option<LineId> {
        let current = self.next?;
        self.next = self.arena.next(current);
        Some(current)
    }
}
