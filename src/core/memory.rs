//! Ring-tree memory for the Spherehorn interpreter.
//!
//! Every cell holds a signed value and owns a ring of children whose intended
//! size equals that value. Rings are materialized lazily: navigation grows a
//! contiguous open arc of zero-valued cells, and the arc is sealed into a
//! closed ring exactly once, when its length first reaches the parent's value.
//!
//! All cells of one tree live in a single [`Memory`] arena and are addressed by
//! [`CellId`] handles. Parent, sibling and anchor links are plain handles; the
//! arena is the only owner, so the cyclic structure needs no reference counting.
//!
//! # Panics
//!
//! Passing a handle that was never issued by this arena, or one whose cell has
//! since been freed, panics. Handles become stale when a cell's ancestor is
//! reset (including through [`Memory::set_value`]) or when the cell is deleted
//! from its ring.

use std::fmt;

use super::error::MemoryError;

/// The single integral register width of the language.
pub type Num = i64;

/// Stable handle to a cell inside a [`Memory`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(usize);

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Default)]
struct Cell {
    value: Num,
    /// Number of materialized children.
    instantiated: Num,
    /// Ring anchor.
    first_child: Option<CellId>,
    prev: Option<CellId>,
    next: Option<CellId>,
    parent: Option<CellId>,
}

/// The materialized children of a cell, read from its anchor.
///
/// `forward` starts at the anchor and follows `next` links. When the ring is
/// not closed, `backward` holds the cells reached by following `prev` links
/// from the anchor (nearest first); for a closed ring it is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildArc {
    pub forward: Vec<CellId>,
    pub backward: Vec<CellId>,
    pub closed: bool,
}

impl ChildArc {
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn len(&self) -> usize {
        self.forward.len() + self.backward.len()
    }

    /// Every materialized child, forward arc first.
    pub fn iter(&self) -> impl Iterator<Item = CellId> + '_ {
        self.forward.iter().chain(self.backward.iter()).copied()
    }
}

/// Arena owning every cell of one or more ring-trees.
#[derive(Clone, Default)]
pub struct Memory {
    cells: Vec<Option<Cell>>,
    free: Vec<CellId>,
    live: usize,
}

impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Memory{{live: {}, slots: {}}}", self.live, self.cells.len())
    }
}

impl Memory {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cells currently allocated.
    pub fn live_cells(&self) -> usize {
        self.live
    }

    /// Whether `id` refers to a live cell of this arena.
    pub fn contains(&self, id: CellId) -> bool {
        matches!(self.cells.get(id.0), Some(Some(_)))
    }

    fn cell(&self, id: CellId) -> &Cell {
        match self.cells.get(id.0) {
            Some(Some(cell)) => cell,
            _ => panic!("stale cell handle {}", id),
        }
    }

    fn cell_mut(&mut self, id: CellId) -> &mut Cell {
        match self.cells.get_mut(id.0) {
            Some(Some(cell)) => cell,
            _ => panic!("stale cell handle {}", id),
        }
    }

    fn alloc_in(&mut self, parent: Option<CellId>, value: Num) -> CellId {
        let cell = Cell {
            value,
            parent,
            ..Cell::default()
        };
        self.live += 1;
        match self.free.pop() {
            Some(id) => {
                self.cells[id.0] = Some(cell);
                id
            }
            None => {
                self.cells.push(Some(cell));
                CellId(self.cells.len() - 1)
            }
        }
    }

    fn discard(&mut self, id: CellId) {
        if let Some(slot) = self.cells.get_mut(id.0) {
            if slot.take().is_some() {
                self.live -= 1;
                self.free.push(id);
            }
        }
    }

    /// Link `before.next = after` and `after.prev = before`.
    fn link(&mut self, before: CellId, after: CellId) {
        self.cell_mut(before).next = Some(after);
        self.cell_mut(after).prev = Some(before);
    }

    fn parent_of(&self, id: CellId) -> Result<CellId, MemoryError> {
        self.cell(id).parent.ok_or(MemoryError::Detached { cell: id })
    }

    // ═══════════════════════════════════════════════════════════════════
    // Construction
    // ═══════════════════════════════════════════════════════════════════

    /// Allocate a detached top-level cell.
    pub fn alloc(&mut self, value: Num) -> CellId {
        self.alloc_in(None, value)
    }

    /// Allocate a top-level cell whose ring holds one child per byte.
    ///
    /// The ring is fully materialized and closed.
    pub fn from_bytes(&mut self, bytes: &[u8]) -> CellId {
        let root = self.alloc(bytes.len() as Num);
        let children: Vec<CellId> = bytes
            .iter()
            .map(|&b| self.alloc_in(Some(root), Num::from(b)))
            .collect();
        if let (Some(&first), Some(&last)) = (children.first(), children.last()) {
            for pair in children.windows(2) {
                self.link(pair[0], pair[1]);
            }
            self.link(last, first);
            let cell = self.cell_mut(root);
            cell.first_child = Some(first);
            cell.instantiated = children.len() as Num;
        }
        root
    }

    /// Free a top-level cell and everything below it.
    pub fn free(&mut self, id: CellId) -> Result<(), MemoryError> {
        if !self.is_top(id) {
            return Err(MemoryError::NotDetached { cell: id });
        }
        self.reset(id);
        self.discard(id);
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Inspection
    // ═══════════════════════════════════════════════════════════════════

    pub fn value(&self, id: CellId) -> Num {
        self.cell(id).value
    }

    /// Number of materialized children.
    pub fn instantiated(&self, id: CellId) -> Num {
        self.cell(id).instantiated
    }

    /// Whether every child of the ring has been materialized.
    pub fn is_full(&self, id: CellId) -> bool {
        let cell = self.cell(id);
        cell.instantiated == cell.value
    }

    /// True iff the cell has no parent.
    pub fn is_top(&self, id: CellId) -> bool {
        self.cell(id).parent.is_none()
    }

    pub fn parent(&self, id: CellId) -> Option<CellId> {
        self.cell(id).parent
    }

    /// The ring anchor, without materializing it.
    pub fn first_child(&self, id: CellId) -> Option<CellId> {
        self.cell(id).first_child
    }

    /// Whether `ancestor` lies on the parent chain of `id` (or is `id`).
    pub fn is_ancestor(&self, ancestor: CellId, id: CellId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.cell(current).parent;
        }
        false
    }

    /// Collect the materialized children of `id` without touching the ring.
    pub fn materialized(&self, id: CellId) -> ChildArc {
        let mut arc = ChildArc::default();
        let Some(first) = self.cell(id).first_child else {
            return arc;
        };
        arc.forward.push(first);
        let mut cursor = self.cell(first).next;
        while let Some(current) = cursor {
            if current == first {
                arc.closed = true;
                return arc;
            }
            arc.forward.push(current);
            cursor = self.cell(current).next;
        }
        let mut cursor = self.cell(first).prev;
        while let Some(current) = cursor {
            arc.backward.push(current);
            cursor = self.cell(current).prev;
        }
        arc
    }

    // ═══════════════════════════════════════════════════════════════════
    // Values
    // ═══════════════════════════════════════════════════════════════════

    /// Discard every descendant, then assign the new value.
    pub fn set_value(&mut self, id: CellId, value: Num) {
        self.reset(id);
        self.cell_mut(id).value = value;
    }

    /// Free every materialized descendant of `id`.
    ///
    /// A full ring is cut between its last and first cell and freed in one
    /// forward pass. An open arc is freed forward from the anchor and then
    /// backward from the cell preceding it, so each cell is visited once no
    /// matter which ends the arc grew from.
    pub fn reset(&mut self, id: CellId) {
        let mut doomed = Vec::new();
        self.unhook_children(id, &mut doomed);
        while let Some(current) = doomed.pop() {
            self.unhook_children(current, &mut doomed);
            self.discard(current);
        }
    }

    fn unhook_children(&mut self, id: CellId, out: &mut Vec<CellId>) {
        let was_full = self.is_full(id);
        let cell = self.cell_mut(id);
        cell.instantiated = 0;
        let Some(first) = cell.first_child.take() else {
            return;
        };

        let last = self.cell(first).prev;
        if let Some(last) = last {
            self.cell_mut(last).next = None;
        }

        let mut cursor = Some(first);
        while let Some(current) = cursor {
            cursor = self.cell(current).next;
            out.push(current);
        }
        if was_full {
            return;
        }

        let mut cursor = last;
        while let Some(current) = cursor {
            cursor = self.cell(current).prev;
            out.push(current);
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Navigation
    // ═══════════════════════════════════════════════════════════════════

    /// The ring anchor of `id`, materializing it if needed.
    ///
    /// A cell of value 1 gets a child linked to itself, since a one-element
    /// ring is full as soon as it exists.
    pub fn child(&mut self, id: CellId) -> Result<CellId, MemoryError> {
        let cell = self.cell(id);
        if let Some(first) = cell.first_child {
            return Ok(first);
        }
        let value = cell.value;
        if value <= 0 {
            return Err(MemoryError::NoChildren { cell: id, value });
        }

        let child = self.alloc_in(Some(id), 0);
        let cell = self.cell_mut(id);
        cell.first_child = Some(child);
        cell.instantiated = 1;
        if value == 1 {
            self.link(child, child);
        }
        Ok(child)
    }

    /// Previous sibling, materialized on first visit.
    pub fn prev(&mut self, id: CellId) -> Result<CellId, MemoryError> {
        if let Some(prev) = self.cell(id).prev {
            return Ok(prev);
        }
        let parent = self.parent_of(id)?;

        let fresh = self.alloc_in(Some(parent), 0);
        self.link(fresh, id);
        self.cell_mut(parent).instantiated += 1;

        if self.is_full(parent) {
            // seal the ring: the far end of the arc wraps around to `fresh`
            let mut last = id;
            while let Some(next) = self.cell(last).next {
                last = next;
            }
            self.link(last, fresh);
        }
        Ok(fresh)
    }

    /// Next sibling, materialized on first visit.
    pub fn next(&mut self, id: CellId) -> Result<CellId, MemoryError> {
        if let Some(next) = self.cell(id).next {
            return Ok(next);
        }
        let parent = self.parent_of(id)?;

        let fresh = self.alloc_in(Some(parent), 0);
        self.link(id, fresh);
        self.cell_mut(parent).instantiated += 1;

        if self.is_full(parent) {
            let mut first = id;
            while let Some(prev) = self.cell(first).prev {
                first = prev;
            }
            self.link(fresh, first);
        }
        Ok(fresh)
    }

    fn ring_size(&self, id: CellId) -> Result<Num, MemoryError> {
        let parent = self.parent_of(id)?;
        match self.cell(parent).value {
            size if size > 0 => Ok(size),
            value => Err(MemoryError::NoChildren { cell: parent, value }),
        }
    }

    /// Step back `n` places, reduced modulo the ring size.
    pub fn shift_back(&mut self, id: CellId, n: Num) -> Result<CellId, MemoryError> {
        let steps = n.rem_euclid(self.ring_size(id)?);
        let mut current = id;
        for _ in 0..steps {
            current = self.prev(current)?;
        }
        Ok(current)
    }

    /// Step forward `n` places, reduced modulo the ring size.
    pub fn shift_forward(&mut self, id: CellId, n: Num) -> Result<CellId, MemoryError> {
        let steps = n.rem_euclid(self.ring_size(id)?);
        let mut current = id;
        for _ in 0..steps {
            current = self.next(current)?;
        }
        Ok(current)
    }

    /// Make `id` the anchor of its parent's ring.
    pub fn make_first(&mut self, id: CellId) -> Result<(), MemoryError> {
        let parent = self.parent_of(id)?;
        self.cell_mut(parent).first_child = Some(id);
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Ring Editing
    // ═══════════════════════════════════════════════════════════════════

    /// Splice a new cell in front of `id`, growing the ring by one.
    pub fn insert_before(&mut self, id: CellId, value: Num) -> Result<CellId, MemoryError> {
        let parent = self.parent_of(id)?;
        let before = self.prev(id)?;
        let fresh = self.alloc_in(Some(parent), value);
        self.link(before, fresh);
        self.link(fresh, id);

        let cell = self.cell_mut(parent);
        cell.value = cell.value.wrapping_add(1);
        cell.instantiated += 1;
        Ok(fresh)
    }

    /// Splice a new cell behind `id`, growing the ring by one.
    pub fn insert_after(&mut self, id: CellId, value: Num) -> Result<CellId, MemoryError> {
        let next = self.next(id)?;
        self.insert_before(next, value)
    }

    /// Remove the cell preceding `id` and return the cell that now precedes it.
    ///
    /// When `id` is the only member of its ring the parent collapses to value 0
    /// (freeing `id`) and the parent is returned instead.
    pub fn delete_before(&mut self, id: CellId) -> Result<CellId, MemoryError> {
        let parent = self.parent_of(id)?;
        if self.cell(parent).value == 1 {
            self.set_value(parent, 0);
            return Ok(parent);
        }
        let doomed = self.prev(id)?;
        let survivor = self.prev(doomed)?;
        self.link(survivor, id);
        self.unlink(parent, doomed, survivor);
        Ok(survivor)
    }

    /// Remove the cell following `id` and return the cell that now follows it.
    ///
    /// Collapses the parent exactly like [`Memory::delete_before`].
    pub fn delete_after(&mut self, id: CellId) -> Result<CellId, MemoryError> {
        let parent = self.parent_of(id)?;
        if self.cell(parent).value == 1 {
            self.set_value(parent, 0);
            return Ok(parent);
        }
        let doomed = self.next(id)?;
        let survivor = self.next(doomed)?;
        self.link(id, survivor);
        self.unlink(parent, doomed, survivor);
        Ok(survivor)
    }

    /// Drop a cell already spliced out of its ring and fix the parent's books.
    fn unlink(&mut self, parent: CellId, doomed: CellId, survivor: CellId) {
        let cell = self.cell_mut(parent);
        cell.value -= 1;
        cell.instantiated -= 1;
        if cell.first_child == Some(doomed) {
            cell.first_child = Some(survivor);
        }
        let gone = self.cell_mut(doomed);
        gone.prev = None;
        gone.next = None;
        gone.parent = None;
        self.reset(doomed);
        self.discard(doomed);
    }

    /// Append a detached cell as the newest member of `parent`'s ring.
    ///
    /// The new child lands just before the anchor, i.e. at the end of the ring.
    pub fn insert_child(&mut self, parent: CellId, child: CellId) -> Result<(), MemoryError> {
        if !self.is_top(child) {
            return Err(MemoryError::NotDetached { cell: child });
        }
        if self.is_ancestor(child, parent) {
            return Err(MemoryError::Overlap { dst: parent, src: child });
        }
        let value = self.cell(parent).value;
        if value < 0 {
            return Err(MemoryError::NoChildren { cell: parent, value });
        }

        if value == 0 {
            self.cell_mut(parent).first_child = Some(child);
            self.link(child, child);
        } else {
            let first = self.child(parent)?;
            let last = self.prev(first)?;
            self.link(last, child);
            self.link(child, first);
        }
        self.cell_mut(child).parent = Some(parent);

        let cell = self.cell_mut(parent);
        cell.value = cell.value.wrapping_add(1);
        cell.instantiated += 1;
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Copy and Move
    // ═══════════════════════════════════════════════════════════════════

    /// Overwrite `dst` with a deep copy of `src` from another arena.
    ///
    /// Only the value and the descendant rings are copied; `dst` keeps its own
    /// parent and siblings. Materialization state is reproduced exactly, so a
    /// partial arc copies to a partial arc of the same shape.
    pub fn copy_from(&mut self, dst: CellId, source: &Memory, src: CellId) {
        let mut pending = vec![(dst, src)];
        while let Some((to, from)) = pending.pop() {
            let from_cell = source.cell(from);
            self.set_value(to, from_cell.value);
            let arc = source.materialized(from);
            if arc.is_empty() {
                continue;
            }

            let mut copy_of = |memory: &mut Memory, original: CellId| {
                let copy = memory.alloc_in(Some(to), 0);
                pending.push((copy, original));
                copy
            };

            let anchor = copy_of(self, arc.forward[0]);
            let mut tail = anchor;
            for &original in &arc.forward[1..] {
                let copy = copy_of(self, original);
                self.link(tail, copy);
                tail = copy;
            }
            if arc.closed {
                self.link(tail, anchor);
            } else {
                let mut head = anchor;
                for &original in &arc.backward {
                    let copy = copy_of(self, original);
                    self.link(copy, head);
                    head = copy;
                }
            }

            let cell = self.cell_mut(to);
            cell.first_child = Some(anchor);
            cell.instantiated = from_cell.instantiated;
        }
    }

    /// Overwrite `dst` with a deep copy of `src` from the same arena.
    ///
    /// Safe when one cell contains the other: the source is snapshotted into a
    /// scratch arena before `dst` is reset.
    pub fn copy_within(&mut self, dst: CellId, src: CellId) {
        if dst == src {
            return;
        }
        let mut scratch = Memory::new();
        let staged = scratch.alloc(0);
        scratch.copy_from(staged, self, src);
        self.copy_from(dst, &scratch, staged);
    }

    /// Transfer the value and materialized subtree of `src` to `dst`.
    ///
    /// `src` keeps its value but is left with no materialized children; every
    /// moved child is re-parented to `dst`.
    pub fn move_within(&mut self, dst: CellId, src: CellId) -> Result<(), MemoryError> {
        if dst == src {
            return Ok(());
        }
        if self.is_ancestor(dst, src) || self.is_ancestor(src, dst) {
            return Err(MemoryError::Overlap { dst, src });
        }

        self.reset(dst);
        let source = self.cell_mut(src);
        let value = source.value;
        let first_child = source.first_child.take();
        let instantiated = std::mem::take(&mut source.instantiated);

        let target = self.cell_mut(dst);
        target.value = value;
        target.first_child = first_child;
        target.instantiated = instantiated;

        for child in self.materialized(dst).iter().collect::<Vec<_>>() {
            self.cell_mut(child).parent = Some(dst);
        }
        Ok(())
    }
}
