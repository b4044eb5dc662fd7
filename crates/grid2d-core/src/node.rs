//! Node layer of the grid tree.
//!
//! Every tree level splits a square block into 32 x 32 sub-blocks using two node layers:
//! an *i-node* picks one of 32 strips along the i axis, and each of its children, a
//! *j-node*, picks one of 32 cells of that strip along the j axis. The j-nodes of the
//! bottom level are leaves and hold the stored values.
//!
//! Nodes keep up to two children in a small sorted list and switch to a full 32-slot
//! array only when a third child arrives, so the long single-child chains that a sparse
//! grid produces cost a handful of bytes per level.

use crate::region::Window;

/// Bits of a coordinate offset consumed per tree level and axis
pub const BITS: u32 = 5;
/// Child slots per node
pub const SIZE: usize = 1 << BITS;
pub(crate) const MASK: u64 = (SIZE - 1) as u64;
/// Height needed to cover the full 32-bit range on both axes (side `2^35`)
pub const MAX_DEPTH: u32 = 7;

/// Largest child count kept in the sparse representation
const SPARSE_LIMIT: usize = 2;

#[cfg(test)]
thread_local! {
    /// Nodes entered by [`Node::try_visit`] on the current thread
    pub(crate) static VISITED: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// Child slots of a node.
#[derive(Clone, Debug)]
pub(crate) enum Slots<C> {
    /// At most `SPARSE_LIMIT` entries, sorted by slot index
    Sparse(Vec<(u8, C)>),
    /// One optional child per slot index
    Dense {
        children: Box<[Option<C>; SIZE]>,
        len: usize,
    },
}

impl<C> Slots<C> {
    /// Create an empty, sparse set of slots.
    pub fn new() -> Self {
        Slots::Sparse(Vec::with_capacity(SPARSE_LIMIT))
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        match self {
            Slots::Sparse(entries) => entries.len(),
            Slots::Dense { len, .. } => *len,
        }
    }

    /// Check if no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    fn is_dense(&self) -> bool {
        matches!(self, Slots::Dense { .. })
    }

    /// Get a reference to the child at slot `idx`.
    pub fn get(&self, idx: u8) -> Option<&C> {
        match self {
            Slots::Sparse(entries) => entries.iter().find(|(k, _)| *k == idx).map(|(_, c)| c),
            Slots::Dense { children, .. } => children[idx as usize].as_ref(),
        }
    }

    /// Get a mutable reference to the child at slot `idx`.
    pub fn get_mut(&mut self, idx: u8) -> Option<&mut C> {
        match self {
            Slots::Sparse(entries) => entries
                .iter_mut()
                .find(|(k, _)| *k == idx)
                .map(|(_, c)| c),
            Slots::Dense { children, .. } => children[idx as usize].as_mut(),
        }
    }

    /// Store `child` at `idx`, returning the child it replaced.
    pub fn insert(&mut self, idx: u8, child: C) -> Option<C> {
        if let Some(slot) = self.get_mut(idx) {
            return Some(std::mem::replace(slot, child));
        }
        self.get_or_insert_with(idx, || child);
        None
    }

    /// Get the child at `idx`, creating it with `make` when the slot is empty.
    ///
    /// A third child switches the slots to the dense layout before it is stored.
    pub fn get_or_insert_with(&mut self, idx: u8, make: impl FnOnce() -> C) -> &mut C {
        if let Slots::Sparse(entries) = self {
            if entries.len() >= SPARSE_LIMIT && !entries.iter().any(|(k, _)| *k == idx) {
                self.promote();
            }
        }

        match self {
            Slots::Sparse(entries) => {
                let pos = entries.partition_point(|(k, _)| *k < idx);
                if entries.get(pos).map_or(true, |(k, _)| *k != idx) {
                    entries.insert(pos, (idx, make()));
                }
                &mut entries[pos].1
            }
            Slots::Dense { children, len } => {
                let slot = &mut children[idx as usize];
                if slot.is_none() {
                    *len += 1;
                }
                slot.get_or_insert_with(make)
            }
        }
    }

    /// Clear the slot at `idx`, returning what it held.
    ///
    /// Dense slots fall back to the sparse layout once two or fewer remain.
    pub fn remove(&mut self, idx: u8) -> Option<C> {
        let removed = match self {
            Slots::Sparse(entries) => {
                let pos = entries.iter().position(|(k, _)| *k == idx)?;
                return Some(entries.remove(pos).1);
            }
            Slots::Dense { children, len } => {
                let child = children[idx as usize].take()?;
                *len -= 1;
                child
            }
        };

        if self.len() <= SPARSE_LIMIT {
            self.demote();
        }
        Some(removed)
    }

    /// Take the child out of a node that has exactly one.
    pub fn take_only(&mut self) -> Option<(u8, C)> {
        if self.len() != 1 {
            return None;
        }
        match self {
            Slots::Sparse(entries) => entries.pop(),
            Slots::Dense { children, len } => {
                let idx = children.iter().position(Option::is_some)?;
                *len = 0;
                children[idx].take().map(|c| (idx as u8, c))
            }
        }
    }

    /// Mutable access to the child of a node that has exactly one.
    pub fn only_mut(&mut self) -> Option<(u8, &mut C)> {
        if self.len() != 1 {
            return None;
        }
        match self {
            Slots::Sparse(entries) => entries.first_mut().map(|(k, c)| (*k, c)),
            Slots::Dense { children, .. } => children
                .iter_mut()
                .enumerate()
                .find_map(|(k, c)| c.as_mut().map(|c| (k as u8, c))),
        }
    }

    /// Call `f` for every occupied slot with index in `lo..=hi`, in index order.
    ///
    /// Stops at the first error and returns it.
    pub fn try_for_each_in<'a, E>(
        &'a self,
        lo: u8,
        hi: u8,
        mut f: impl FnMut(u8, &'a C) -> Result<(), E>,
    ) -> Result<(), E> {
        match self {
            Slots::Sparse(entries) => {
                for (k, c) in entries {
                    if (lo..=hi).contains(k) {
                        f(*k, c)?;
                    }
                }
            }
            Slots::Dense { children, .. } => {
                for k in lo..=hi {
                    if let Some(c) = &children[k as usize] {
                        f(k, c)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Move sparse entries into a 32-slot array.
    fn promote(&mut self) {
        if let Slots::Sparse(entries) = self {
            let mut children: Box<[Option<C>; SIZE]> = Box::new(std::array::from_fn(|_| None));
            let len = entries.len();
            for (k, c) in entries.drain(..) {
                children[k as usize] = Some(c);
            }
            *self = Slots::Dense { children, len };
        }
    }

    /// Move the occupied slots of a dense array into a sorted list.
    fn demote(&mut self) {
        if let Slots::Dense { children, .. } = self {
            let entries: Vec<(u8, C)> = children
                .iter_mut()
                .enumerate()
                .filter_map(|(k, c)| c.take().map(|c| (k as u8, c)))
                .collect();
            *self = Slots::Sparse(entries);
        }
    }
}

impl<C> Default for Slots<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Slot indices from the root down to a value, two per tree level (i then j).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Path {
    idx: [u8; 2 * MAX_DEPTH as usize],
    len: usize,
}

impl Path {
    /// Path to the cell at offsets `(di, dj)` in a region of the given depth.
    pub fn new(di: u64, dj: u64, depth: u32) -> Self {
        debug_assert!(depth <= MAX_DEPTH);
        let mut idx = [0u8; 2 * MAX_DEPTH as usize];
        let mut len = 0;
        for level in (0..depth).rev() {
            let shift = level * BITS;
            idx[len] = ((di >> shift) & MASK) as u8;
            idx[len + 1] = ((dj >> shift) & MASK) as u8;
            len += 2;
        }
        Path { idx, len }
    }

    /// Slot indices, root first
    pub fn as_slice(&self) -> &[u8] {
        &self.idx[..self.len]
    }
}

/// A node of the grid tree. Owned exclusively by its parent or by the grid.
#[derive(Clone, Debug)]
pub(crate) enum Node<T> {
    Branch(Slots<Box<Node<T>>>),
    Leaf(Slots<T>),
}

impl<T> Node<T> {
    /// An empty node that will be followed by `remaining` path indices
    pub fn for_remaining(remaining: usize) -> Self {
        if remaining == 1 {
            Node::Leaf(Slots::new())
        } else {
            Node::Branch(Slots::new())
        }
    }

    /// A branch holding just `child` at `idx`
    pub fn wrap(idx: u8, child: Box<Node<T>>) -> Self {
        let mut slots = Slots::new();
        slots.insert(idx, child);
        Node::Branch(slots)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        match self {
            Node::Branch(slots) => slots.len(),
            Node::Leaf(slots) => slots.len(),
        }
    }

    /// Check if the node has no children or values.
    pub fn is_empty(&self) -> bool {
        match self {
            Node::Branch(slots) => slots.is_empty(),
            Node::Leaf(slots) => slots.is_empty(),
        }
    }

    /// Follow `path` down to a value.
    pub fn get(&self, path: &[u8]) -> Option<&T> {
        match (self, path) {
            (Node::Leaf(slots), [idx]) => slots.get(*idx),
            (Node::Branch(slots), [idx, rest @ ..]) => slots.get(*idx)?.get(rest),
            _ => None,
        }
    }

    /// Follow `path` down to a value, mutably.
    pub fn get_mut(&mut self, path: &[u8]) -> Option<&mut T> {
        match (self, path) {
            (Node::Leaf(slots), [idx]) => slots.get_mut(*idx),
            (Node::Branch(slots), [idx, rest @ ..]) => slots.get_mut(*idx)?.get_mut(rest),
            _ => None,
        }
    }

    /// Store `value` at the end of `path`, creating missing nodes on the way down.
    pub fn insert(&mut self, path: &[u8], value: T) -> Option<T> {
        match (self, path) {
            (Node::Leaf(slots), [idx]) => slots.insert(*idx, value),
            (Node::Branch(slots), [idx, rest @ ..]) if !rest.is_empty() => slots
                .get_or_insert_with(*idx, || Box::new(Node::for_remaining(rest.len())))
                .insert(rest, value),
            _ => unreachable!("path of {} slots does not match the tree shape", path.len()),
        }
    }

    /// Clear the value at the end of `path`, dropping nodes left empty behind it.
    pub fn remove(&mut self, path: &[u8]) -> Option<T> {
        match (self, path) {
            (Node::Leaf(slots), [idx]) => slots.remove(*idx),
            (Node::Branch(slots), [idx, rest @ ..]) => {
                let child = slots.get_mut(*idx)?;
                let removed = child.remove(rest);
                if child.is_empty() {
                    slots.remove(*idx);
                }
                removed
            }
            _ => None,
        }
    }

    /// Detach the subtree one level down when it is the only content of this node:
    /// a single i-child which itself has a single j-child.
    ///
    /// Returns the i and j slot indices together with the subtree.
    pub fn take_only_grandchild(&mut self) -> Option<(u8, u8, Box<Node<T>>)> {
        let Node::Branch(slots) = self else {
            return None;
        };
        let (ci, child) = slots.only_mut()?;
        let Node::Branch(inner) = child.as_mut() else {
            return None;
        };
        let (cj, grandchild) = inner.take_only()?;
        Some((ci, cj, grandchild))
    }

    /// Visit every value whose offsets lie inside `window`.
    ///
    /// `layer` counts node layers above the leaves: odd layers index the i axis, even
    /// layers the j axis, and layer 0 is the leaf. `corner` holds the offsets of the
    /// lower corner of this node's block. Only children overlapping the window are
    /// entered.
    pub fn try_visit<'a, E, F>(
        &'a self,
        layer: u32,
        corner: (u64, u64),
        window: &Window,
        f: &mut F,
    ) -> Result<(), E>
    where
        F: FnMut(u64, u64, &'a T) -> Result<(), E>,
    {
        #[cfg(test)]
        VISITED.with(|n| n.set(n.get() + 1));

        let on_i = layer % 2 == 1;
        let shift = BITS * (layer / 2);
        let (base, lo, hi) = if on_i {
            (corner.0, window.i_lo, window.i_hi)
        } else {
            (corner.1, window.j_lo, window.j_hi)
        };
        let Some((first, last)) = child_span(base, lo, hi, shift) else {
            return Ok(());
        };
        let child_corner = |k: u8| {
            let start = base + ((k as u64) << shift);
            if on_i {
                (start, corner.1)
            } else {
                (corner.0, start)
            }
        };

        match self {
            Node::Leaf(slots) => slots.try_for_each_in(first, last, |k, value| {
                let (di, dj) = child_corner(k);
                f(di, dj, value)
            }),
            Node::Branch(slots) => slots.try_for_each_in(first, last, |k, child| {
                child.try_visit(layer - 1, child_corner(k), window, &mut *f)
            }),
        }
    }
}

/// Range of child indices whose sub-blocks overlap `lo..=hi`, for a block starting at
/// `base` with children of side `1 << shift`.
fn child_span(base: u64, lo: u64, hi: u64, shift: u32) -> Option<(u8, u8)> {
    let end = base + ((SIZE as u64) << shift) - 1;
    let first = lo.max(base);
    let last = hi.min(end);
    if first > last {
        return None;
    }
    Some((
        ((first - base) >> shift) as u8,
        ((last - base) >> shift) as u8,
    ))
}
