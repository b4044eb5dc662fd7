//! Sparse two-dimensional map keyed by `(i32, i32)`.
//!
//! The grid owns a single tree whose root covers a square [`Region`] of the plane. The
//! region starts as the 32 x 32 block around the first value and grows only when a
//! write lands outside it. The existing tree is then re-rooted as one sub-block of
//! a larger root. Removing values prunes empty nodes and shrinks the region back once a
//! single sub-block holds everything, so the tree height follows the spread of the
//! stored points rather than the 32-bit coordinate range.

use std::convert::Infallible;

use crate::coord::{Coord, Rect};
use crate::node::{Node, BITS, MASK};
use crate::region::Region;

#[derive(Clone, Debug)]
struct Tree<T> {
    region: Region,
    root: Box<Node<T>>,
}

impl<T> Tree<T> {
    fn new(region: Region) -> Self {
        Tree {
            region,
            // The root is always an i-node
            root: Box::new(Node::for_remaining(2 * region.depth as usize)),
        }
    }

    /// Re-root the tree under a region that also covers `(i, j)`.
    ///
    /// The old root is wrapped in fresh single-child i/j nodes, one pair per added level.
    fn grown(self, i: i32, j: i32) -> Self {
        let old = self.region;
        let region = old.grow_to(i, j);
        let di = (old.origin_i - region.origin_i) as u64;
        let dj = (old.origin_j - region.origin_j) as u64;

        let mut root = self.root;
        for level in old.depth..region.depth {
            let shift = level * BITS;
            let ci = ((di >> shift) & MASK) as u8;
            let cj = ((dj >> shift) & MASK) as u8;
            root = Box::new(Node::wrap(ci, Box::new(Node::wrap(cj, root))));
        }

        tracing::trace!(
            from_depth = old.depth,
            to_depth = region.depth,
            origin_i = region.origin_i,
            origin_j = region.origin_j,
            "grid region grown"
        );
        Tree { region, root }
    }

    /// Drop top levels while all content sits in one sub-block of the root.
    fn collapse(&mut self) {
        while self.region.depth > 1 {
            let Some((ci, cj, sub)) = self.root.take_only_grandchild() else {
                return;
            };
            let region = self.region.collapse_into(ci, cj);
            tracing::trace!(
                from_depth = self.region.depth,
                to_depth = region.depth,
                origin_i = region.origin_i,
                origin_j = region.origin_j,
                "grid region collapsed"
            );
            self.region = region;
            self.root = sub;
        }
    }
}

/// A sparse map from `(i, j)` coordinates to values.
///
/// Not synchronized: concurrent readers may share a `&Grid`, writers need exclusive
/// access.
///
/// # Example
///
/// ```
/// use grid2d_core::{Grid, Rect};
///
/// let mut grid = Grid::new();
/// grid.insert(0, 0, "origin");
/// grid.insert(-5_000, 42, "far");
/// assert_eq!(grid.get(0, 0), Some(&"origin"));
/// assert_eq!(grid.depth(), 3);
///
/// let mut hits = Vec::new();
/// grid.query(Rect::from_corners(-10_000, 0, 0, 100), |i, j, v| hits.push((i, j, *v)));
/// hits.sort();
/// assert_eq!(hits, vec![(-5_000, 42, "far"), (0, 0, "origin")]);
///
/// grid.remove(-5_000, 42);
/// assert_eq!(grid.depth(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct Grid<T> {
    tree: Option<Tree<T>>,
    len: usize,
}

impl<T> Grid<T> {
    /// Create an empty grid.
    pub fn new() -> Self {
        Self { tree: None, len: 0 }
    }

    /// Current tree height; 0 when the grid is empty.
    pub fn depth(&self) -> u32 {
        self.tree.as_ref().map_or(0, |tree| tree.region.depth)
    }

    /// Block of the plane covered by the tree, if any value is stored
    pub fn region(&self) -> Option<Region> {
        self.tree.as_ref().map(|tree| tree.region)
    }

    /// Get the number of stored values.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the grid holds no values.
    pub fn is_empty(&self) -> bool {
        self.tree.is_none()
    }

    /// Drop every value and return to depth 0.
    pub fn clear(&mut self) {
        if self.tree.take().is_some() {
            tracing::trace!("grid cleared");
        }
        self.len = 0;
    }

    /// Get a reference to the value at `(i, j)`.
    ///
    /// # Arguments
    ///
    /// * `i` - Coordinate on the first axis
    /// * `j` - Coordinate on the second axis
    pub fn get(&self, i: i32, j: i32) -> Option<&T> {
        let tree = self.tree.as_ref()?;
        let path = tree.region.locate(i, j)?;
        tree.root.get(path.as_slice())
    }

    /// Get a mutable reference to the value at `(i, j)`.
    ///
    /// Never changes the shape of the tree.
    ///
    /// # Arguments
    ///
    /// * `i` - Coordinate on the first axis
    /// * `j` - Coordinate on the second axis
    pub fn get_mut(&mut self, i: i32, j: i32) -> Option<&mut T> {
        let tree = self.tree.as_mut()?;
        let path = tree.region.locate(i, j)?;
        tree.root.get_mut(path.as_slice())
    }

    /// Check if a value is stored at `(i, j)`.
    ///
    /// # Arguments
    ///
    /// * `i` - Coordinate on the first axis
    /// * `j` - Coordinate on the second axis
    pub fn contains(&self, i: i32, j: i32) -> bool {
        self.get(i, j).is_some()
    }

    /// Write `value` at `(i, j)`, or clear the cell when `value` is `None`.
    ///
    /// Returns the value previously stored there.
    ///
    /// # Arguments
    ///
    /// * `i` - Coordinate on the first axis
    /// * `j` - Coordinate on the second axis
    /// * `value` - Value to store, or `None` to clear the cell
    pub fn set(&mut self, i: i32, j: i32, value: Option<T>) -> Option<T> {
        match value {
            Some(value) => self.insert(i, j, value),
            None => self.remove(i, j),
        }
    }

    /// Store `value` at `(i, j)`, growing the covered region if needed.
    ///
    /// Returns the previous value if one existed.
    ///
    /// # Arguments
    ///
    /// * `i` - Coordinate on the first axis
    /// * `j` - Coordinate on the second axis
    /// * `value` - Value to insert
    pub fn insert(&mut self, i: i32, j: i32, value: T) -> Option<T> {
        let mut tree = match self.tree.take() {
            Some(tree) => tree,
            None => Tree::new(Region::covering(i, j)),
        };
        let path = loop {
            match tree.region.locate(i, j) {
                Some(path) => break path,
                None => tree = tree.grown(i, j),
            }
        };

        let previous = tree.root.insert(path.as_slice(), value);
        if previous.is_none() {
            self.len += 1;
        }
        self.tree = Some(tree);
        previous
    }

    /// Clear the cell at `(i, j)`, pruning nodes and shrinking the region behind it.
    ///
    /// Returns the value if one existed. Clearing an empty cell changes nothing.
    pub fn remove(&mut self, i: i32, j: i32) -> Option<T> {
        let tree = self.tree.as_mut()?;
        let path = tree.region.locate(i, j)?;
        let removed = tree.root.remove(path.as_slice())?;
        self.len -= 1;

        if tree.root.is_empty() {
            self.clear();
        } else {
            tree.collapse();
        }
        Some(removed)
    }

    /// Call `f` for every value whose coordinate lies in `rect` (both corners included).
    ///
    /// The order of calls is unspecified. An inverted rectangle matches nothing.
    /// References handed to `f` borrow from the grid, so they may be kept past the call.
    ///
    /// # Arguments
    ///
    /// * `rect` - Inclusive rectangle to search
    /// * `f` - Called with `i`, `j` and the value of every match
    ///
    /// # Examples
    ///
    /// ```
    /// use grid2d_core::{Grid, Rect};
    ///
    /// let mut grid = Grid::new();
    /// grid.insert(1, 1, 10);
    /// grid.insert(40, 1, 20);
    ///
    /// let mut sum = 0;
    /// grid.query(Rect::from_corners(0, 0, 9, 9), |_, _, v| sum += v);
    /// assert_eq!(sum, 10);
    /// ```
    pub fn query<'a, F>(&'a self, rect: Rect, mut f: F)
    where
        F: FnMut(i32, i32, &'a T),
    {
        let visited = self.try_query(rect, |i, j, value| {
            f(i, j, value);
            Ok::<(), Infallible>(())
        });
        match visited {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }

    /// Like [`Grid::query`], but stops at the first error returned by `f` and hands it
    /// back unchanged.
    pub fn try_query<'a, E, F>(&'a self, rect: Rect, mut f: F) -> Result<(), E>
    where
        F: FnMut(i32, i32, &'a T) -> Result<(), E>,
    {
        let Some(tree) = &self.tree else {
            return Ok(());
        };
        let Some(window) = tree.region.window(&rect) else {
            return Ok(());
        };

        let region = tree.region;
        let layer = 2 * region.depth - 1;
        tree.root
            .try_visit(layer, (0, 0), &window, &mut |di: u64, dj: u64, value: &'a T| {
                let at = region.coord_at(di, dj);
                f(at.i, at.j, value)
            })
    }

    /// Four-integer form of [`Grid::query`]: corners `(i0, j0)` and `(i1, j1)` as given.
    pub fn query_coords<'a, F>(&'a self, i0: i32, j0: i32, i1: i32, j1: i32, f: F)
    where
        F: FnMut(i32, i32, &'a T),
    {
        self.query(Rect::from_corners(i0, j0, i1, j1), f)
    }

    /// Get all values within a given rectangle.
    ///
    /// Only the parts of the tree overlapping the rectangle are visited.
    pub fn cells_in_range(&self, rect: Rect) -> Vec<(Coord, &T)> {
        let mut result = Vec::new();
        self.query(rect, |i, j, value| result.push((Coord::new(i, j), value)));
        result
    }

    /// Iterate over all stored values, in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &T)> {
        self.cells_in_range(Rect::ALL).into_iter()
    }
}

impl<T> Default for Grid<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<((i32, i32), T)> for Grid<T> {
    fn from_iter<I: IntoIterator<Item = ((i32, i32), T)>>(iter: I) -> Self {
        let mut grid = Grid::new();
        grid.extend(iter);
        grid
    }
}

impl<T> Extend<((i32, i32), T)> for Grid<T> {
    fn extend<I: IntoIterator<Item = ((i32, i32), T)>>(&mut self, iter: I) {
        for ((i, j), value) in iter {
            self.insert(i, j, value);
        }
    }
}
