use std::convert::Infallible;

use crate::coord::Rect;
use crate::grid::Grid;

/// Read-only access to a grid.
///
/// Hand out `&impl GridView<T>` to code that must look values up but never write
/// them. Several threads may read one grid through shared references at the same time
/// (`Grid<T>` is `Sync` when `T` is), and the borrow keeps writers out until every
/// reader is done.
pub trait GridView<T> {
    /// Value at `(i, j)`, if any
    fn get(&self, i: i32, j: i32) -> Option<&T>;

    /// Visit values inside `rect`, stopping at the first error returned by `f`
    fn try_query<'a, E, F>(&'a self, rect: Rect, f: F) -> Result<(), E>
    where
        T: 'a,
        F: FnMut(i32, i32, &'a T) -> Result<(), E>;

    /// Visit values inside `rect` in unspecified order
    fn query<'a, F>(&'a self, rect: Rect, mut f: F)
    where
        T: 'a,
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

    fn depth(&self) -> u32;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> GridView<T> for Grid<T> {
    fn get(&self, i: i32, j: i32) -> Option<&T> {
        Grid::get(self, i, j)
    }

    fn try_query<'a, E, F>(&'a self, rect: Rect, f: F) -> Result<(), E>
    where
        T: 'a,
        F: FnMut(i32, i32, &'a T) -> Result<(), E>,
    {
        Grid::try_query(self, rect, f)
    }

    fn query<'a, F>(&'a self, rect: Rect, f: F)
    where
        T: 'a,
        F: FnMut(i32, i32, &'a T),
    {
        Grid::query(self, rect, f)
    }

    fn depth(&self) -> u32 {
        Grid::depth(self)
    }

    fn len(&self) -> usize {
        Grid::len(self)
    }

    fn is_empty(&self) -> bool {
        Grid::is_empty(self)
    }
}
