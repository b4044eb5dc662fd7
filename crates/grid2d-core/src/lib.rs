//! Sparse two-dimensional coordinate map.
//!
//! [`Grid`] stores values at `(i32, i32)` coordinates in a tree of 32 x 32 blocks whose
//! height follows the spread of the stored points, not the size of the coordinate
//! space. It supports point lookups, writes and removals, and rectangle queries that
//! only walk the parts of the tree overlapping the rectangle.
//!
//! # Example
//!
//! ```
//! use grid2d_core::{Grid, Rect};
//!
//! let mut grid = Grid::new();
//! for i in -10..=10 {
//!     for j in -10..=10 {
//!         grid.insert(i, j, i + j);
//!     }
//! }
//!
//! let mut count = 0;
//! grid.query(Rect::from_corners(-50, -1, 50, 1), |_, j, v| {
//!     assert!((-1..=1).contains(&j));
//!     assert!(v.abs() <= 11);
//!     count += 1;
//! });
//! assert_eq!(count, 21 * 3);
//! ```

pub mod coord;
pub mod error;
pub mod grid;
mod node;
pub mod region;
pub mod view;

pub use coord::{Coord, Rect};
pub use error::GridError;
pub use grid::Grid;
pub use node::{BITS, MAX_DEPTH, SIZE};
pub use region::{find_new_shift, Region, Shift};
pub use view::GridView;
