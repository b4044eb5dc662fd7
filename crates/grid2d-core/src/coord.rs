use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::GridError;

/// A point on the grid plane
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub i: i32,
    pub j: i32,
}

impl Coord {
    pub const fn new(i: i32, j: i32) -> Self {
        Coord { i, j }
    }
}

impl From<(i32, i32)> for Coord {
    fn from((i, j): (i32, i32)) -> Self {
        Coord { i, j }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.i, self.j)
    }
}

/// A closed, axis-aligned rectangle of coordinates (both corners included)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub min: Coord,
    pub max: Coord,
}

impl Rect {
    /// The whole 32-bit plane
    pub const ALL: Rect = Rect {
        min: Coord::new(i32::MIN, i32::MIN),
        max: Coord::new(i32::MAX, i32::MAX),
    };

    pub fn new(a: Coord, b: Coord) -> Self {
        // Normalize so min is the lower corner on both axes
        Rect {
            min: Coord::new(a.i.min(b.i), a.j.min(b.j)),
            max: Coord::new(a.i.max(b.i), a.j.max(b.j)),
        }
    }

    /// Build a rectangle from corners as given, rejecting inverted ones.
    ///
    /// # Example
    ///
    /// ```
    /// use grid2d_core::{GridError, Rect};
    ///
    /// assert!(Rect::try_new(0, 0, 4, 4).is_ok());
    /// assert_eq!(
    ///     Rect::try_new(5, 0, 4, 4),
    ///     Err(GridError::InvalidRect { i0: 5, j0: 0, i1: 4, j1: 4 })
    /// );
    /// ```
    pub fn try_new(i0: i32, j0: i32, i1: i32, j1: i32) -> Result<Self, GridError> {
        if i0 > i1 || j0 > j1 {
            return Err(GridError::InvalidRect { i0, j0, i1, j1 });
        }
        Ok(Rect {
            min: Coord::new(i0, j0),
            max: Coord::new(i1, j1),
        })
    }

    /// Corners as given, without normalizing. An inverted rectangle contains nothing.
    pub const fn from_corners(i0: i32, j0: i32, i1: i32, j1: i32) -> Self {
        Rect {
            min: Coord::new(i0, j0),
            max: Coord::new(i1, j1),
        }
    }

    pub const fn point(c: Coord) -> Self {
        Rect { min: c, max: c }
    }

    /// True when the lower corner does not exceed the upper one on either axis
    pub fn is_valid(&self) -> bool {
        self.min.i <= self.max.i && self.min.j <= self.max.j
    }

    pub fn contains(&self, c: Coord) -> bool {
        c.i >= self.min.i && c.i <= self.max.i && c.j >= self.min.j && c.j <= self.max.j
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.is_valid()
            && other.is_valid()
            && self.min.i <= other.max.i
            && other.min.i <= self.max.i
            && self.min.j <= other.max.j
            && other.min.j <= self.max.j
    }

    /// Number of cells along the i axis (0 for an inverted rectangle)
    pub fn width(&self) -> u64 {
        span(self.min.i, self.max.i)
    }

    /// Number of cells along the j axis (0 for an inverted rectangle)
    pub fn height(&self) -> u64 {
        span(self.min.j, self.max.j)
    }
}

fn span(lo: i32, hi: i32) -> u64 {
    if lo > hi {
        0
    } else {
        (hi as i64 - lo as i64 + 1) as u64
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_normalizes_corners() {
        let r = Rect::new(Coord::new(5, -3), Coord::new(-2, 7));
        assert_eq!(r.min, Coord::new(-2, -3));
        assert_eq!(r.max, Coord::new(5, 7));
        assert_eq!(r.width(), 8);
        assert_eq!(r.height(), 11);
    }

    #[test]
    fn test_try_new_rejects_inverted() {
        assert!(Rect::try_new(0, 0, 0, 0).is_ok());
        assert!(Rect::try_new(1, 0, 0, 0).is_err());
        assert!(Rect::try_new(0, 1, 0, 0).is_err());
    }

    #[test]
    fn test_contains_is_inclusive() {
        let r = Rect::from_corners(-1, -1, 1, 1);
        assert!(r.contains(Coord::new(-1, -1)));
        assert!(r.contains(Coord::new(1, 1)));
        assert!(r.contains(Coord::new(0, 1)));
        assert!(!r.contains(Coord::new(2, 0)));
        assert!(!r.contains(Coord::new(0, -2)));
    }

    #[test]
    fn test_inverted_rect_is_empty() {
        let r = Rect::from_corners(3, 0, 2, 0);
        assert!(!r.is_valid());
        assert_eq!(r.width(), 0);
        assert!(!r.contains(Coord::new(2, 0)));
        assert!(!r.intersects(&Rect::ALL));
    }

    #[test]
    fn test_intersects() {
        let a = Rect::from_corners(0, 0, 10, 10);
        assert!(a.intersects(&Rect::from_corners(10, 10, 20, 20)));
        assert!(!a.intersects(&Rect::from_corners(11, 0, 20, 20)));
        assert!(a.intersects(&Rect::ALL));
    }

    #[test]
    fn test_all_spans_full_range() {
        assert_eq!(Rect::ALL.width(), 1u64 << 32);
        assert_eq!(Rect::ALL.height(), 1u64 << 32);
        assert!(Rect::ALL.contains(Coord::new(i32::MIN, i32::MAX)));
    }

    #[test]
    fn test_display() {
        assert_eq!(Coord::new(-1, 2).to_string(), "(-1, 2)");
        assert_eq!(Rect::from_corners(0, 1, 2, 3).to_string(), "(0, 1)..=(2, 3)");
    }
}
