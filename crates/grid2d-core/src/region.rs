//! Square block of the plane covered by a grid tree, and how it grows.
//!
//! Origins are kept as `i64`: a region may hang past the 32-bit range on either side
//! while it still covers every stored coordinate.

use serde::{Deserialize, Serialize};

use crate::coord::{Coord, Rect};
use crate::node::{Path, BITS, MAX_DEPTH};

/// Side length of a region of the given depth
pub const fn side_of(depth: u32) -> i64 {
    1i64 << (depth * BITS)
}

/// The block currently represented by a grid tree.
///
/// Covers `[origin_i, origin_i + side) x [origin_j, origin_j + side)` where
/// `side = 32^depth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub depth: u32,
    pub origin_i: i64,
    pub origin_j: i64,
}

/// New depth and origin for one axis, as computed by [`find_new_shift`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shift {
    pub depth: u32,
    pub origin: i64,
}

/// Query rectangle in region offsets, clipped to the region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Window {
    pub i_lo: u64,
    pub i_hi: u64,
    pub j_lo: u64,
    pub j_hi: u64,
}

impl Region {
    /// Depth-1 region holding `(i, j)`: the aligned 32 x 32 block around it
    pub fn covering(i: i32, j: i32) -> Self {
        Region {
            depth: 1,
            origin_i: block_start(i),
            origin_j: block_start(j),
        }
    }

    pub fn side(&self) -> i64 {
        side_of(self.depth)
    }

    pub fn contains(&self, i: i32, j: i32) -> bool {
        self.offsets(i, j).is_some()
    }

    /// Offsets of `(i, j)` from the origin, if the point lies inside
    pub fn offsets(&self, i: i32, j: i32) -> Option<(u64, u64)> {
        let side = self.side();
        let di = i as i64 - self.origin_i;
        let dj = j as i64 - self.origin_j;
        if (0..side).contains(&di) && (0..side).contains(&dj) {
            Some((di as u64, dj as u64))
        } else {
            None
        }
    }

    /// Slot path to `(i, j)`, if the point lies inside
    pub(crate) fn locate(&self, i: i32, j: i32) -> Option<Path> {
        let (di, dj) = self.offsets(i, j)?;
        Some(Path::new(di, dj, self.depth))
    }

    /// Part of the region addressable by 32-bit coordinates
    pub fn bounds(&self) -> Rect {
        let clamp = |v: i64| v.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
        let last = self.side() - 1;
        Rect::from_corners(
            clamp(self.origin_i),
            clamp(self.origin_j),
            clamp(self.origin_i + last),
            clamp(self.origin_j + last),
        )
    }

    /// Translate a cell's offsets back to grid coordinates
    pub(crate) fn coord_at(&self, di: u64, dj: u64) -> Coord {
        Coord::new(
            (self.origin_i + di as i64) as i32,
            (self.origin_j + dj as i64) as i32,
        )
    }

    /// Clip `rect` to the region. `None` when they do not overlap or `rect` is inverted.
    pub(crate) fn window(&self, rect: &Rect) -> Option<Window> {
        if !rect.is_valid() {
            return None;
        }
        let side = self.side();
        let (i_lo, i_hi) = clip_axis(rect.min.i, rect.max.i, self.origin_i, side)?;
        let (j_lo, j_hi) = clip_axis(rect.min.j, rect.max.j, self.origin_j, side)?;
        Some(Window {
            i_lo,
            i_hi,
            j_lo,
            j_hi,
        })
    }

    /// Smallest region that keeps this one as an aligned sub-block and covers `(i, j)`.
    /// Both axes end up at the same depth.
    ///
    /// A region that already holds `(i, j)` is returned unchanged.
    pub fn grow_to(&self, i: i32, j: i32) -> Region {
        if self.contains(i, j) {
            return *self;
        }
        let (i, j) = (i as i64, j as i64);
        let mut si = find_new_shift(i, self.origin_i, self.depth, self.depth + 1);
        let sj = find_new_shift(j, self.origin_j, self.depth, si.depth);
        if sj.depth > si.depth {
            si = find_new_shift(i, self.origin_i, self.depth, sj.depth);
        }

        let depth = si.depth.max(sj.depth);
        debug_assert!(depth <= MAX_DEPTH, "region grew past the 32-bit plane");
        Region {
            depth,
            origin_i: si.origin,
            origin_j: sj.origin,
        }
    }

    /// Region of the child block at slot indices `(ci, cj)` one level down.
    pub fn collapse_into(&self, ci: u8, cj: u8) -> Region {
        debug_assert!(self.depth > 1);
        let shift = BITS * (self.depth - 1);
        Region {
            depth: self.depth - 1,
            origin_i: self.origin_i + ((ci as i64) << shift),
            origin_j: self.origin_j + ((cj as i64) << shift),
        }
    }
}

/// Compute the new depth and origin of one axis so that it covers `x`.
///
/// `origin` and `cur_depth` describe the current extent of the axis. The result is the
/// smallest depth of at least `start_depth` whose side exceeds the span from
/// `min(origin, x)` to `max(x, origin + side - 1)`. The new origin stays a multiple of
/// the current side away from `origin`, so the old block is one aligned sub-block of
/// the new one. It is first placed to center the span and then moved up to the lowest
/// aligned position that still covers the span's upper end.
///
/// # Example
///
/// ```
/// use grid2d_core::region::{find_new_shift, Shift};
///
/// assert_eq!(find_new_shift(5, 0, 0, 1), Shift { depth: 1, origin: -14 });
/// ```
pub fn find_new_shift(x: i64, origin: i64, cur_depth: u32, start_depth: u32) -> Shift {
    let step = side_of(cur_depth);
    let (min, max) = if origin <= x {
        (origin, x.max(origin + step - 1))
    } else {
        (x, origin + step - 1)
    };

    let dist = max - min;
    let mut depth = start_depth;
    let mut range = side_of(depth);
    while range <= dist {
        depth += 1;
        range <<= BITS;
    }

    let mid = (min + max) / 2;
    let mut new_origin = (mid - range / 2 - origin).div_euclid(step) * step + origin;
    while new_origin + range <= max {
        new_origin += step;
    }

    Shift {
        depth,
        origin: new_origin,
    }
}

/// Start of the aligned 32-cell block containing `x`
fn block_start(x: i32) -> i64 {
    (x as i64) >> BITS << BITS
}

fn clip_axis(lo: i32, hi: i32, origin: i64, side: i64) -> Option<(u64, u64)> {
    let lo = (lo as i64 - origin).max(0);
    let hi = (hi as i64 - origin).min(side - 1);
    (lo <= hi).then_some((lo as u64, hi as u64))
}
