use thiserror::Error;

/// Errors raised by the strict constructors of this crate.
///
/// Grid operations themselves accept every coordinate and never fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// Rectangle corners are inverted on at least one axis
    #[error("invalid rectangle: ({i0}, {j0})..=({i1}, {j1}) has min > max")]
    InvalidRect { i0: i32, j0: i32, i1: i32, j1: i32 },
}
