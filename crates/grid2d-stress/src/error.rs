use thiserror::Error;

/// Disagreement between the grid and the `HashMap` oracle
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StressError {
    #[error("range {range} round {round}: cell ({i}, {j}) holds {actual:?}, expected {expected:?}")]
    Cell {
        range: i32,
        round: u32,
        i: i32,
        j: i32,
        expected: Option<i32>,
        actual: Option<i32>,
    },

    #[error("range {range} round {round}: grid holds {actual} entries, expected {expected}")]
    Len {
        range: i32,
        round: u32,
        expected: usize,
        actual: usize,
    },

    #[error("range {range} round {round}: query {rect} returned {actual} cells, expected {expected}")]
    Query {
        range: i32,
        round: u32,
        rect: String,
        expected: usize,
        actual: usize,
    },

    #[error("range {range} round {round}: emptied grid kept depth {depth}")]
    Depth { range: i32, round: u32, depth: u32 },
}
