//! Randomized workload that drives a [`Grid`] and a `HashMap` side by side and
//! fails on the first disagreement.

pub mod config;
pub mod error;

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use grid2d_core::{Grid, Rect};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::config::Config;
use crate::error::StressError;

/// Summary of one round
#[derive(Debug, Clone, Serialize)]
pub struct RoundReport {
    pub range: i32,
    pub round: u32,
    pub updates: u64,
    pub queries: u32,
    pub cells_queried: u64,
    pub peak_len: usize,
    pub peak_depth: u32,
    pub elapsed_ms: u128,
}

/// Summary of a whole run
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub seed: u64,
    pub rounds: Vec<RoundReport>,
    pub max_depth: u32,
    pub elapsed_ms: u128,
}

/// Run every configured range and round
pub fn run(config: &Config) -> Result<Report, StressError> {
    let started = Instant::now();
    let mut rounds = Vec::new();

    for &range in &config.ranges {
        for round in 1..=config.rounds {
            let report = run_round(config, range, round)?;
            tracing::info!(
                range,
                round,
                updates = report.updates,
                peak_depth = report.peak_depth,
                elapsed_ms = report.elapsed_ms as u64,
                "round passed"
            );
            rounds.push(report);
        }
    }

    Ok(Report {
        seed: config.seed,
        max_depth: rounds.iter().map(|r| r.peak_depth).max().unwrap_or(0),
        rounds,
        elapsed_ms: started.elapsed().as_millis(),
    })
}

/// One round: random updates, random rectangle queries, then removal of everything
pub fn run_round(config: &Config, range: i32, round: u32) -> Result<RoundReport, StressError> {
    let started = Instant::now();
    let seed = config.seed ^ ((range as u64) << 32 | round as u64);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut grid = Grid::new();
    let mut oracle: HashMap<(i32, i32), i32> = HashMap::new();

    let cell = |grid: &Grid<i32>, oracle: &HashMap<(i32, i32), i32>, i: i32, j: i32| {
        let expected = oracle.get(&(i, j)).copied();
        let actual = grid.get(i, j).copied();
        if expected == actual {
            Ok(())
        } else {
            Err(StressError::Cell {
                range,
                round,
                i,
                j,
                expected,
                actual,
            })
        }
    };

    let updates = range as u64 * round as u64;
    let mut peak_len = 0;
    let mut peak_depth = 0;
    for _ in 0..updates {
        let i = rng.gen_range(-range..range);
        let j = rng.gen_range(-range..range);
        cell(&grid, &oracle, i, j)?;

        if rng.gen_bool(0.5) {
            oracle.remove(&(i, j));
            grid.remove(i, j);
        } else {
            let v = rng.gen::<i32>();
            oracle.insert((i, j), v);
            grid.insert(i, j, v);
        }
        cell(&grid, &oracle, i, j)?;

        if grid.len() != oracle.len() {
            return Err(StressError::Len {
                range,
                round,
                expected: oracle.len(),
                actual: grid.len(),
            });
        }
        peak_len = peak_len.max(grid.len());
        peak_depth = peak_depth.max(grid.depth());
    }

    let queries = config.queries_for(range);
    let extent = query_extent(queries);
    let mut cells_queried = 0;
    for _ in 0..queries {
        let i0 = rng.gen_range(-range..range);
        let j0 = rng.gen_range(-range..range);
        let rect = Rect::from_corners(
            i0,
            j0,
            i0.saturating_add(rng.gen_range(0..extent)),
            j0.saturating_add(rng.gen_range(0..extent)),
        );

        let mut seen = HashSet::new();
        grid.query(rect, |i, j, v| {
            seen.insert((i, j, *v));
        });
        let expected: HashSet<_> = oracle
            .iter()
            .filter(|((i, j), _)| rect.contains((*i, *j).into()))
            .map(|(&(i, j), &v)| (i, j, v))
            .collect();
        if seen != expected {
            tracing::error!(range, round, %rect, "query disagrees with oracle");
            return Err(StressError::Query {
                range,
                round,
                rect: rect.to_string(),
                expected: expected.len(),
                actual: seen.len(),
            });
        }
        cells_queried += seen.len() as u64;
    }

    let keys: Vec<_> = oracle.keys().copied().collect();
    for (i, j) in keys {
        cell(&grid, &oracle, i, j)?;
        oracle.remove(&(i, j));
        grid.remove(i, j);
        cell(&grid, &oracle, i, j)?;
    }
    if grid.depth() != 0 {
        return Err(StressError::Depth {
            range,
            round,
            depth: grid.depth(),
        });
    }

    Ok(RoundReport {
        range,
        round,
        updates,
        queries,
        cells_queried,
        peak_len,
        peak_depth,
        elapsed_ms: started.elapsed().as_millis(),
    })
}

/// Largest side of a random query rectangle: ten times the query count, capped to `i32`
fn query_extent(queries: u32) -> i32 {
    i32::try_from(queries)
        .unwrap_or(i32::MAX)
        .saturating_mul(10)
        .max(10)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Config {
        Config {
            ranges: vec![10, 300],
            rounds: 2,
            seed: 9,
            queries: None,
        }
    }

    #[test]
    fn test_run_passes() {
        let report = run(&small()).unwrap();
        assert_eq!(report.rounds.len(), 4);
        assert_eq!(report.rounds[1].updates, 20);
        assert!(report.max_depth >= 1);
    }

    #[test]
    fn test_report_serializes() {
        let report = run(&small()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["seed"], 9);
        assert_eq!(json["rounds"].as_array().unwrap().len(), 4);
        assert_eq!(json["rounds"][0]["range"], 10);
    }

    #[test]
    fn test_explicit_query_count() {
        let config = Config {
            queries: Some(3),
            ..small()
        };
        let round = run_round(&config, 300, 1).unwrap();
        assert_eq!(round.queries, 3);
    }

    #[test]
    fn test_query_extent_saturates() {
        assert_eq!(query_extent(0), 10);
        assert_eq!(query_extent(10), 100);
        assert_eq!(query_extent(300_000_000), i32::MAX);
        assert_eq!(query_extent(u32::MAX), i32::MAX);
    }
}
