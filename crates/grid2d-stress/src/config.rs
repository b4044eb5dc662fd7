use std::env;

/// Stress run configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Coordinate ranges to exercise; each round draws from `-range..range`
    pub ranges: Vec<i32>,
    /// Rounds per range. Round `r` performs `range * r` updates.
    pub rounds: u32,
    /// Base seed, combined with the range and round
    pub seed: u64,
    /// Random queries per round. `None` uses the square root of the range.
    pub queries: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ranges: vec![10, 100, 10_000],
            rounds: 6,
            seed: 0,
            queries: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, after reading `.env` if present
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let ranges = match lookup("GRID_STRESS_RANGES") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().parse::<i32>())
                .collect::<Result<Vec<_>, _>>()?,
            None => defaults.ranges,
        };
        if let Some(bad) = ranges.iter().find(|&&r| r <= 0) {
            anyhow::bail!("GRID_STRESS_RANGES entries must be positive, got {bad}");
        }

        let rounds = match lookup("GRID_STRESS_ROUNDS") {
            Some(raw) => raw.trim().parse()?,
            None => defaults.rounds,
        };
        let seed = match lookup("GRID_STRESS_SEED") {
            Some(raw) => raw.trim().parse()?,
            None => defaults.seed,
        };
        let queries = lookup("GRID_STRESS_QUERIES")
            .map(|raw| raw.trim().parse())
            .transpose()?;

        Ok(Self {
            ranges,
            rounds,
            seed,
            queries,
        })
    }

    /// Queries to run per round for `range`
    pub fn queries_for(&self, range: i32) -> u32 {
        self.queries
            .unwrap_or_else(|| (range as f64).sqrt().round() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.queries_for(100), 10);
        assert_eq!(config.queries_for(10_000), 100);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("GRID_STRESS_RANGES", "5, 50"),
            ("GRID_STRESS_ROUNDS", "2"),
            ("GRID_STRESS_SEED", "42"),
            ("GRID_STRESS_QUERIES", "7"),
        ])
        .unwrap();
        assert_eq!(config.ranges, vec![5, 50]);
        assert_eq!(config.rounds, 2);
        assert_eq!(config.seed, 42);
        assert_eq!(config.queries_for(50), 7);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(load(&[("GRID_STRESS_RANGES", "10,x")]).is_err());
        assert!(load(&[("GRID_STRESS_RANGES", "10,0")]).is_err());
        assert!(load(&[("GRID_STRESS_ROUNDS", "-1")]).is_err());
    }
}
