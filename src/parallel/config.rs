// src/parallel/config.rs

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use super::types::ParallelError;

/// Environment variable read by [`Config::from_env`].
pub const CONCURRENCY_ENV: &str = "PIPELINE_CONCURRENCY";

const DEFAULT_CONCURRENCY: usize = 1;

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(error = "ParallelError"))]
pub struct Config {
    /// Requested number of concurrent workers.
    ///
    /// Clamped at run time to `1..=item_count`, see [`effective_concurrency`].
    #[builder(default = "DEFAULT_CONCURRENCY")]
    #[serde(default = "default_concurrency")]
    pub(crate) concurrency: usize,
}

impl Config {
    pub fn new(concurrency: usize) -> Self {
        Config { concurrency }
    }

    /// Reads the worker count from `PIPELINE_CONCURRENCY`, falling back to the default
    /// when the variable is unset.
    pub fn from_env() -> Result<Self, ParallelError> {
        match std::env::var(CONCURRENCY_ENV) {
            Ok(value) => Self::parse_concurrency(&value).map(Config::new),
            Err(_) => Ok(Config::default()),
        }
    }

    fn parse_concurrency(value: &str) -> Result<usize, ParallelError> {
        value
            .trim()
            .parse::<usize>()
            .map_err(|source| ParallelError::InvalidEnv {
                key: CONCURRENCY_ENV,
                value: value.to_string(),
                source,
            })
    }

    /// Returns the requested concurrency level, before clamping
    #[inline]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Number of workers actually started for `item_count` items.
///
/// At least one worker runs for a non-empty input and never more workers than items.
#[inline]
pub fn effective_concurrency(requested: usize, item_count: usize) -> usize {
    requested.max(1).min(item_count)
}
