use serde::{Deserialize, Serialize};
use std::fmt;

use lottostats_db::error::{Result, StatsError};

/// Blend of the four per-number signals. Must be non-negative and sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyWeights {
    pub frequency: f64,
    pub hot: f64,
    pub overdue: f64,
    pub pairs: f64,
}

impl StrategyWeights {
    pub fn new(frequency: f64, hot: f64, overdue: f64, pairs: f64) -> Result<Self> {
        let weights = Self { frequency, hot, overdue, pairs };
        weights.validate()?;
        Ok(weights)
    }

    pub fn validate(&self) -> Result<()> {
        let parts = [self.frequency, self.hot, self.overdue, self.pairs];
        if parts.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(StatsError::InvalidWeights(format!("negative or non-finite weight in {self:?}")));
        }
        let sum: f64 = parts.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(StatsError::InvalidWeights(format!("weights sum to {sum}, expected 1.0")));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Strategy {
    Balanced,
    Trending,
    Contrarian,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Balanced, Strategy::Trending, Strategy::Contrarian];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Balanced => "Balanced",
            Strategy::Trending => "Trending",
            Strategy::Contrarian => "Contrarian",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Strategy::Balanced => "A well-rounded blend of frequency trends, momentum, and overdue numbers.",
            Strategy::Trending => "Favors numbers showing strong momentum in recent draws.",
            Strategy::Contrarian => "Targets numbers whose current absence is longest relative to their expected interval.",
        }
    }

    pub fn weights(&self) -> StrategyWeights {
        let (frequency, hot, overdue, pairs) = match self {
            Strategy::Balanced => (0.30, 0.30, 0.25, 0.15),
            Strategy::Trending => (0.20, 0.50, 0.15, 0.15),
            Strategy::Contrarian => (0.15, 0.10, 0.60, 0.15),
        };
        StrategyWeights { frequency, hot, overdue, pairs }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
