use serde::Serialize;
use std::fmt;

use lottostats_db::error::Result;
use lottostats_db::models::{DrawHistory, Pool};

use crate::config::HotColdConfig;
use crate::frequency::{ensure_pool, tally};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Hot,
    Warm,
    Cold,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Hot => write!(f, "HOT"),
            Classification::Warm => write!(f, "WARM"),
            Classification::Cold => write!(f, "COLD"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotColdEntry {
    pub number: u8,
    pub score: f64,
    pub classification: Classification,
}

/// Momentum score over the recent, medium and all-time windows with the default weights.
pub fn calculate_hot_cold(history: &DrawHistory, max_number: u8, pool: Pool) -> Result<Vec<HotColdEntry>> {
    calculate_hot_cold_with(history, max_number, pool, &HotColdConfig::default())
}

pub fn calculate_hot_cold_with(
    history: &DrawHistory,
    max_number: u8,
    pool: Pool,
    config: &HotColdConfig,
) -> Result<Vec<HotColdEntry>> {
    ensure_pool(max_number)?;
    let size = max_number as usize;

    let windows = [
        (history.recent(config.recent_window), config.recent_weight),
        (history.recent(config.medium_window), config.medium_weight),
        (history.draws(), config.all_time_weight),
    ];

    let mut scores = vec![0.0f64; size];
    for (window, weight) in windows {
        if window.is_empty() {
            continue;
        }
        // Normalised by the window's own length so horizons are comparable
        let counts = tally(window, max_number, pool)?;
        let len = window.len() as f64;
        for (score, &count) in scores.iter_mut().zip(&counts) {
            *score += weight * count as f64 / len;
        }
    }

    let classes = classify(&scores, config.band);
    Ok((1..=max_number)
        .zip(scores)
        .zip(classes)
        .map(|((number, score), classification)| HotColdEntry {
            number,
            score,
            classification,
        })
        .collect())
}

/// Relative spread below which scores count as flat.
const FLAT_TOLERANCE: f64 = 1e-12;

/// Hot above `mean + band * std`, cold below `mean - band * std`, warm in between.
/// Flat scores are all warm.
fn classify(scores: &[f64], band: f64) -> Vec<Classification> {
    if scores.is_empty() {
        return Vec::new();
    }
    let n = scores.len() as f64;
    let mean = scores.iter().sum::<f64>() / n;
    let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();
    // Rounding leaves a residue of a few ulps when every score is equal
    if std_dev <= FLAT_TOLERANCE * mean.abs().max(1.0) {
        return vec![Classification::Warm; scores.len()];
    }
    let margin = band * std_dev;

    scores
        .iter()
        .map(|&s| {
            if s > mean + margin {
                Classification::Hot
            } else if s < mean - margin {
                Classification::Cold
            } else {
                Classification::Warm
            }
        })
        .collect()
}
