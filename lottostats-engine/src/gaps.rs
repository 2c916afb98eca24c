use serde::Serialize;

use lottostats_db::error::Result;
use lottostats_db::models::{DrawHistory, GameSchema, Pool};

use crate::frequency::{ensure_pool, slot};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapEntry {
    pub number: u8,
    pub avg_gap: f64,
    pub min_gap: u32,
    pub max_gap: u32,
    /// Draws since the last appearance (history length when never drawn)
    pub current_gap: u32,
    pub appearances: u32,
}

impl GapEntry {
    pub fn overdue_ratio(&self, expected_interval: f64) -> f64 {
        overdue_ratio(self.current_gap, expected_interval)
    }
}

/// Draws expected between two appearances of one number: pool size / numbers drawn.
pub fn expected_interval(schema: &GameSchema, pool: Pool) -> f64 {
    let picks = schema.pick_count(pool);
    if picks == 0 {
        return 0.0;
    }
    schema.pool_max(pool) as f64 / picks as f64
}

pub fn overdue_ratio(draws_since_last_drawn: u32, expected_interval: f64) -> f64 {
    if expected_interval > 0.0 {
        draws_since_last_drawn as f64 / expected_interval
    } else {
        0.0
    }
}

/// Spacing between consecutive appearances of every number in `[1, max_number]`.
///
/// Numbers seen fewer than twice have no gaps and report 0 for avg/min/max.
pub fn calculate_gaps(history: &DrawHistory, max_number: u8, pool: Pool) -> Result<Vec<GapEntry>> {
    ensure_pool(max_number)?;
    let size = max_number as usize;
    let mut positions: Vec<Vec<usize>> = vec![Vec::new(); size];

    for (i, draw) in history.iter().enumerate() {
        for &n in pool.numbers_from(draw) {
            positions[slot(n, max_number, draw)?].push(i);
        }
    }

    let total = history.len() as u32;
    Ok((1..=max_number)
        .zip(positions)
        .map(|(number, seen)| {
            let gaps: Vec<u32> = seen.windows(2).map(|w| (w[1] - w[0]) as u32).collect();
            let (avg_gap, min_gap, max_gap) = if gaps.is_empty() {
                (0.0, 0, 0)
            } else {
                let sum: u32 = gaps.iter().sum();
                (
                    sum as f64 / gaps.len() as f64,
                    gaps.iter().copied().min().unwrap_or(0),
                    gaps.iter().copied().max().unwrap_or(0),
                )
            };
            GapEntry {
                number,
                avg_gap,
                min_gap,
                max_gap,
                current_gap: seen.first().map(|&i| i as u32).unwrap_or(total),
                appearances: seen.len() as u32,
            }
        })
        .collect())
}
