use serde::Serialize;

use lottostats_db::error::{Result, StatsError};
use lottostats_db::models::{DrawHistory, DrawResult, Pool};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberFrequency {
    pub number: u8,
    pub count: u32,
    pub percentage: f64,
    pub draws_since_last_drawn: u32,
}

pub(crate) fn ensure_pool(max_number: u8) -> Result<()> {
    if max_number == 0 {
        return Err(StatsError::InvalidSchema("pool maximum must be positive".into()));
    }
    Ok(())
}

/// Number of appearances of each number in `draws`, indexed by `number - 1`.
pub(crate) fn tally(draws: &[DrawResult], max_number: u8, pool: Pool) -> Result<Vec<u32>> {
    let mut counts = vec![0u32; max_number as usize];
    for draw in draws {
        for &n in pool.numbers_from(draw) {
            counts[slot(n, max_number, draw)?] += 1;
        }
    }
    Ok(counts)
}

pub(crate) fn slot(number: u8, max_number: u8, draw: &DrawResult) -> Result<usize> {
    if number < 1 || number > max_number {
        return Err(StatsError::OutOfRange {
            number,
            max: max_number,
            date: draw.date,
        });
    }
    Ok((number - 1) as usize)
}

/// Appearance count, share of draws and current gap for every number in `[1, max_number]`.
///
/// The result is in ascending number order and always has `max_number` entries;
/// use [`rank_by_count`] for a ranking.
pub fn calculate_frequency(history: &DrawHistory, max_number: u8, pool: Pool) -> Result<Vec<NumberFrequency>> {
    ensure_pool(max_number)?;
    let total = history.len();
    let mut counts = vec![0u32; max_number as usize];
    let mut last_seen: Vec<Option<usize>> = vec![None; max_number as usize];

    for (i, draw) in history.iter().enumerate() {
        for &n in pool.numbers_from(draw) {
            let idx = slot(n, max_number, draw)?;
            counts[idx] += 1;
            if last_seen[idx].is_none() {
                last_seen[idx] = Some(i);
            }
        }
    }

    let frequencies = (1..=max_number)
        .map(|n| {
            let idx = (n - 1) as usize;
            let count = counts[idx];
            let percentage = if total > 0 {
                count as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            NumberFrequency {
                number: n,
                count,
                percentage,
                draws_since_last_drawn: last_seen[idx].unwrap_or(total) as u32,
            }
        })
        .collect();

    log::debug!("frequency: {} {} numbers over {} draws", max_number, pool.label(), total);
    Ok(frequencies)
}

/// Most drawn first; ties keep ascending number order.
pub fn rank_by_count(frequencies: &[NumberFrequency]) -> Vec<NumberFrequency> {
    let mut ranked = frequencies.to_vec();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then(a.number.cmp(&b.number)));
    ranked
}

/// 1-based position of `number` in [`rank_by_count`] order.
pub fn frequency_rank(frequencies: &[NumberFrequency], number: u8) -> Option<usize> {
    rank_by_count(frequencies)
        .iter()
        .position(|f| f.number == number)
        .map(|p| p + 1)
}
