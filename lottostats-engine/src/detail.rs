use serde::Serialize;

use lottostats_db::error::{Result, StatsError};
use lottostats_db::models::{DrawHistory, DrawResult, GameSchema, Pool};

use crate::combinations::calculate_pairs;
use crate::frequency::{calculate_frequency, frequency_rank, rank_by_count, NumberFrequency};
use crate::gaps::{calculate_gaps, expected_interval, GapEntry};
use crate::hot_cold::{calculate_hot_cold, HotColdEntry};

pub const PAIRING_WINDOW: usize = 500;
pub const TOP_PAIRINGS: usize = 10;
pub const RECENT_APPEARANCES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pairing {
    pub partner: u8,
    pub count: u32,
    pub percentage: f64,
}

/// Everything known about one number of one pool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberDetail {
    pub number: u8,
    pub pool: Pool,
    pub frequency: NumberFrequency,
    /// 1-based, by count descending then number ascending
    pub rank: usize,
    pub pool_size: usize,
    pub hot_cold: HotColdEntry,
    pub gap: GapEntry,
    pub overdue_ratio: f64,
    /// Most frequent partners; empty for the bonus pool
    pub pairings: Vec<Pairing>,
    pub recent_appearances: Vec<DrawResult>,
}

pub fn number_detail(history: &DrawHistory, schema: &GameSchema, pool: Pool, number: u8) -> Result<NumberDetail> {
    let max = schema.pool_max(pool);
    if number < 1 || number > max {
        return Err(StatsError::NumberOutOfPool { number, max });
    }
    let idx = (number - 1) as usize;

    let frequencies = calculate_frequency(history, max, pool)?;
    let rank = frequency_rank(&rank_by_count(&frequencies), number).unwrap_or(max as usize);
    let hot_cold = calculate_hot_cold(history, max, pool)?.swap_remove(idx);
    let gap = calculate_gaps(history, max, pool)?.swap_remove(idx);
    let overdue_ratio = gap.overdue_ratio(expected_interval(schema, pool));

    let pairings = match pool {
        Pool::Main => calculate_pairs(history, PAIRING_WINDOW, None)?
            .iter()
            .filter_map(|p| {
                p.partner_of(number).map(|partner| Pairing {
                    partner,
                    count: p.count,
                    percentage: p.percentage,
                })
            })
            .take(TOP_PAIRINGS)
            .collect(),
        Pool::Bonus => Vec::new(),
    };

    let recent_appearances = history
        .iter()
        .filter(|d| pool.numbers_from(d).contains(&number))
        .take(RECENT_APPEARANCES)
        .cloned()
        .collect();

    Ok(NumberDetail {
        number,
        pool,
        frequency: frequencies[idx].clone(),
        rank,
        pool_size: max as usize,
        hot_cold,
        gap,
        overdue_ratio,
        pairings,
        recent_appearances,
    })
}
