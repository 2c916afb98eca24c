//! Uniform random tickets, with no statistics behind them.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use lottostats_db::models::GameSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickPick {
    /// Ascending, duplicate-free
    pub numbers: Vec<u8>,
    pub bonus: Option<u8>,
}

/// One uniform pick: `main_count` distinct main numbers and a bonus when the game has one.
pub fn random_pick<R: Rng + ?Sized>(schema: &GameSchema, rng: &mut R) -> QuickPick {
    let mut numbers: Vec<u8> = rand::seq::index::sample(rng, schema.main_max as usize, schema.main_count)
        .into_iter()
        .map(|idx| (idx + 1) as u8)
        .collect();
    numbers.sort_unstable();
    let bonus = schema.has_bonus().then(|| rng.random_range(1..=schema.bonus_max));
    QuickPick { numbers, bonus }
}

/// `count` quick picks, reproducible from `seed`.
pub fn quick_picks(schema: &GameSchema, count: usize, seed: u64) -> Vec<QuickPick> {
    let mut rng = StdRng::seed_from_u64(seed);
    let picks: Vec<QuickPick> = (0..count).map(|_| random_pick(schema, &mut rng)).collect();
    log::debug!("quick pick: {} tickets of {}/{}", picks.len(), schema.main_count, schema.main_max);
    picks
}
