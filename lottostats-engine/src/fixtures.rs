//! Draw histories for tests and demos.

use chrono::{Days, NaiveDate};
use rand::SeedableRng;
use rand::rngs::StdRng;

use lottostats_db::models::{DrawHistory, DrawResult, GameSchema};

use crate::quick_pick::random_pick;

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid fixture date")
}

/// A draw dated `day` days after 2024-01-01.
pub fn draw_on(day: u64, numbers: &[u8], bonus: Option<u8>) -> DrawResult {
    let date = base_date() + Days::new(day);
    DrawResult::new(date, numbers.to_vec(), bonus)
}

/// Panics on duplicate dates; fixtures are expected to be well formed.
pub fn history_from(draws: Vec<DrawResult>) -> DrawHistory {
    DrawHistory::new(draws).expect("fixture draws must have unique dates")
}

/// `n` draws of consecutive runs that sweep the main pool, one per day.
pub fn make_test_history(schema: &GameSchema, n: usize) -> DrawHistory {
    let max = schema.main_max as usize;
    let draws = (0..n)
        .map(|i| {
            let start = (i * schema.main_count) % max;
            let numbers: Vec<u8> = (0..schema.main_count)
                .map(|j| ((start + j) % max + 1) as u8)
                .collect();
            let bonus = schema
                .has_bonus()
                .then(|| (i % schema.bonus_max as usize + 1) as u8);
            draw_on(i as u64, &numbers, bonus)
        })
        .collect();
    history_from(draws)
}

/// `n` uniformly random draws, reproducible from `seed`.
pub fn make_random_history(schema: &GameSchema, n: usize, seed: u64) -> DrawHistory {
    let mut rng = StdRng::seed_from_u64(seed);
    let draws = (0..n)
        .map(|i| {
            let pick = random_pick(schema, &mut rng);
            draw_on(i as u64, &pick.numbers, pick.bonus)
        })
        .collect();
    history_from(draws)
}
