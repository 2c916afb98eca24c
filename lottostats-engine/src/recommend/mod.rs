pub mod strategy;

use std::collections::HashMap;

use chrono::Datelike;
use rand::SeedableRng;
use rand::distr::weighted::WeightedIndex;
use rand::prelude::Distribution;
use rand::rngs::StdRng;
use serde::Serialize;

use lottostats_db::error::{Result, StatsError};
use lottostats_db::models::{DrawHistory, GameSchema, Pool};

use crate::combinations::calculate_pairs;
use crate::config::{AnalysisConfig, HotColdConfig};
use crate::frequency::calculate_frequency;
use crate::gaps::{expected_interval, overdue_ratio};
use crate::hot_cold::calculate_hot_cold_with;

pub use strategy::{Strategy, StrategyWeights};

/// Keeps all-zero score slices samplable.
const WEIGHT_FLOOR: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendedSet {
    /// Ascending, duplicate-free
    pub numbers: Vec<u8>,
    pub bonus: Option<u8>,
    /// Mean composite score of the picks
    pub score: f64,
    pub strategy: String,
}

/// Deterministic seed from today's date (YYYYMMDD).
pub fn date_seed() -> u64 {
    let today = chrono::Local::now().date_naive();
    let y = today.year() as u64;
    let m = today.month() as u64;
    let d = today.day() as u64;
    y * 10_000 + m * 100 + d
}

/// Min-max scaling to [0, 1]; a flat signal maps to all zeros.
fn normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if !range.is_finite() || range <= f64::EPSILON {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - min) / range).collect()
}

/// Normalised frequency, momentum and overdue signals for one pool, indexed by `number - 1`.
#[derive(Debug, Clone)]
struct PoolSignals {
    frequency: Vec<f64>,
    hot: Vec<f64>,
    overdue: Vec<f64>,
}

impl PoolSignals {
    fn compute(history: &DrawHistory, schema: &GameSchema, pool: Pool, hot_cold: &HotColdConfig) -> Result<Self> {
        let max = schema.pool_max(pool);
        let interval = expected_interval(schema, pool);
        let freq = calculate_frequency(history, max, pool)?;
        let hot = calculate_hot_cold_with(history, max, pool, hot_cold)?;

        let counts: Vec<f64> = freq.iter().map(|f| f.count as f64).collect();
        let scores: Vec<f64> = hot.iter().map(|h| h.score).collect();
        let overdue: Vec<f64> = freq
            .iter()
            .map(|f| overdue_ratio(f.draws_since_last_drawn, interval))
            .collect();

        Ok(Self {
            frequency: normalize(&counts),
            hot: normalize(&scores),
            overdue: normalize(&overdue),
        })
    }

    fn blend(&self, weights: &StrategyWeights) -> Vec<f64> {
        (0..self.frequency.len())
            .map(|i| {
                weights.frequency * self.frequency[i]
                    + weights.hot * self.hot[i]
                    + weights.overdue * self.overdue[i]
            })
            .collect()
    }
}

fn pair_key(a: u8, b: u8) -> (u8, u8) {
    if a < b { (a, b) } else { (b, a) }
}

/// Ranks `(number, score)` candidates by score descending, number ascending,
/// then draws one from the best `width` with probability proportional to score.
fn pick_candidate(mut ranked: Vec<(u8, f64)>, width: usize, rng: &mut StdRng) -> Result<(u8, f64)> {
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
    let width = width.max(1).min(ranked.len());
    let shortlist = &ranked[..width];
    match shortlist {
        [] => Err(StatsError::Sampling("no candidates left".into())),
        [only] => Ok(*only),
        _ => {
            let weights: Vec<f64> = shortlist.iter().map(|(_, s)| s.max(0.0) + WEIGHT_FLOOR).collect();
            let dist = WeightedIndex::new(&weights).map_err(|e| StatsError::Sampling(e.to_string()))?;
            Ok(shortlist[dist.sample(rng)])
        }
    }
}

/// Accumulator for one set: later picks see the pair bonus of earlier ones.
#[derive(Debug, Clone, Default)]
struct SetBuilder {
    chosen: Vec<u8>,
    scores: Vec<f64>,
}

impl SetBuilder {
    fn step(mut self, recommender: &Recommender, base: &[f64], pair_weight: f64, width: usize, rng: &mut StdRng) -> Result<Self> {
        let candidates: Vec<u8> = (1..=recommender.schema.main_max)
            .filter(|n| !self.chosen.contains(n))
            .collect();

        let raw_bonus: Vec<f64> = candidates
            .iter()
            .map(|&c| {
                self.chosen
                    .iter()
                    .map(|&s| recommender.pair_counts.get(&pair_key(c, s)).copied().unwrap_or(0) as f64)
                    .sum()
            })
            .collect();
        let max_bonus = raw_bonus.iter().copied().fold(0.0, f64::max);

        let ranked: Vec<(u8, f64)> = candidates
            .iter()
            .zip(&raw_bonus)
            .map(|(&c, &bonus)| {
                let pair_norm = if max_bonus > 0.0 { bonus / max_bonus } else { 0.0 };
                (c, base[(c - 1) as usize] + pair_weight * pair_norm)
            })
            .collect();

        let (number, score) = pick_candidate(ranked, width, rng)?;
        self.chosen.push(number);
        self.scores.push(score);
        Ok(self)
    }

    fn finish(self, bonus: Option<u8>, strategy: &str) -> RecommendedSet {
        let score = if self.scores.is_empty() {
            0.0
        } else {
            self.scores.iter().sum::<f64>() / self.scores.len() as f64
        };
        let mut numbers = self.chosen;
        numbers.sort_unstable();
        RecommendedSet {
            numbers,
            bonus,
            score,
            strategy: strategy.to_string(),
        }
    }
}

/// Signals computed once per history and reused across strategies.
#[derive(Debug, Clone)]
pub struct Recommender {
    schema: GameSchema,
    main: PoolSignals,
    bonus: Option<PoolSignals>,
    pair_counts: HashMap<(u8, u8), u32>,
}

impl Recommender {
    pub fn new(history: &DrawHistory, schema: &GameSchema, config: &AnalysisConfig) -> Result<Self> {
        let main = PoolSignals::compute(history, schema, Pool::Main, &config.hot_cold)?;
        let bonus = if schema.has_bonus() {
            Some(PoolSignals::compute(history, schema, Pool::Bonus, &config.hot_cold)?)
        } else {
            None
        };
        let pair_counts: HashMap<(u8, u8), u32> = calculate_pairs(history, config.recommend.pair_window, Some(config.recommend.pair_top))?
            .into_iter()
            .map(|p| (pair_key(p.numbers[0], p.numbers[1]), p.count))
            .collect();

        Ok(Self {
            schema: *schema,
            main,
            bonus,
            pair_counts,
        })
    }

    /// `set_count` sets; set `k` samples each pick from the best `1 + 2k` candidates.
    pub fn generate(&self, weights: &StrategyWeights, label: &str, set_count: usize, seed: u64) -> Result<Vec<RecommendedSet>> {
        weights.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let main_base = self.main.blend(weights);
        let bonus_base = self.bonus.as_ref().map(|b| b.blend(weights));

        let mut sets = Vec::with_capacity(set_count);
        for set_index in 0..set_count {
            let width = 1 + 2 * set_index;
            let builder = (0..self.schema.main_count).try_fold(SetBuilder::default(), |acc, _| {
                acc.step(self, &main_base, weights.pairs, width, &mut rng)
            })?;

            let bonus = match &bonus_base {
                Some(base) => {
                    let ranked = (1..=self.schema.bonus_max)
                        .map(|n| (n, base[(n - 1) as usize]))
                        .collect();
                    Some(pick_candidate(ranked, width, &mut rng)?.0)
                }
                None => None,
            };

            sets.push(builder.finish(bonus, label));
        }

        log::debug!("recommend: {} sets for strategy {}", sets.len(), label);
        Ok(sets)
    }
}

/// Builds `set_count` recommendation sets for one predefined strategy with default settings.
pub fn generate_recommendations(
    history: &DrawHistory,
    schema: &GameSchema,
    strategy: Strategy,
    set_count: usize,
    seed: u64,
) -> Result<Vec<RecommendedSet>> {
    Recommender::new(history, schema, &AnalysisConfig::default())?
        .generate(&strategy.weights(), strategy.name(), set_count, seed)
}
