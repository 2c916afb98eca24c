use serde::Serialize;
use std::collections::HashMap;

use lottostats_db::error::{Result, StatsError};
use lottostats_db::models::{DrawHistory, MAX_DRAW_SIZE};

pub const DEFAULT_PAIR_WINDOW: usize = 200;

/// A sorted K-subset of one draw's main numbers and how often it occurred.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinationEntry<const K: usize> {
    #[serde(serialize_with = "array_seq::serialize")]
    pub numbers: [u8; K],
    pub count: u32,
    pub percentage: f64,
}

pub type PairEntry = CombinationEntry<2>;
pub type TripletEntry = CombinationEntry<3>;
pub type QuadrupletEntry = CombinationEntry<4>;

impl<const K: usize> CombinationEntry<K> {
    pub fn contains(&self, number: u8) -> bool {
        self.numbers.contains(&number)
    }
}

impl PairEntry {
    /// The partner of `number` in this pair, if it is part of it.
    pub fn partner_of(&self, number: u8) -> Option<u8> {
        match self.numbers {
            [a, b] if a == number => Some(b),
            [a, b] if b == number => Some(a),
            _ => None,
        }
    }
}

mod array_seq {
    use serde::Serializer;

    pub fn serialize<S: Serializer, const K: usize>(numbers: &[u8; K], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(numbers.iter())
    }
}

/// Calls `f` with every K-subset of `sorted`, in lexicographic order.
fn for_each_combination<const K: usize>(sorted: &[u8], mut f: impl FnMut([u8; K])) {
    let n = sorted.len();
    if K == 0 || n < K {
        return;
    }
    let mut idx: [usize; K] = std::array::from_fn(|i| i);
    loop {
        f(std::array::from_fn(|i| sorted[idx[i]]));

        let mut i = K - 1;
        while idx[i] == i + n - K {
            if i == 0 {
                return;
            }
            i -= 1;
        }
        idx[i] += 1;
        for j in i + 1..K {
            idx[j] = idx[j - 1] + 1;
        }
    }
}

/// Co-occurrence counts of K-subsets over the `window_size` newest draws.
///
/// Sorted by count descending, ties by tuple ascending; `top = None` keeps every entry.
///
/// Only the lower bound is checked here: a 0 gives `OutOfRange`. The pool maximum is
/// not known to this function, so draws are expected to have passed `validate_draw`.
pub fn calculate_combinations<const K: usize>(
    history: &DrawHistory,
    window_size: usize,
    top: Option<usize>,
) -> Result<Vec<CombinationEntry<K>>> {
    let window = history.recent(window_size);
    let mut counts: HashMap<[u8; K], u32> = HashMap::new();

    for draw in window {
        if draw.numbers.len() > MAX_DRAW_SIZE {
            return Err(StatsError::DrawTooLarge {
                size: draw.numbers.len(),
                max: MAX_DRAW_SIZE,
            });
        }
        if draw.numbers.contains(&0) {
            return Err(StatsError::OutOfRange {
                number: 0,
                max: u8::MAX,
                date: draw.date,
            });
        }
        let sorted = draw.sorted_numbers();
        for_each_combination::<K>(&sorted, |combo| {
            *counts.entry(combo).or_insert(0) += 1;
        });
    }

    let examined = window.len();
    let mut entries: Vec<CombinationEntry<K>> = counts
        .into_iter()
        .map(|(numbers, count)| CombinationEntry {
            numbers,
            count,
            percentage: if examined > 0 {
                count as f64 / examined as f64 * 100.0
            } else {
                0.0
            },
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then(a.numbers.cmp(&b.numbers)));
    if let Some(top) = top {
        entries.truncate(top);
    }

    log::debug!("combinations k={}: {} distinct over {} draws", K, entries.len(), examined);
    Ok(entries)
}

pub fn calculate_pairs(history: &DrawHistory, window_size: usize, top: Option<usize>) -> Result<Vec<PairEntry>> {
    calculate_combinations::<2>(history, window_size, top)
}

pub fn calculate_triplets(history: &DrawHistory, window_size: usize, top: Option<usize>) -> Result<Vec<TripletEntry>> {
    calculate_combinations::<3>(history, window_size, top)
}

pub fn calculate_quadruplets(history: &DrawHistory, window_size: usize, top: Option<usize>) -> Result<Vec<QuadrupletEntry>> {
    calculate_combinations::<4>(history, window_size, top)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{draw_on, history_from};

    fn collect<const K: usize>(sorted: &[u8]) -> Vec<[u8; K]> {
        let mut out = Vec::new();
        for_each_combination::<K>(sorted, |c| out.push(c));
        out
    }

    #[test]
    fn test_enumeration_counts() {
        let nums = [1, 2, 3, 4, 5];
        assert_eq!(collect::<2>(&nums).len(), 10);
        assert_eq!(collect::<3>(&nums).len(), 10);
        assert_eq!(collect::<4>(&nums).len(), 5);
        assert_eq!(collect::<2>(&[1, 2, 3, 4, 5, 6]).len(), 15);
        assert!(collect::<4>(&[1, 2, 3]).is_empty());
    }

    #[test]
    fn test_enumeration_lexicographic() {
        assert_eq!(
            collect::<2>(&[1, 2, 3, 4]),
            vec![[1, 2], [1, 3], [1, 4], [2, 3], [2, 4], [3, 4]]
        );
        assert_eq!(collect::<4>(&[1, 2, 3, 4, 5])[4], [2, 3, 4, 5]);
    }

    #[test]
    fn test_single_draw_pairs() {
        let history = history_from(vec![draw_on(0, &[1, 2, 3, 4, 5], None)]);
        let pairs = calculate_pairs(&history, 1, None).unwrap();
        assert_eq!(pairs.len(), 10);
        assert!(pairs.iter().all(|p| p.count == 1 && (p.percentage - 100.0).abs() < 1e-10));
        assert_eq!(pairs[0].numbers, [1, 2]);
        assert_eq!(pairs[9].numbers, [4, 5]);
    }

    #[test]
    fn test_unsorted_draw_numbers_are_sorted() {
        let history = history_from(vec![draw_on(0, &[5, 3, 1, 4, 2], None)]);
        let triplets = calculate_triplets(&history, 10, None).unwrap();
        assert!(triplets.iter().all(|t| t.numbers[0] < t.numbers[1] && t.numbers[1] < t.numbers[2]));
        assert_eq!(triplets[0].numbers, [1, 2, 3]);
    }

    #[test]
    fn test_ranking_and_window() {
        let history = history_from(vec![
            draw_on(0, &[10, 11, 12, 13, 14], None),
            draw_on(1, &[1, 2, 3, 4, 5], None),
            draw_on(2, &[1, 2, 6, 7, 8], None),
        ]);
        let pairs = calculate_pairs(&history, 2, Some(3)).unwrap();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0].numbers, [1, 2]);
        assert_eq!(pairs[0].count, 2);
        assert!((pairs[0].percentage - 100.0).abs() < 1e-10);
        // Oldest draw is outside the window
        let all = calculate_pairs(&history, 2, None).unwrap();
        assert!(all.iter().all(|p| !p.contains(10)));
        assert_eq!(all.len(), 19);
    }

    #[test]
    fn test_quadruplets_count_per_draw() {
        let history = history_from(vec![
            draw_on(0, &[1, 2, 3, 4, 5], None),
            draw_on(1, &[6, 7, 8, 9, 10], None),
        ]);
        let quads = calculate_quadruplets(&history, usize::MAX, None).unwrap();
        assert_eq!(quads.len(), 10);
        let total: u32 = quads.iter().map(|q| q.count).sum();
        assert_eq!(total, 10);
    }

    #[test]
    fn test_empty_history() {
        let pairs = calculate_pairs(&DrawHistory::empty(), DEFAULT_PAIR_WINDOW, None).unwrap();
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_oversized_draw_rejected() {
        let history = history_from(vec![draw_on(0, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11], None)]);
        assert!(matches!(
            calculate_pairs(&history, 10, None),
            Err(StatsError::DrawTooLarge { size: 11, .. })
        ));
    }

    #[test]
    fn test_zero_number_rejected() {
        let history = history_from(vec![
            draw_on(0, &[0, 2, 3, 4, 5], None),
            draw_on(1, &[1, 2, 3, 4, 5], None),
        ]);
        for result in [
            calculate_pairs(&history, 10, None).map(|e| e.len()),
            calculate_triplets(&history, 10, None).map(|e| e.len()),
            calculate_quadruplets(&history, 10, None).map(|e| e.len()),
        ] {
            assert!(matches!(result, Err(StatsError::OutOfRange { number: 0, .. })), "{result:?}");
        }
        // Outside the window the bad draw is never looked at
        assert!(calculate_pairs(&history, 1, None).is_ok());
    }

    #[test]
    fn test_partner_of() {
        let pair = PairEntry { numbers: [3, 9], count: 1, percentage: 0.0 };
        assert_eq!(pair.partner_of(3), Some(9));
        assert_eq!(pair.partner_of(9), Some(3));
        assert_eq!(pair.partner_of(4), None);
    }
}
