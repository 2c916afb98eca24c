use lottostats_db::error::StatsError;
use lottostats_db::models::{DrawHistory, Game, Pool};
use lottostats_engine::combinations::{calculate_pairs, calculate_quadruplets, calculate_triplets};
use lottostats_engine::fixtures::{draw_on, history_from, make_random_history, make_test_history};
use lottostats_engine::frequency::calculate_frequency;
use lottostats_engine::gaps::calculate_gaps;
use lottostats_engine::hot_cold::{calculate_hot_cold, Classification};
use lottostats_engine::recommend::{generate_recommendations, Strategy};

const DRAWS: usize = 250;

fn pools(game: Game) -> Vec<Pool> {
    if game.schema().has_bonus() {
        vec![Pool::Main, Pool::Bonus]
    } else {
        vec![Pool::Main]
    }
}

#[test]
fn frequency_counts_sum_to_numbers_drawn() {
    for game in Game::ALL {
        let schema = game.schema();
        let history = make_random_history(&schema, DRAWS, 17);
        for pool in pools(game) {
            let freq = calculate_frequency(&history, schema.pool_max(pool), pool).unwrap();
            let total: u32 = freq.iter().map(|f| f.count).sum();
            assert_eq!(total as usize, DRAWS * schema.pick_count(pool), "{game} {pool:?}");
        }
    }
}

#[test]
fn every_engine_covers_the_whole_pool() {
    for game in Game::ALL {
        let schema = game.schema();
        let history = make_test_history(&schema, 40);
        for pool in pools(game) {
            let max = schema.pool_max(pool);
            let expected: Vec<u8> = (1..=max).collect();
            let freq = calculate_frequency(&history, max, pool).unwrap();
            let hot = calculate_hot_cold(&history, max, pool).unwrap();
            let gaps = calculate_gaps(&history, max, pool).unwrap();
            assert_eq!(freq.iter().map(|f| f.number).collect::<Vec<_>>(), expected);
            assert_eq!(hot.iter().map(|h| h.number).collect::<Vec<_>>(), expected);
            assert_eq!(gaps.iter().map(|g| g.number).collect::<Vec<_>>(), expected);
        }
    }
}

#[test]
fn engines_are_idempotent() {
    for game in Game::ALL {
        let schema = game.schema();
        let history = make_random_history(&schema, DRAWS, 5);
        let max = schema.main_max;
        assert_eq!(
            calculate_frequency(&history, max, Pool::Main).unwrap(),
            calculate_frequency(&history, max, Pool::Main).unwrap()
        );
        assert_eq!(
            calculate_hot_cold(&history, max, Pool::Main).unwrap(),
            calculate_hot_cold(&history, max, Pool::Main).unwrap()
        );
        assert_eq!(
            calculate_gaps(&history, max, Pool::Main).unwrap(),
            calculate_gaps(&history, max, Pool::Main).unwrap()
        );
        assert_eq!(calculate_pairs(&history, 200, None).unwrap(), calculate_pairs(&history, 200, None).unwrap());
        assert_eq!(
            generate_recommendations(&history, &schema, Strategy::Balanced, 3, 7).unwrap(),
            generate_recommendations(&history, &schema, Strategy::Balanced, 3, 7).unwrap()
        );
    }
}

#[test]
fn gaps_agree_with_frequency() {
    for game in Game::ALL {
        let schema = game.schema();
        let history = make_random_history(&schema, DRAWS, 23);
        for pool in pools(game) {
            let max = schema.pool_max(pool);
            let freq = calculate_frequency(&history, max, pool).unwrap();
            let gaps = calculate_gaps(&history, max, pool).unwrap();
            for (f, g) in freq.iter().zip(&gaps) {
                assert_eq!(f.draws_since_last_drawn, g.current_gap, "{game} #{}", f.number);
                assert_eq!(f.count, g.appearances);
                if g.appearances >= 2 {
                    assert!(g.min_gap as f64 <= g.avg_gap && g.avg_gap <= g.max_gap as f64);
                    assert!(g.min_gap >= 1);
                }
            }
        }
    }
}

#[test]
fn combination_counts_are_bounded_per_draw() {
    for game in Game::ALL {
        let schema = game.schema();
        let history = make_random_history(&schema, 60, 31);
        let k = schema.main_count as u32;
        let per_draw = |r: u32| (0..r).fold(1u32, |acc, i| acc * (k - i) / (i + 1));

        let pairs: u32 = calculate_pairs(&history, usize::MAX, None).unwrap().iter().map(|p| p.count).sum();
        let triplets: u32 = calculate_triplets(&history, usize::MAX, None).unwrap().iter().map(|t| t.count).sum();
        let quads: u32 = calculate_quadruplets(&history, usize::MAX, None).unwrap().iter().map(|q| q.count).sum();
        assert_eq!(pairs, 60 * per_draw(2), "{game}");
        assert_eq!(triplets, 60 * per_draw(3), "{game}");
        assert_eq!(quads, 60 * per_draw(4), "{game}");
    }
}

#[test]
fn recommended_sets_are_valid() {
    for game in Game::ALL {
        let schema = game.schema();
        let history = make_random_history(&schema, DRAWS, 41);
        for strategy in Strategy::ALL {
            let sets = generate_recommendations(&history, &schema, strategy, 5, 2024).unwrap();
            assert_eq!(sets.len(), 5);
            for set in sets {
                assert_eq!(set.numbers.len(), schema.main_count);
                assert!(set.numbers.windows(2).all(|w| w[0] < w[1]), "{game}: {:?}", set.numbers);
                assert!(set.numbers.iter().all(|&n| (1..=schema.main_max).contains(&n)));
                assert_eq!(set.bonus.is_some(), schema.has_bonus());
                if let Some(b) = set.bonus {
                    assert!((1..=schema.bonus_max).contains(&b));
                }
                assert!(set.score.is_finite() && set.score >= 0.0);
            }
        }
    }
}

#[test]
fn empty_history_is_not_an_error() {
    let empty = DrawHistory::empty();
    for game in Game::ALL {
        let schema = game.schema();
        for pool in pools(game) {
            let max = schema.pool_max(pool);
            let freq = calculate_frequency(&empty, max, pool).unwrap();
            assert!(freq.iter().all(|f| f.count == 0 && f.percentage == 0.0 && f.draws_since_last_drawn == 0));
            let hot = calculate_hot_cold(&empty, max, pool).unwrap();
            assert!(hot.iter().all(|h| h.classification == Classification::Warm));
            assert_eq!(calculate_gaps(&empty, max, pool).unwrap().len(), max as usize);
        }
        assert!(calculate_pairs(&empty, 200, None).unwrap().is_empty());
        let sets = generate_recommendations(&empty, &schema, Strategy::Contrarian, 2, 0).unwrap();
        assert_eq!(sets.len(), 2);
    }
}

#[test]
fn frequency_scenario() {
    let history = history_from(vec![
        draw_on(0, &[1, 2, 3, 4, 5], None),
        draw_on(1, &[1, 2, 6, 7, 8], None),
        draw_on(2, &[9, 10, 11, 12, 13], None),
    ]);
    let freq = calculate_frequency(&history, 13, Pool::Main).unwrap();
    assert_eq!(freq[0].count, 2);
    assert_eq!(freq[8].count, 1);
    assert_eq!(freq[2].draws_since_last_drawn, 2);
}

#[test]
fn single_draw_pair_scenario() {
    let history = history_from(vec![draw_on(0, &[1, 2, 3, 4, 5], None)]);
    let pairs = calculate_pairs(&history, 1, None).unwrap();
    assert_eq!(pairs.len(), 10);
    assert!(pairs.iter().all(|p| p.count == 1));
}

#[test]
fn out_of_range_numbers_are_reported() {
    let history = history_from(vec![draw_on(0, &[1, 2, 3, 4, 70], Some(1))]);
    let err = calculate_frequency(&history, 69, Pool::Main).unwrap_err();
    assert!(matches!(err, StatsError::OutOfRange { number: 70, max: 69, .. }));
    assert!(calculate_gaps(&history, 69, Pool::Main).is_err());
    assert!(calculate_hot_cold(&history, 69, Pool::Main).is_err());
}

#[test]
fn jackpot_odds_match_published_figures() {
    let expected = [
        (Game::Powerball, 292_201_338u128),
        (Game::MegaMillions, 290_472_336),
        (Game::Cash4Life, 21_846_048),
        (Game::NyLotto, 45_057_474),
        (Game::Take5, 575_757),
    ];
    for (game, odds) in expected {
        assert_eq!(game.jackpot_odds(), odds, "{game}");
    }
}
