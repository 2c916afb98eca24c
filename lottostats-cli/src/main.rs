mod display;
mod import;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use rayon::prelude::*;

use lottostats_db::db::{count_draws, db_path, fetch_history, fetch_last_draws, find_draw, migrate, open_db};
use lottostats_db::models::{DrawHistory, DrawResult, DrawTime, Game, Pool};
use lottostats_db::rusqlite::Connection;
use lottostats_engine::combinations::{calculate_pairs, calculate_quadruplets, calculate_triplets};
use lottostats_engine::config::{AnalysisConfig, load_or_default, save_config};
use lottostats_engine::detail::number_detail;
use lottostats_engine::frequency::calculate_frequency;
use lottostats_engine::gaps::{calculate_gaps, expected_interval};
use lottostats_engine::hot_cold::{Classification, calculate_hot_cold_with};
use lottostats_engine::quick_pick::quick_picks;
use lottostats_engine::recommend::{RecommendedSet, Recommender, Strategy, StrategyWeights, date_seed};
use lottostats_engine::ticket::{check_against_history, check_ticket};

use crate::display::{
    display_combinations, display_draws, display_frequency, display_frequency_chart, display_gaps,
    display_hot_cold, display_import_summary, display_number_detail, display_odds, display_quick_picks,
    display_recommendations, display_summary, display_ticket_checks,
};

#[derive(Parser)]
#[command(name = "lottostats", about = "Draw statistics for US lottery games")]
struct Cli {
    /// SQLite database (default: $LOTTOSTATS_DB, then ./data/lottostats.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// JSON analysis settings; missing fields use defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import draws from an open-data JSON export or a saved data file
    Import {
        #[arg(short, long)]
        game: Game,
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Print the database path
    DbPath,

    /// List the latest draws
    List {
        #[arg(short, long)]
        game: Game,
        #[arg(short, long, default_value = "10")]
        last: u32,
    },

    /// Frequency of every number
    Stats {
        #[arg(short, long)]
        game: Game,
        #[arg(short, long, default_value = "main")]
        pool: Pool,
        /// Only the newest N draws
        #[arg(short, long)]
        window: Option<usize>,
        /// Also draw a bar chart
        #[arg(long)]
        chart: bool,
    },

    /// Hot / warm / cold classification
    HotCold {
        #[arg(short, long)]
        game: Game,
        #[arg(short, long, default_value = "main")]
        pool: Pool,
    },

    /// Gaps between appearances, most overdue first
    Gaps {
        #[arg(short, long)]
        game: Game,
        #[arg(short, long, default_value = "main")]
        pool: Pool,
        #[arg(short, long, default_value = "20")]
        top: usize,
    },

    /// Most common number pairs
    Pairs {
        #[arg(short, long)]
        game: Game,
        #[arg(short, long)]
        window: Option<usize>,
        #[arg(short, long)]
        top: Option<usize>,
    },

    /// Most common number triplets
    Triplets {
        #[arg(short, long)]
        game: Game,
        #[arg(short, long)]
        window: Option<usize>,
        #[arg(short, long)]
        top: Option<usize>,
    },

    /// Most common groups of four numbers
    Quadruplets {
        #[arg(short, long)]
        game: Game,
        #[arg(short, long)]
        window: Option<usize>,
        #[arg(short, long)]
        top: Option<usize>,
    },

    /// Suggest number sets from the statistics
    Recommend {
        #[arg(short, long)]
        game: Game,
        #[arg(short, long, default_value = "balanced")]
        strategy: Strategy,
        /// Run every predefined strategy
        #[arg(long, conflicts_with_all = ["strategy", "weights"])]
        all_strategies: bool,
        /// Custom weights "frequency,hot,overdue,pairs" summing to 1
        #[arg(long)]
        weights: Option<String>,
        /// Number of sets (default from config)
        #[arg(short, long)]
        count: Option<usize>,
        /// Seed for reproducibility (default: today's date)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Uniform random tickets, ignoring the statistics
    QuickPick {
        #[arg(short, long)]
        game: Game,
        #[arg(short, long, default_value = "5")]
        count: usize,
        /// Seed for reproducibility (default: today's date)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Everything about one number
    Number {
        #[arg(short, long)]
        game: Game,
        number: u8,
        #[arg(short, long, default_value = "main")]
        pool: Pool,
    },

    /// Compare a ticket with stored draws
    Check {
        #[arg(short, long)]
        game: Game,
        /// Main numbers, comma separated
        #[arg(short, long, value_delimiter = ',', required = true)]
        numbers: Vec<u8>,
        #[arg(short, long)]
        bonus: Option<u8>,
        /// A single draw date (YYYY-MM-DD) instead of the latest draws
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// midday or evening, for games with two daily drawings
        #[arg(long)]
        draw_time: Option<DrawTime>,
        #[arg(short, long, default_value = "10")]
        last: usize,
    },

    /// Game formats, jackpot odds and the next drawing
    Odds,

    /// One-line overview of every game
    Summary {
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Write the default analysis settings to a JSON file
    InitConfig {
        #[arg(short, long, default_value = "lottostats.json")]
        output: PathBuf,
    },
}

/// Per-game overview row for `summary`.
pub struct GameSummary {
    pub game: Game,
    pub draws: usize,
    pub latest: Option<DrawResult>,
    pub hot: Vec<u8>,
    pub cold: Vec<u8>,
    pub overdue: Vec<u8>,
    pub top_pick: Option<RecommendedSet>,
}

const SUMMARY_SIZE: usize = 5;

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
    let cli = Cli::parse();

    let path = cli.db.clone().unwrap_or_else(db_path);
    let config = load_or_default(cli.config.as_deref())?;

    if let Command::DbPath = cli.command {
        println!("{}", path.display());
        return Ok(());
    }
    if let Command::InitConfig { output } = &cli.command {
        return cmd_init_config(output);
    }
    if let Command::Odds = cli.command {
        return cmd_odds();
    }
    if let Command::QuickPick { game, count, seed } = cli.command {
        let seed = seed.unwrap_or_else(date_seed);
        println!("Seed: {seed}");
        display_quick_picks(game, &quick_picks(&game.schema(), count, seed));
        return Ok(());
    }

    let conn = open_db(&path)?;
    migrate(&conn)?;

    match cli.command {
        Command::Import { game, file } => cmd_import(&conn, game, &file),
        Command::List { game, last } => cmd_list(&conn, game, last),
        Command::Stats { game, pool, window, chart } => cmd_stats(&conn, game, pool, window, chart),
        Command::HotCold { game, pool } => cmd_hot_cold(&conn, &config, game, pool),
        Command::Gaps { game, pool, top } => cmd_gaps(&conn, game, pool, top),
        Command::Pairs { game, window, top } => {
            let cfg = &config.combinations;
            with_history(&conn, game, |history| {
                let window = window.unwrap_or(cfg.pair_window);
                let pairs = calculate_pairs(history, window, Some(top.unwrap_or(cfg.pair_top)))?;
                display_combinations(&format!("{} · pairs", game.name()), &pairs, window.min(history.len()));
                Ok(())
            })
        }
        Command::Triplets { game, window, top } => {
            let cfg = &config.combinations;
            with_history(&conn, game, |history| {
                let window = window.or(cfg.triplet_window).unwrap_or(usize::MAX);
                let triplets = calculate_triplets(history, window, Some(top.unwrap_or(cfg.triplet_top)))?;
                display_combinations(&format!("{} · triplets", game.name()), &triplets, window.min(history.len()));
                Ok(())
            })
        }
        Command::Quadruplets { game, window, top } => {
            let cfg = &config.combinations;
            with_history(&conn, game, |history| {
                let window = window.or(cfg.quadruplet_window).unwrap_or(usize::MAX);
                let quads = calculate_quadruplets(history, window, Some(top.unwrap_or(cfg.quadruplet_top)))?;
                display_combinations(&format!("{} · quadruplets", game.name()), &quads, window.min(history.len()));
                Ok(())
            })
        }
        Command::Recommend {
            game,
            strategy,
            all_strategies,
            weights,
            count,
            seed,
        } => {
            let count = count.unwrap_or(config.recommend.set_count);
            cmd_recommend(&conn, &config, game, strategy, all_strategies, weights.as_deref(), count, seed)
        }
        Command::Number { game, number, pool } => with_history(&conn, game, |history| {
            let detail = number_detail(history, &game.schema(), pool, number)?;
            display_number_detail(game, &detail);
            Ok(())
        }),
        Command::Check {
            game,
            numbers,
            bonus,
            date,
            draw_time,
            last,
        } => cmd_check(&conn, game, &numbers, bonus, date, draw_time, last),
        Command::Summary { seed } => cmd_summary(&conn, &config, seed),
        Command::DbPath | Command::Odds | Command::QuickPick { .. } | Command::InitConfig { .. } => Ok(()),
    }
}

/// Loads the game's history and runs `f`, or explains how to import when the store is empty.
fn with_history(conn: &Connection, game: Game, f: impl FnOnce(&DrawHistory) -> Result<()>) -> Result<()> {
    let history = fetch_history(conn, game)?;
    if history.is_empty() {
        println!(
            "No {} draws stored. Run first: lottostats import --game {} --file <data.json>",
            game.name(),
            game.slug()
        );
        return Ok(());
    }
    f(&history)
}

fn cmd_init_config(output: &Path) -> Result<()> {
    if output.exists() {
        bail!("{} already exists", output.display());
    }
    save_config(&AnalysisConfig::default(), output)?;
    println!("Default settings written to {}", output.display());
    Ok(())
}

fn cmd_odds() -> Result<()> {
    let now = Utc::now();
    let next_draws = Game::ALL
        .iter()
        .map(|&game| -> Result<(Game, NaiveDateTime)> { Ok((game, game.next_draw_from(now)?)) })
        .collect::<Result<Vec<_>>>()?;
    display_odds(&next_draws);
    Ok(())
}

fn cmd_import(conn: &Connection, game: Game, file: &Path) -> Result<()> {
    let result = import::import_file(conn, game, file)?;
    display_import_summary(game, &result);
    Ok(())
}

fn cmd_list(conn: &Connection, game: Game, last: u32) -> Result<()> {
    let n = count_draws(conn, game)?;
    if n == 0 {
        println!("No {} draws stored. Run first: lottostats import --game {}", game.name(), game.slug());
        return Ok(());
    }
    let draws = fetch_last_draws(conn, game, Some(last))?;
    println!("{} · {} of {} draws", game.name(), draws.len(), n);
    display_draws(game, &draws);
    Ok(())
}

fn pool_max(game: Game, pool: Pool) -> Result<u8> {
    let max = game.schema().pool_max(pool);
    if max == 0 {
        bail!("{} has no {} numbers", game.name(), pool.label());
    }
    Ok(max)
}

fn cmd_stats(conn: &Connection, game: Game, pool: Pool, window: Option<usize>, chart: bool) -> Result<()> {
    let max = pool_max(game, pool)?;
    with_history(conn, game, |history| {
        let history = match window {
            Some(w) => history.truncated(w),
            None => history.clone(),
        };
        let frequencies = calculate_frequency(&history, max, pool)?;
        display_frequency(game, pool, &frequencies, history.len());
        if chart {
            display_frequency_chart(&frequencies);
        }
        Ok(())
    })
}

fn cmd_hot_cold(conn: &Connection, config: &AnalysisConfig, game: Game, pool: Pool) -> Result<()> {
    let max = pool_max(game, pool)?;
    with_history(conn, game, |history| {
        let entries = calculate_hot_cold_with(history, max, pool, &config.hot_cold)?;
        display_hot_cold(game, pool, &entries);
        Ok(())
    })
}

fn cmd_gaps(conn: &Connection, game: Game, pool: Pool, top: usize) -> Result<()> {
    let max = pool_max(game, pool)?;
    with_history(conn, game, |history| {
        let gaps = calculate_gaps(history, max, pool)?;
        display_gaps(game, pool, &gaps, expected_interval(&game.schema(), pool), top);
        Ok(())
    })
}

fn parse_weights(raw: &str) -> Result<StrategyWeights> {
    let parts: Vec<f64> = raw
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .with_context(|| format!("Invalid weights '{raw}'"))?;
    let [frequency, hot, overdue, pairs] = parts[..] else {
        bail!("Expected 4 weights (frequency,hot,overdue,pairs), got {}", parts.len());
    };
    Ok(StrategyWeights::new(frequency, hot, overdue, pairs)?)
}

#[allow(clippy::too_many_arguments)]
fn cmd_recommend(
    conn: &Connection,
    config: &AnalysisConfig,
    game: Game,
    strategy: Strategy,
    all_strategies: bool,
    weights: Option<&str>,
    count: usize,
    seed: Option<u64>,
) -> Result<()> {
    let schema = game.schema();
    let history = fetch_history(conn, game)?;
    if history.is_empty() {
        log::warn!("No {} draws stored; sets come from flat statistics", game.name());
    }
    let seed = seed.unwrap_or_else(date_seed);
    println!("Seed: {seed}");

    let recommender = Recommender::new(&history, &schema, config)?;

    if let Some(raw) = weights {
        let weights = parse_weights(raw)?;
        let sets = recommender.generate(&weights, "Custom", count, seed)?;
        display_recommendations(game, "Custom", raw, &sets);
        return Ok(());
    }

    let strategies: Vec<Strategy> = if all_strategies {
        Strategy::ALL.to_vec()
    } else {
        vec![strategy]
    };

    let results = strategies
        .par_iter()
        .map(|&s| -> Result<(Strategy, Vec<RecommendedSet>)> {
            Ok((s, recommender.generate(&s.weights(), s.name(), count, seed)?))
        })
        .collect::<Result<Vec<_>>>()?;

    for (s, sets) in &results {
        display_recommendations(game, s.name(), s.description(), sets);
    }
    println!("\nDraws are independent events; these sets describe history, they do not predict it.");
    Ok(())
}

fn cmd_check(
    conn: &Connection,
    game: Game,
    numbers: &[u8],
    bonus: Option<u8>,
    date: Option<NaiveDate>,
    draw_time: Option<DrawTime>,
    last: usize,
) -> Result<()> {
    let schema = game.schema();
    if numbers.len() != schema.main_count {
        bail!("{} tickets have {} numbers, got {}", game.name(), schema.main_count, numbers.len());
    }
    if let Some(&n) = numbers.iter().find(|&&n| n < 1 || n > schema.main_max) {
        bail!("Number {n} is outside 1-{}", schema.main_max);
    }
    if let Some(b) = bonus {
        if !schema.has_bonus() {
            bail!("{} has no bonus number", game.name());
        }
        if b < 1 || b > schema.bonus_max {
            bail!("Bonus {b} is outside 1-{}", schema.bonus_max);
        }
    }

    match date {
        Some(date) => {
            let draw = find_draw(conn, game, &date.to_string(), draw_time)?
                .with_context(|| format!("No {} draw stored for {date}", game.name()))?;
            let check = check_ticket(&draw, numbers, bonus);
            display_ticket_checks(game, numbers, bonus, &[(&draw, check)]);
        }
        None => with_history(conn, game, |history| {
            let checks = check_against_history(history, numbers, bonus, last);
            display_ticket_checks(game, numbers, bonus, &checks);
            Ok(())
        })?,
    }
    Ok(())
}

fn summarize(game: Game, history: &DrawHistory, config: &AnalysisConfig, seed: u64) -> Result<GameSummary> {
    let schema = game.schema();
    let mut hot_cold = calculate_hot_cold_with(history, schema.main_max, Pool::Main, &config.hot_cold)?;
    hot_cold.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    let pick = |class: Classification, from_top: bool| -> Vec<u8> {
        let matching = hot_cold.iter().filter(|e| e.classification == class);
        let mut numbers: Vec<u8> = if from_top {
            matching.take(SUMMARY_SIZE).map(|e| e.number).collect()
        } else {
            let all: Vec<u8> = matching.map(|e| e.number).collect();
            all.into_iter().rev().take(SUMMARY_SIZE).collect()
        };
        numbers.sort_unstable();
        numbers
    };

    let interval = expected_interval(&schema, Pool::Main);
    let mut gaps = calculate_gaps(history, schema.main_max, Pool::Main)?;
    gaps.sort_by(|a, b| {
        b.overdue_ratio(interval)
            .partial_cmp(&a.overdue_ratio(interval))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.number.cmp(&b.number))
    });

    let top_pick = if history.is_empty() {
        None
    } else {
        Recommender::new(history, &schema, config)?
            .generate(&Strategy::Balanced.weights(), Strategy::Balanced.name(), 1, seed)?
            .into_iter()
            .next()
    };

    Ok(GameSummary {
        game,
        draws: history.len(),
        latest: history.newest().cloned(),
        hot: pick(Classification::Hot, true),
        cold: pick(Classification::Cold, false),
        overdue: gaps.iter().take(SUMMARY_SIZE).map(|g| g.number).collect(),
        top_pick,
    })
}

fn cmd_summary(conn: &Connection, config: &AnalysisConfig, seed: Option<u64>) -> Result<()> {
    let seed = seed.unwrap_or_else(date_seed);
    let histories = Game::ALL
        .iter()
        .map(|&game| -> Result<(Game, DrawHistory)> { Ok((game, fetch_history(conn, game)?)) })
        .collect::<Result<Vec<_>>>()?;

    let summaries = histories
        .par_iter()
        .map(|(game, history)| summarize(*game, history, config, seed))
        .collect::<Result<Vec<_>>>()?;

    println!("Seed: {seed}");
    display_summary(&summaries);
    Ok(())
}
