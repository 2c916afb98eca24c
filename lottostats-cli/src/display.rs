use chrono::NaiveDateTime;
use comfy_table::{Table, ContentArrangement, presets::UTF8_FULL, Cell, Color};
use textplots::Plot;

use crate::GameSummary;
use crate::import::ImportResult;
use lottostats_db::models::{DrawResult, Game, Pool};
use lottostats_engine::combinations::CombinationEntry;
use lottostats_engine::detail::NumberDetail;
use lottostats_engine::frequency::{NumberFrequency, rank_by_count};
use lottostats_engine::gaps::GapEntry;
use lottostats_engine::hot_cold::{Classification, HotColdEntry};
use lottostats_engine::quick_pick::QuickPick;
use lottostats_engine::recommend::RecommendedSet;
use lottostats_engine::ticket::TicketCheck;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn format_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

fn format_bonus(bonus: Option<u8>) -> String {
    bonus.map(|b| format!("{:2}", b)).unwrap_or_else(|| "—".to_string())
}

fn class_color(class: Classification) -> Color {
    match class {
        Classification::Hot => Color::Red,
        Classification::Warm => Color::White,
        Classification::Cold => Color::Blue,
    }
}

fn pool_title(game: Game, pool: Pool) -> String {
    let schema = game.schema();
    let label = match pool {
        Pool::Main => "Main numbers",
        Pool::Bonus => game.bonus_label().unwrap_or("Bonus"),
    };
    format!("{label} (1-{})", schema.pool_max(pool))
}

pub fn display_draws(game: Game, draws: &[DrawResult]) {
    if draws.is_empty() {
        println!("No draws to display.");
        return;
    }

    let bonus_header = game.bonus_label().unwrap_or("Bonus");
    let mut table = new_table(vec!["Date", "Draw", "Numbers", bonus_header, "Multiplier"]);

    for draw in draws {
        let multiplier = draw
            .multiplier
            .map(|m| format!("{m}x"))
            .unwrap_or_else(|| "—".to_string());

        table.add_row(vec![
            draw.date.format("%Y-%m-%d %a").to_string(),
            draw.draw_time.map(|t| t.as_str()).unwrap_or("—").to_string(),
            format_numbers(&draw.sorted_numbers()),
            format_bonus(draw.bonus_number),
            multiplier,
        ]);
    }

    println!("{table}");
}

pub fn display_import_summary(game: Game, result: &ImportResult) {
    println!("{} import finished:", game.name());
    println!("  Records read       : {}", result.total_records);
    println!("  Inserted           : {}", result.inserted);
    println!("  Duplicates ignored : {}", result.duplicates);
    if result.invalid > 0 {
        println!("  Invalid (skipped)  : {}", result.invalid);
    }
    if result.off_schedule > 0 {
        println!("  Off-schedule dates : {}", result.off_schedule);
    }
}

pub fn display_frequency(game: Game, pool: Pool, frequencies: &[NumberFrequency], total_draws: usize) {
    println!("\n── {} · {} · {} draws ──", game.name(), pool_title(game, pool), total_draws);

    let mut table = new_table(vec!["Rank", "Number", "Count", "Frequency", "Draws since"]);
    for (i, f) in rank_by_count(frequencies).iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            format!("{:2}", f.number),
            f.count.to_string(),
            format!("{:.2}%", f.percentage),
            f.draws_since_last_drawn.to_string(),
        ]);
    }
    println!("{table}");
}

pub fn display_frequency_chart(frequencies: &[NumberFrequency]) {
    if frequencies.iter().all(|f| f.count == 0) {
        println!("  (No data to chart)");
        return;
    }
    let points: Vec<(f32, f32)> = frequencies
        .iter()
        .map(|f| (f.number as f32, f.count as f32))
        .collect();
    let x_max = frequencies.len() as f32 + 1.0;
    let shape = textplots::Shape::Bars(&points);
    let mut chart = textplots::Chart::new(160, 40, 0.0, x_max);
    println!("{}", chart.lineplot(&shape));
}

pub fn display_hot_cold(game: Game, pool: Pool, entries: &[HotColdEntry]) {
    println!("\n── {} · {} · momentum ──", game.name(), pool_title(game, pool));

    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.number.cmp(&b.number))
    });

    let mut table = new_table(vec!["Number", "Score", "Class"]);
    for e in &sorted {
        table.add_row(vec![
            Cell::new(format!("{:2}", e.number)),
            Cell::new(format!("{:.4}", e.score)),
            Cell::new(e.classification.to_string()).fg(class_color(e.classification)),
        ]);
    }
    println!("{table}");

    for class in [Classification::Hot, Classification::Cold] {
        let numbers: Vec<u8> = sorted
            .iter()
            .filter(|e| e.classification == class)
            .map(|e| e.number)
            .collect();
        println!("{class} ({}): {}", numbers.len(), format_numbers(&numbers));
    }
}

pub fn display_gaps(game: Game, pool: Pool, gaps: &[GapEntry], expected_interval: f64, top: usize) {
    println!(
        "\n── {} · {} · gaps (expected interval {:.1} draws) ──",
        game.name(),
        pool_title(game, pool),
        expected_interval
    );

    let mut sorted = gaps.to_vec();
    sorted.sort_by(|a, b| {
        b.overdue_ratio(expected_interval)
            .partial_cmp(&a.overdue_ratio(expected_interval))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.number.cmp(&b.number))
    });

    let mut table = new_table(vec!["Number", "Current", "Avg", "Min", "Max", "Seen", "Overdue"]);
    for g in sorted.iter().take(top) {
        let ratio = g.overdue_ratio(expected_interval);
        let color = if ratio >= 2.0 {
            Color::Red
        } else if ratio >= 1.0 {
            Color::Yellow
        } else {
            Color::White
        };
        table.add_row(vec![
            Cell::new(format!("{:2}", g.number)),
            Cell::new(g.current_gap),
            Cell::new(format!("{:.1}", g.avg_gap)),
            Cell::new(g.min_gap),
            Cell::new(g.max_gap),
            Cell::new(g.appearances),
            Cell::new(format!("{:.2}x", ratio)).fg(color),
        ]);
    }
    println!("{table}");
}

pub fn display_combinations<const K: usize>(title: &str, entries: &[CombinationEntry<K>], examined: usize) {
    println!("\n── {title} · {examined} draws examined ──");
    if entries.is_empty() {
        println!("No combinations found.");
        return;
    }

    let mut table = new_table(vec!["#", "Numbers", "Count", "Frequency"]);
    for (i, e) in entries.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            format_numbers(&e.numbers),
            e.count.to_string(),
            format!("{:.2}%", e.percentage),
        ]);
    }
    println!("{table}");
}

pub fn display_recommendations(game: Game, strategy: &str, description: &str, sets: &[RecommendedSet]) {
    println!("\n🎲 {} · {strategy}", game.name());
    if !description.is_empty() {
        println!("   {description}");
    }

    let bonus_header = game.bonus_label().unwrap_or("Bonus");
    let mut table = new_table(vec!["#", "Numbers", bonus_header, "Score"]);
    for (i, set) in sets.iter().enumerate() {
        let color = if i == 0 { Color::Green } else { Color::White };
        table.add_row(vec![
            Cell::new(format!("{}", i + 1)).fg(color),
            Cell::new(format_numbers(&set.numbers)).fg(color),
            Cell::new(format_bonus(set.bonus)).fg(Color::Yellow),
            Cell::new(format!("{:.4}", set.score)),
        ]);
    }
    println!("{table}");
}

pub fn display_number_detail(game: Game, detail: &NumberDetail) {
    println!("\n── {} · {} · number {} ──", game.name(), pool_title(game, detail.pool), detail.number);

    let mut table = new_table(vec!["Metric", "Value"]);
    table.add_row(vec![
        "Times drawn".to_string(),
        format!("{} ({:.2}%)", detail.frequency.count, detail.frequency.percentage),
    ]);
    table.add_row(vec!["Rank".to_string(), format!("{} of {}", detail.rank, detail.pool_size)]);
    table.add_row(vec![
        Cell::new("Momentum"),
        Cell::new(format!("{} ({:.4})", detail.hot_cold.classification, detail.hot_cold.score))
            .fg(class_color(detail.hot_cold.classification)),
    ]);
    table.add_row(vec!["Draws since last drawn".to_string(), detail.gap.current_gap.to_string()]);
    table.add_row(vec![
        "Gap avg / min / max".to_string(),
        format!("{:.1} / {} / {}", detail.gap.avg_gap, detail.gap.min_gap, detail.gap.max_gap),
    ]);
    table.add_row(vec!["Overdue ratio".to_string(), format!("{:.2}x", detail.overdue_ratio)]);
    println!("{table}");

    if !detail.pairings.is_empty() {
        println!("\nMost frequent partners:");
        let mut table = new_table(vec!["Partner", "Together", "Frequency"]);
        for p in &detail.pairings {
            table.add_row(vec![
                format!("{:2}", p.partner),
                p.count.to_string(),
                format!("{:.2}%", p.percentage),
            ]);
        }
        println!("{table}");
    }

    if !detail.recent_appearances.is_empty() {
        println!("\nRecent appearances:");
        display_draws(game, &detail.recent_appearances);
    }
}

pub fn display_ticket_checks(game: Game, numbers: &[u8], bonus: Option<u8>, checks: &[(&DrawResult, TicketCheck)]) {
    let schema = game.schema();
    println!("\nTicket: {}  {}", format_numbers(numbers), format_bonus(bonus));
    if checks.is_empty() {
        println!("No draws to check against.");
        return;
    }

    let bonus_header = game.bonus_label().unwrap_or("Bonus");
    let mut table = new_table(vec!["Draw", "Numbers", "Matched", bonus_header]);
    for (draw, check) in checks {
        let color = if check.is_jackpot(schema.main_count) {
            Color::Green
        } else if check.main_matches >= 3 {
            Color::Yellow
        } else {
            Color::White
        };
        let bonus_cell = match check.bonus_match {
            Some(true) => "✓",
            Some(false) => "✗",
            None => "—",
        };
        table.add_row(vec![
            Cell::new(draw.key_label()),
            Cell::new(format!("{}  {}", format_numbers(&draw.sorted_numbers()), format_bonus(draw.bonus_number))),
            Cell::new(format!("{} ({})", check.main_matches, format_numbers(&check.matched))).fg(color),
            Cell::new(bonus_cell),
        ]);
    }
    println!("{table}");
}

pub fn display_quick_picks(game: Game, picks: &[QuickPick]) {
    println!("\n🎲 {} · quick pick", game.name());
    let bonus_header = game.bonus_label().unwrap_or("Bonus");
    let mut table = new_table(vec!["#", "Numbers", bonus_header]);
    for (i, pick) in picks.iter().enumerate() {
        table.add_row(vec![
            Cell::new(format!("{}", i + 1)),
            Cell::new(format_numbers(&pick.numbers)),
            Cell::new(format_bonus(pick.bonus)).fg(Color::Yellow),
        ]);
    }
    println!("{table}");
}

/// `next_draws` holds each game's next drawing in Eastern time.
pub fn display_odds(next_draws: &[(Game, NaiveDateTime)]) {
    let mut table = new_table(vec!["Game", "Format", "Draw days", "Draw time", "Next draw", "Jackpot odds"]);
    for &(game, next) in next_draws {
        let schema = game.schema();
        let format = match game.bonus_label() {
            Some(label) => format!("{}/{} + {label} 1/{}", schema.main_count, schema.main_max, schema.bonus_max),
            None => format!("{}/{}", schema.main_count, schema.main_max),
        };
        let days = if game.draw_days().len() == 7 {
            "Daily".to_string()
        } else {
            game.draw_days().iter().map(|d| d.to_string()).collect::<Vec<_>>().join(", ")
        };
        let days = if game.draws_per_day() > 1 {
            format!("{days} (x{})", game.draws_per_day())
        } else {
            days
        };
        table.add_row(vec![
            game.name().to_string(),
            format,
            days,
            game.draw_time().to_string(),
            next.format("%a %Y-%m-%d %H:%M ET").to_string(),
            format!("1 in {}", group_thousands(game.jackpot_odds())),
        ]);
    }
    println!("{table}");
}

fn group_thousands(n: u128) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn display_summary(summaries: &[GameSummary]) {
    let mut table = new_table(vec!["Game", "Draws", "Latest", "Hot", "Cold", "Most overdue", "Top pick"]);
    for s in summaries {
        let latest = s
            .latest
            .as_ref()
            .map(|d| format!("{}  {}", d.key_label(), format_numbers(&d.sorted_numbers())))
            .unwrap_or_else(|| "—".to_string());
        let top_pick = s
            .top_pick
            .as_ref()
            .map(|set| format!("{}  {}", format_numbers(&set.numbers), format_bonus(set.bonus)))
            .unwrap_or_else(|| "—".to_string());
        table.add_row(vec![
            Cell::new(s.game.name()),
            Cell::new(s.draws),
            Cell::new(latest),
            Cell::new(format_numbers(&s.hot)).fg(Color::Red),
            Cell::new(format_numbers(&s.cold)).fg(Color::Blue),
            Cell::new(format_numbers(&s.overdue)),
            Cell::new(top_pick).fg(Color::Green),
        ]);
    }
    println!("{table}");
}
