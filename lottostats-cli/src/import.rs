use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use lottostats_db::rusqlite::Connection;
use serde::Deserialize;
use std::path::Path;

use lottostats_db::db::insert_draw;
use lottostats_db::models::{DrawResult, DrawTime, Game, validate_draw};

/// One row of the state open-data (SODA) lottery datasets. Every field arrives as text.
#[derive(Debug, Default, Deserialize)]
pub struct SodaRecord {
    pub draw_date: Option<String>,
    pub winning_numbers: Option<String>,
    pub mega_ball: Option<String>,
    pub cash_ball: Option<String>,
    pub bonus: Option<String>,
    pub multiplier: Option<String>,
    pub midday_winning_numbers: Option<String>,
    pub evening_winning_numbers: Option<String>,
}

/// Saved data file: `{ lottery, lastUpdated, draws }`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedData {
    pub lottery: String,
    #[serde(default)]
    pub last_updated: Option<String>,
    pub draws: Vec<DrawResult>,
}

#[derive(Debug, Default)]
pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub duplicates: u32,
    pub invalid: u32,
    pub off_schedule: u32,
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    let day = raw.trim().split('T').next().unwrap_or_default();
    NaiveDate::parse_from_str(day, "%Y-%m-%d").with_context(|| format!("Invalid draw date '{raw}'"))
}

fn parse_numbers(raw: &str) -> Result<Vec<u8>> {
    raw.split_whitespace()
        .map(|s| s.parse::<u8>().with_context(|| format!("Invalid number '{s}' in '{raw}'")))
        .collect()
}

fn parse_optional_u8(raw: Option<&String>) -> Result<Option<u8>> {
    match raw.map(|s| s.trim()).filter(|s| !s.is_empty()) {
        Some(s) => Ok(Some(s.parse::<u8>().with_context(|| format!("Invalid number '{s}'"))?)),
        None => Ok(None),
    }
}

fn split_main(mut all: Vec<u8>, main_count: usize, raw: &str) -> Result<Vec<u8>> {
    if all.len() < main_count {
        bail!("Expected {main_count} numbers in '{raw}', got {}", all.len());
    }
    all.truncate(main_count);
    Ok(all)
}

/// Turns one open-data record into draws. Take 5 rows carry both daily drawings.
pub fn parse_soda_record(game: Game, record: &SodaRecord) -> Result<Vec<DrawResult>> {
    let date = parse_date(record.draw_date.as_deref().context("Missing draw_date")?)?;
    let main_count = game.schema().main_count;

    if game == Game::Take5 {
        let slots = [
            (DrawTime::Midday, &record.midday_winning_numbers),
            (DrawTime::Evening, &record.evening_winning_numbers),
        ];
        let mut draws = Vec::with_capacity(2);
        for (time, field) in slots {
            if let Some(raw) = field.as_deref().filter(|s| !s.trim().is_empty()) {
                let numbers = split_main(parse_numbers(raw)?, main_count, raw)?;
                let mut draw = DrawResult::new(date, numbers, None);
                draw.draw_time = Some(time);
                draws.push(draw);
            }
        }
        if draws.is_empty() {
            bail!("No midday or evening numbers on {date}");
        }
        return Ok(draws);
    }

    let raw = record.winning_numbers.as_deref().context("Missing winning_numbers")?;
    let all = parse_numbers(raw)?;
    let bonus_field = match game {
        Game::MegaMillions => record.mega_ball.as_ref(),
        Game::Cash4Life => record.cash_ball.as_ref(),
        Game::NyLotto => record.bonus.as_ref(),
        Game::Powerball | Game::Take5 => None,
    };

    let (numbers, bonus) = match game {
        // Powerball appends its red ball to winning_numbers
        Game::Powerball => {
            if all.len() < main_count + 1 {
                bail!("Expected {} numbers in '{raw}', got {}", main_count + 1, all.len());
            }
            let bonus = all[main_count];
            (split_main(all, main_count, raw)?, Some(bonus))
        }
        _ => {
            let bonus = parse_optional_u8(bonus_field)?.context("Missing bonus field")?;
            (split_main(all, main_count, raw)?, Some(bonus))
        }
    };

    let mut draw = DrawResult::new(date, numbers, bonus);
    draw.multiplier = parse_optional_u8(record.multiplier.as_ref())?;
    Ok(vec![draw])
}

/// Saved files mark a missing bonus as 0.
fn normalize_saved(mut draw: DrawResult) -> DrawResult {
    if draw.bonus_number == Some(0) {
        draw.bonus_number = None;
    }
    draw
}

/// Reads either a SODA record array or a saved data file into draws for `game`.
///
/// Records that fail to parse are skipped; the second value counts them.
pub fn read_draws(game: Game, contents: &str) -> Result<(Vec<DrawResult>, u32)> {
    let value: serde_json::Value = serde_json::from_str(contents).context("Input is not valid JSON")?;

    if value.is_object() {
        let saved: SavedData = serde_json::from_value(value).context("Invalid saved data file")?;
        let file_game: Game = saved.lottery.parse()?;
        if file_game != game {
            bail!("File holds {} draws, not {}", file_game.name(), game.name());
        }
        log::info!(
            "{}: {} saved draws (last updated {})",
            game.name(),
            saved.draws.len(),
            saved.last_updated.as_deref().unwrap_or("unknown")
        );
        return Ok((saved.draws.into_iter().map(normalize_saved).collect(), 0));
    }

    let records: Vec<SodaRecord> = serde_json::from_value(value).context("Expected an array of open-data records")?;
    let mut draws = Vec::with_capacity(records.len() * game.draws_per_day());
    let mut errors = 0;
    for (i, record) in records.iter().enumerate() {
        match parse_soda_record(game, record) {
            Ok(parsed) => draws.extend(parsed),
            Err(e) => {
                log::warn!("{}: record {} skipped: {e:#}", game.name(), i + 1);
                errors += 1;
            }
        }
    }
    Ok((draws, errors))
}

pub fn import_file(conn: &Connection, game: Game, path: &Path) -> Result<ImportResult> {
    let contents = std::fs::read_to_string(path).with_context(|| format!("Cannot read {:?}", path))?;
    import_str(conn, game, &contents)
}

pub fn import_str(conn: &Connection, game: Game, contents: &str) -> Result<ImportResult> {
    let (draws, parse_errors) = read_draws(game, contents)?;
    let schema = game.schema();

    let tx = conn.unchecked_transaction().context("Cannot start transaction")?;

    let mut result = ImportResult {
        total_records: draws.len() as u32 + parse_errors,
        invalid: parse_errors,
        ..Default::default()
    };

    for draw in &draws {
        if let Err(e) = validate_draw(&schema, draw) {
            log::warn!("{}: {} skipped: {e}", game.name(), draw.key_label());
            result.invalid += 1;
            continue;
        }
        if !game.is_draw_day(draw.date) {
            log::warn!("{}: draw on unexpected day {} ({})", game.name(), draw.date, draw.date.format("%A"));
            result.off_schedule += 1;
        }
        if insert_draw(&tx, game, draw)? {
            result.inserted += 1;
        } else {
            result.duplicates += 1;
        }
    }

    tx.commit().context("Commit failed")?;
    log::info!(
        "{}: {} inserted, {} duplicates, {} invalid",
        game.name(),
        result.inserted,
        result.duplicates,
        result.invalid
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lottostats_db::db::{count_draws, fetch_history, migrate};

    fn record(date: &str, numbers: &str) -> SodaRecord {
        SodaRecord {
            draw_date: Some(date.to_string()),
            winning_numbers: Some(numbers.to_string()),
            ..Default::default()
        }
    }

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-03-02T00:00:00.000").unwrap(), NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert_eq!(parse_date("2024-03-02").unwrap(), NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert!(parse_date("03/02/2024").is_err());
    }

    #[test]
    fn test_powerball_bonus_is_last_token() {
        let mut rec = record("2024-03-02T00:00:00.000", "05 11 22 23 69 07");
        rec.multiplier = Some("2".into());
        let draws = parse_soda_record(Game::Powerball, &rec).unwrap();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].numbers, vec![5, 11, 22, 23, 69]);
        assert_eq!(draws[0].bonus_number, Some(7));
        assert_eq!(draws[0].multiplier, Some(2));
    }

    #[test]
    fn test_separate_bonus_fields() {
        let mut mega = record("2024-03-01T00:00:00.000", "01 02 03 04 05");
        mega.mega_ball = Some("12".into());
        assert_eq!(parse_soda_record(Game::MegaMillions, &mega).unwrap()[0].bonus_number, Some(12));

        let mut cash = record("2024-03-01T00:00:00.000", "01 02 03 04 05");
        cash.cash_ball = Some("3".into());
        assert_eq!(parse_soda_record(Game::Cash4Life, &cash).unwrap()[0].bonus_number, Some(3));

        let mut lotto = record("2024-03-02T00:00:00.000", "01 02 03 04 05 06");
        lotto.bonus = Some("44".into());
        let draws = parse_soda_record(Game::NyLotto, &lotto).unwrap();
        assert_eq!(draws[0].numbers.len(), 6);
        assert_eq!(draws[0].bonus_number, Some(44));

        assert!(parse_soda_record(Game::MegaMillions, &record("2024-03-01", "01 02 03 04 05")).is_err());
    }

    #[test]
    fn test_take5_midday_and_evening() {
        let rec = SodaRecord {
            draw_date: Some("2024-03-02T00:00:00.000".into()),
            midday_winning_numbers: Some("01 07 15 22 39".into()),
            evening_winning_numbers: Some("02 08 16 23 38".into()),
            ..Default::default()
        };
        let draws = parse_soda_record(Game::Take5, &rec).unwrap();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].draw_time, Some(DrawTime::Midday));
        assert_eq!(draws[1].draw_time, Some(DrawTime::Evening));
        assert_eq!(draws[1].numbers, vec![2, 8, 16, 23, 38]);
        assert!(draws.iter().all(|d| d.bonus_number.is_none()));
    }

    #[test]
    fn test_short_records_rejected() {
        assert!(parse_soda_record(Game::Powerball, &record("2024-03-02", "01 02 03 04 05")).is_err());
        assert!(parse_soda_record(Game::Powerball, &record("2024-03-02", "01 02 xx 04 05 06")).is_err());
        assert!(parse_soda_record(Game::Powerball, &SodaRecord::default()).is_err());
    }

    #[test]
    fn test_import_soda_records() {
        let conn = memory_db();
        let json = r#"[
            {"draw_date": "2024-03-02T00:00:00.000", "winning_numbers": "05 11 22 23 69 07", "multiplier": "2"},
            {"draw_date": "2024-02-28T00:00:00.000", "winning_numbers": "01 02 03 04 05 27"},
            {"draw_date": "2024-02-26T00:00:00.000", "winning_numbers": "01 02 03 04"},
            {"draw_date": "2024-03-02T00:00:00.000", "winning_numbers": "05 11 22 23 69 07"}
        ]"#;
        let result = import_str(&conn, Game::Powerball, json).unwrap();
        assert_eq!(result.total_records, 4);
        assert_eq!(result.inserted, 1);
        assert_eq!(result.duplicates, 1);
        // bonus 27 out of range and a short record
        assert_eq!(result.invalid, 2);
        assert_eq!(count_draws(&conn, Game::Powerball).unwrap(), 1);
    }

    #[test]
    fn test_import_saved_file() {
        let conn = memory_db();
        let json = r#"{
            "lottery": "take5",
            "lastUpdated": "2024-03-03T10:00:00Z",
            "draws": [
                {"date": "2024-03-02", "numbers": [1, 7, 15, 22, 39], "bonusNumber": 0, "drawTime": "evening"},
                {"date": "2024-03-02", "numbers": [2, 8, 16, 23, 38], "bonusNumber": null, "drawTime": "midday"},
                {"date": "2024-03-01", "numbers": [3, 9, 17, 24, 37]}
            ]
        }"#;
        let result = import_str(&conn, Game::Take5, json).unwrap();
        assert_eq!(result.inserted, 3);
        assert_eq!(result.invalid, 0);

        let history = fetch_history(&conn, Game::Take5).unwrap();
        assert_eq!(history.draws()[0].draw_time, Some(DrawTime::Evening));
        assert_eq!(history.draws()[1].draw_time, Some(DrawTime::Midday));
        assert_eq!(history.draws()[2].draw_time, None);
    }

    #[test]
    fn test_saved_file_for_other_game_rejected() {
        let conn = memory_db();
        let json = r#"{"lottery": "powerball", "lastUpdated": "x", "draws": []}"#;
        assert!(import_str(&conn, Game::Take5, json).is_err());
    }

    #[test]
    fn test_off_schedule_draws_are_kept() {
        let conn = memory_db();
        // 2024-03-01 is a Friday, Powerball draws Mon/Wed/Sat
        let json = r#"[{"draw_date": "2024-03-01T00:00:00.000", "winning_numbers": "01 02 03 04 05 06"}]"#;
        let result = import_str(&conn, Game::Powerball, json).unwrap();
        assert_eq!(result.off_schedule, 1);
        assert_eq!(result.inserted, 1);
    }

    #[test]
    fn test_import_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cash4life.json");
        std::fs::write(
            &path,
            r#"[{"draw_date": "2024-03-01T00:00:00.000", "winning_numbers": "10 20 30 40 50", "cash_ball": "04"}]"#,
        )
        .unwrap();
        let conn = memory_db();
        let result = import_file(&conn, Game::Cash4Life, &path).unwrap();
        assert_eq!(result.inserted, 1);
        assert!(import_file(&conn, Game::Cash4Life, &dir.path().join("missing.json")).is_err());
    }
}
