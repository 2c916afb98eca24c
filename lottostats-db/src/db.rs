use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

use crate::models::{DrawHistory, DrawResult, DrawTime, Game};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    game          TEXT NOT NULL,
    date          TEXT NOT NULL,
    draw_time     TEXT NOT NULL DEFAULT '',
    numbers       TEXT NOT NULL,
    bonus         INTEGER,
    multiplier    INTEGER,
    PRIMARY KEY (game, date, draw_time)
);
";

const ORDER_NEWEST_FIRST: &str =
    "ORDER BY date DESC, CASE draw_time WHEN 'evening' THEN 2 WHEN 'midday' THEN 1 ELSE 0 END DESC";

pub const DB_PATH_ENV: &str = "LOTTOSTATS_DB";

pub fn db_path() -> PathBuf {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        return PathBuf::from(path);
    }
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("lottostats.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create directory {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Cannot open database {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Migration failed")?;
    Ok(())
}

/// Inserts a draw; returns false when the (game, date, draw time) key already exists.
pub fn insert_draw(conn: &Connection, game: Game, draw: &DrawResult) -> Result<bool> {
    let numbers = serde_json::to_string(&draw.numbers)?;
    let draw_time = draw.draw_time.map(|t| t.as_str()).unwrap_or("");
    let changed = conn.execute(
        "INSERT OR IGNORE INTO draws (game, date, draw_time, numbers, bonus, multiplier)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            game.slug(),
            draw.date.to_string(),
            draw_time,
            numbers,
            draw.bonus_number,
            draw.multiplier,
        ],
    ).context("Insert failed")?;
    Ok(changed > 0)
}

type DrawRow = (String, String, String, Option<u8>, Option<u8>);

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DrawRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn row_to_draw(row: DrawRow) -> Result<DrawResult> {
    let (date, draw_time, numbers, bonus_number, multiplier) = row;
    let date: NaiveDate = date
        .parse()
        .with_context(|| format!("Invalid stored date '{date}'"))?;
    let numbers: Vec<u8> = serde_json::from_str(&numbers)
        .with_context(|| format!("Invalid stored numbers '{numbers}'"))?;
    let draw_time = if draw_time.is_empty() {
        None
    } else {
        Some(draw_time.parse::<DrawTime>().map_err(anyhow::Error::msg)?)
    };
    Ok(DrawResult {
        date,
        numbers,
        bonus_number,
        multiplier,
        draw_time,
    })
}

/// Newest draws first; `limit = None` fetches the whole history.
pub fn fetch_last_draws(conn: &Connection, game: Game, limit: Option<u32>) -> Result<Vec<DrawResult>> {
    let sql = format!(
        "SELECT date, draw_time, numbers, bonus, multiplier FROM draws WHERE game = ?1 {ORDER_NEWEST_FIRST} LIMIT ?2"
    );
    let limit = limit.map(i64::from).unwrap_or(-1);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params![game.slug(), limit], read_row)?
        .collect::<Result<Vec<DrawRow>, _>>()?;
    rows.into_iter().map(row_to_draw).collect()
}

pub fn fetch_history(conn: &Connection, game: Game) -> Result<DrawHistory> {
    let draws = fetch_last_draws(conn, game, None)?;
    let history = DrawHistory::new(draws)
        .with_context(|| format!("Stored {} history is inconsistent", game.name()))?;
    Ok(history)
}

pub fn find_draw(conn: &Connection, game: Game, date: &str, draw_time: Option<DrawTime>) -> Result<Option<DrawResult>> {
    let draw_time = draw_time.map(|t| t.as_str()).unwrap_or("");
    let mut stmt = conn.prepare(
        "SELECT date, draw_time, numbers, bonus, multiplier FROM draws
         WHERE game = ?1 AND date = ?2 AND draw_time = ?3"
    )?;
    let mut rows = stmt.query_map(rusqlite::params![game.slug(), date, draw_time], read_row)?;
    match rows.next() {
        Some(row) => Ok(Some(row_to_draw(row?)?)),
        None => Ok(None),
    }
}

pub fn count_draws(conn: &Connection, game: Game) -> Result<u32> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM draws WHERE game = ?1",
        [game.slug()],
        |row| row.get(0),
    )?;
    Ok(count)
}
