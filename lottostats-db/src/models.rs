use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};
use chrono_tz::US::Eastern;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StatsError};

/// Largest draw size the combination engine enumerates.
pub const MAX_DRAW_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Game {
    Powerball,
    MegaMillions,
    #[value(name = "cash4life")]
    Cash4Life,
    NyLotto,
    #[value(name = "take5")]
    Take5,
}

impl Game {
    pub const ALL: [Game; 5] = [
        Game::Powerball,
        Game::MegaMillions,
        Game::Cash4Life,
        Game::NyLotto,
        Game::Take5,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Game::Powerball => "powerball",
            Game::MegaMillions => "mega-millions",
            Game::Cash4Life => "cash4life",
            Game::NyLotto => "ny-lotto",
            Game::Take5 => "take5",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Game::Powerball => "Powerball",
            Game::MegaMillions => "Mega Millions",
            Game::Cash4Life => "Cash4Life",
            Game::NyLotto => "NY Lotto",
            Game::Take5 => "Take 5",
        }
    }

    pub fn schema(&self) -> GameSchema {
        let (main_count, main_max, bonus_max) = match self {
            Game::Powerball => (5, 69, 26),
            Game::MegaMillions => (5, 70, 24),
            Game::Cash4Life => (5, 60, 4),
            Game::NyLotto => (6, 59, 59),
            Game::Take5 => (5, 39, 0),
        };
        GameSchema {
            main_count,
            main_max,
            bonus_max,
        }
    }

    pub fn bonus_label(&self) -> Option<&'static str> {
        match self {
            Game::Powerball => Some("Powerball"),
            Game::MegaMillions => Some("Mega Ball"),
            Game::Cash4Life => Some("Cash Ball"),
            Game::NyLotto => Some("Bonus"),
            Game::Take5 => None,
        }
    }

    pub fn draw_days(&self) -> &'static [Weekday] {
        const DAILY: &[Weekday] = &[
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ];
        match self {
            Game::Powerball => &[Weekday::Mon, Weekday::Wed, Weekday::Sat],
            Game::MegaMillions => &[Weekday::Tue, Weekday::Fri],
            Game::Cash4Life => DAILY,
            Game::NyLotto => &[Weekday::Wed, Weekday::Sat],
            Game::Take5 => DAILY,
        }
    }

    pub fn draws_per_day(&self) -> usize {
        match self {
            Game::Take5 => 2,
            _ => 1,
        }
    }

    pub fn is_draw_day(&self, date: NaiveDate) -> bool {
        self.draw_days().contains(&date.weekday())
    }

    /// Published drawing time, Eastern.
    pub fn draw_time(&self) -> &'static str {
        match self {
            Game::Powerball => "10:59 PM ET",
            Game::MegaMillions => "11:00 PM ET",
            Game::Cash4Life => "9:00 PM ET",
            Game::NyLotto => "8:15 PM ET",
            Game::Take5 => "2:30 PM & 10:30 PM ET",
        }
    }

    /// First drawing strictly after `now`, both in Eastern wall-clock time.
    pub fn next_draw(&self, now: NaiveDateTime) -> Result<NaiveDateTime> {
        let times = parse_draw_time(self.draw_time())?;
        (0..=7u64)
            .map(|offset| now.date() + Days::new(offset))
            .filter(|date| self.is_draw_day(*date))
            .flat_map(|date| times.iter().map(move |time| date.and_time(*time)))
            .find(|at| *at > now)
            .ok_or_else(|| StatsError::InvalidDrawTime(format!("no {} drawing within a week", self.name())))
    }

    /// Next drawing after the instant `now`, converted to New York time.
    pub fn next_draw_from(&self, now: DateTime<Utc>) -> Result<NaiveDateTime> {
        self.next_draw(now.with_timezone(&Eastern).naive_local())
    }

    /// Odds of winning the top prize, as "1 in N".
    ///
    /// NY Lotto's bonus ball only matters for the second prize tier.
    pub fn jackpot_odds(&self) -> u128 {
        let schema = self.schema();
        match self {
            Game::NyLotto => schema.main_combinations(),
            _ => schema.total_combinations(),
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl FromStr for Game {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self> {
        Game::ALL
            .into_iter()
            .find(|g| g.slug() == s.trim())
            .ok_or_else(|| StatsError::UnknownGame(s.to_string()))
    }
}

/// Parses "10:59 PM ET" or "2:30 PM & 10:30 PM ET" into times of day, earliest first.
pub fn parse_draw_time(raw: &str) -> Result<Vec<NaiveTime>> {
    let cleaned = raw.trim();
    let cleaned = cleaned.strip_suffix("ET").unwrap_or(cleaned);
    let mut times = cleaned
        .split('&')
        .map(|part| {
            let part = part.trim();
            NaiveTime::parse_from_str(part, "%I:%M %p")
                .map_err(|e| StatsError::InvalidDrawTime(format!("'{part}' in '{raw}': {e}")))
        })
        .collect::<Result<Vec<_>>>()?;
    times.sort_unstable();
    Ok(times)
}

/// Static per-game configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSchema {
    pub main_count: usize,
    pub main_max: u8,
    /// 0 when the game has no bonus number
    pub bonus_max: u8,
}

impl GameSchema {
    pub fn new(main_count: usize, main_max: u8, bonus_max: u8) -> Result<Self> {
        if main_max == 0 {
            return Err(StatsError::InvalidSchema("main_max must be positive".into()));
        }
        if main_count == 0 {
            return Err(StatsError::InvalidSchema("main_count must be positive".into()));
        }
        if main_count > main_max as usize {
            return Err(StatsError::InvalidSchema(format!(
                "cannot draw {main_count} distinct numbers from 1-{main_max}"
            )));
        }
        if main_count > MAX_DRAW_SIZE {
            return Err(StatsError::InvalidSchema(format!(
                "main_count {main_count} exceeds {MAX_DRAW_SIZE}"
            )));
        }
        Ok(Self {
            main_count,
            main_max,
            bonus_max,
        })
    }

    pub fn has_bonus(&self) -> bool {
        self.bonus_max > 0
    }

    pub fn pool_max(&self, pool: Pool) -> u8 {
        match pool {
            Pool::Main => self.main_max,
            Pool::Bonus => self.bonus_max,
        }
    }

    pub fn pick_count(&self, pool: Pool) -> usize {
        match pool {
            Pool::Main => self.main_count,
            Pool::Bonus => usize::from(self.has_bonus()),
        }
    }

    /// C(main_max, main_count)
    pub fn main_combinations(&self) -> u128 {
        binomial(self.main_max as u128, self.main_count as u128)
    }

    /// Main combinations times the bonus pool size.
    pub fn total_combinations(&self) -> u128 {
        self.main_combinations() * (self.bonus_max.max(1) as u128)
    }
}

// u128 holds C(255, 10) * 255 with room for the intermediate products
fn binomial(n: u128, k: u128) -> u128 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    (0..k).fold(1u128, |acc, i| acc * (n - i) / (i + 1))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Pool {
    Main,
    Bonus,
}

impl Pool {
    pub fn numbers_from<'a>(&self, draw: &'a DrawResult) -> &'a [u8] {
        match self {
            Pool::Main => &draw.numbers,
            Pool::Bonus => draw.bonus_number.as_slice(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Pool::Main => "main",
            Pool::Bonus => "bonus",
        }
    }
}

/// Drawing slot for games with several drawings a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawTime {
    Midday,
    Evening,
}

impl DrawTime {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrawTime::Midday => "midday",
            DrawTime::Evening => "evening",
        }
    }
}

impl FromStr for DrawTime {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "midday" => Ok(DrawTime::Midday),
            "evening" => Ok(DrawTime::Evening),
            other => Err(format!("unknown draw time '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawResult {
    pub date: NaiveDate,
    pub numbers: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus_number: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draw_time: Option<DrawTime>,
}

impl DrawResult {
    pub fn new(date: NaiveDate, numbers: Vec<u8>, bonus_number: Option<u8>) -> Self {
        Self {
            date,
            numbers,
            bonus_number,
            multiplier: None,
            draw_time: None,
        }
    }

    /// Uniqueness and ordering key. A missing draw time sorts first.
    pub fn key(&self) -> (NaiveDate, Option<DrawTime>) {
        (self.date, self.draw_time)
    }

    pub fn key_label(&self) -> String {
        match self.draw_time {
            Some(t) => format!("{} ({})", self.date, t.as_str()),
            None => self.date.to_string(),
        }
    }

    pub fn sorted_numbers(&self) -> Vec<u8> {
        let mut nums = self.numbers.clone();
        nums.sort_unstable();
        nums
    }
}

/// Checks a draw against a game schema: count, range, duplicates, bonus.
pub fn validate_draw(schema: &GameSchema, draw: &DrawResult) -> Result<()> {
    if draw.numbers.len() != schema.main_count {
        return Err(StatsError::InvalidDraw {
            date: draw.date,
            reason: format!(
                "expected {} main numbers, got {}",
                schema.main_count,
                draw.numbers.len()
            ),
        });
    }
    for &n in &draw.numbers {
        if n < 1 || n > schema.main_max {
            return Err(StatsError::OutOfRange {
                number: n,
                max: schema.main_max,
                date: draw.date,
            });
        }
    }
    let mut seen = HashSet::with_capacity(draw.numbers.len());
    for &n in &draw.numbers {
        if !seen.insert(n) {
            return Err(StatsError::InvalidDraw {
                date: draw.date,
                reason: format!("duplicate number {n}"),
            });
        }
    }
    match (schema.has_bonus(), draw.bonus_number) {
        (true, Some(b)) if b < 1 || b > schema.bonus_max => Err(StatsError::OutOfRange {
            number: b,
            max: schema.bonus_max,
            date: draw.date,
        }),
        (true, None) => Err(StatsError::InvalidDraw {
            date: draw.date,
            reason: "missing bonus number".into(),
        }),
        (false, Some(b)) => Err(StatsError::InvalidDraw {
            date: draw.date,
            reason: format!("unexpected bonus number {b}"),
        }),
        _ => Ok(()),
    }
}

/// Draw list ordered most-recent-first.
///
/// Construction sorts by `(date, draw_time)` descending, so `draws()[0]` is
/// always the newest drawing and every "recent window" is a prefix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawHistory {
    draws: Vec<DrawResult>,
}

impl DrawHistory {
    pub fn new(mut draws: Vec<DrawResult>) -> Result<Self> {
        draws.sort_by(|a, b| b.key().cmp(&a.key()));
        if let Some(pair) = draws.windows(2).find(|w| w[0].key() == w[1].key()) {
            return Err(StatsError::DuplicateDraw(pair[0].key_label()));
        }
        Ok(Self { draws })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    pub fn draws(&self) -> &[DrawResult] {
        &self.draws
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DrawResult> {
        self.draws.iter()
    }

    /// The `n` newest draws, or the whole history when shorter.
    pub fn recent(&self, n: usize) -> &[DrawResult] {
        &self.draws[..n.min(self.draws.len())]
    }

    pub fn newest(&self) -> Option<&DrawResult> {
        self.draws.first()
    }

    /// A new history holding only the `n` newest draws.
    pub fn truncated(&self, n: usize) -> DrawHistory {
        Self {
            draws: self.recent(n).to_vec(),
        }
    }

    pub fn into_inner(self) -> Vec<DrawResult> {
        self.draws
    }
}

impl<'a> IntoIterator for &'a DrawHistory {
    type Item = &'a DrawResult;
    type IntoIter = std::slice::Iter<'a, DrawResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.draws.iter()
    }
}
