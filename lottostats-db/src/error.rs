//! Error types for schema, draw and analysis contract violations.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, StatsError>;

/// Contract violations raised by the schema, the draw history and the engines.
///
/// An empty history is never an error: every engine returns zero-valued
/// results for it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    /// Game configuration that cannot describe a real draw
    #[error("Invalid game schema: {0}")]
    InvalidSchema(String),

    /// A drawn number outside `[1, max]`
    #[error("Number {number} out of range [1-{max}] in draw of {date}")]
    OutOfRange { number: u8, max: u8, date: NaiveDate },

    /// A queried number outside its pool
    #[error("Number {number} is not in the pool [1-{max}]")]
    NumberOutOfPool { number: u8, max: u8 },

    /// Two draws sharing the same (date, draw time) key
    #[error("Duplicate draw {0}")]
    DuplicateDraw(String),

    /// Draw too large for combination enumeration
    #[error("Draw of {size} numbers exceeds the supported maximum of {max}")]
    DrawTooLarge { size: usize, max: usize },

    /// Strategy weights that are negative or do not sum to 1
    #[error("Invalid strategy weights: {0}")]
    InvalidWeights(String),

    /// Structurally invalid draw (wrong count, duplicates, bonus mismatch)
    #[error("Invalid draw of {date}: {reason}")]
    InvalidDraw { date: NaiveDate, reason: String },

    /// Draw time label that is not "H:MM AM/PM", or a schedule with no drawing
    #[error("Invalid draw time: {0}")]
    InvalidDrawTime(String),

    /// Unknown game slug
    #[error("Unknown game: {0}")]
    UnknownGame(String),

    /// Weighted sampling failure
    #[error("Sampling error: {0}")]
    Sampling(String),
}
