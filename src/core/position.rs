//! Curriculum coordinates and validated rating values.
//!
//! A `Position` is where the learner currently is. A `BlockKey` names one
//! block of the curriculum. `Rating` is the 1..=5 scale shared by recall
//! confidence, recall score and glossary mastery.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize};

use crate::error::{BootcampError, Result};

/// Days in one curriculum week.
pub const DAYS_PER_WEEK: u8 = 7;

/// Blocks in one curriculum day.
pub const BLOCKS_PER_DAY: u8 = 4;

/// Blocks in one curriculum week.
pub const TOTAL_BLOCKS: u32 = DAYS_PER_WEEK as u32 * BLOCKS_PER_DAY as u32;

/// The only week with curriculum content; statistics are computed over it.
pub const TRACKED_WEEK: u32 = 1;

/// Lowest value on the rating scale.
pub const MIN_RATING: u8 = 1;

/// Highest value on the rating scale.
pub const MAX_RATING: u8 = 5;

/// Validate a week number (must be >= 1).
pub fn validate_week(week: u32) -> Result<u32> {
    if week >= 1 {
        Ok(week)
    } else {
        Err(BootcampError::validation("week", "must be >= 1, got 0"))
    }
}

/// Validate a day number (must be in 1..=7).
pub fn validate_day(day: u8) -> Result<u8> {
    if (1..=DAYS_PER_WEEK).contains(&day) {
        Ok(day)
    } else {
        Err(BootcampError::validation(
            "day",
            format!("must be in 1..={}, got {}", DAYS_PER_WEEK, day),
        ))
    }
}

/// Serde adapter that rejects stored day numbers outside 1..=7.
pub(crate) fn deserialize_day<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let day = u8::deserialize(deserializer)?;
    validate_day(day).map_err(de::Error::custom)
}

/// Validate a block number (must be in 1..=4).
pub fn validate_block(block: u8) -> Result<u8> {
    if (1..=BLOCKS_PER_DAY).contains(&block) {
        Ok(block)
    } else {
        Err(BootcampError::validation(
            "block",
            format!("must be in 1..={}, got {}", BLOCKS_PER_DAY, block),
        ))
    }
}

/// The learner's current place in the curriculum.
///
/// Persisted as three scalar keys and never deserialized directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub week: u32,
    pub day: u8,
    pub block: u8,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            week: 1,
            day: 1,
            block: 1,
        }
    }
}

impl Position {
    /// Create a position, rejecting out-of-range coordinates.
    pub fn new(week: u32, day: u8, block: u8) -> Result<Self> {
        Ok(Self {
            week: validate_week(week)?,
            day: validate_day(day)?,
            block: validate_block(block)?,
        })
    }

    /// The position that follows completing `(week, day, block)`.
    ///
    /// Callers pass the coordinates of the block just completed, not the
    /// current position. Inputs must already be validated.
    pub fn after(week: u32, day: u8, block: u8) -> Self {
        if block < BLOCKS_PER_DAY {
            Self {
                week,
                day,
                block: block + 1,
            }
        } else if day < DAYS_PER_WEEK {
            Self {
                week,
                day: day + 1,
                block: 1,
            }
        } else {
            Self {
                week: week.saturating_add(1),
                day: 1,
                block: 1,
            }
        }
    }

    /// The block this position points at.
    pub fn key(&self) -> BlockKey {
        BlockKey {
            week: self.week,
            day: self.day,
            block: self.block,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Week {}, Day {}, Block {}",
            self.week, self.day, self.block
        )
    }
}

/// Composite key of one curriculum block.
///
/// Orders canonically: week, then day, then block. Serialized as
/// `w{week}d{day}b{block}` so it can key a JSON object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct BlockKey {
    pub week: u32,
    pub day: u8,
    pub block: u8,
}

impl BlockKey {
    /// Create a key, rejecting out-of-range coordinates.
    pub fn new(week: u32, day: u8, block: u8) -> Result<Self> {
        let position = Position::new(week, day, block)?;
        Ok(position.key())
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}d{}b{}", self.week, self.day, self.block)
    }
}

impl FromStr for BlockKey {
    type Err = BootcampError;

    fn from_str(s: &str) -> Result<Self> {
        let malformed = || {
            BootcampError::validation("block key", format!("expected w<N>d<N>b<N>, got '{}'", s))
        };

        let rest = s.strip_prefix('w').ok_or_else(malformed)?;
        let (week, rest) = rest.split_once('d').ok_or_else(malformed)?;
        let (day, block) = rest.split_once('b').ok_or_else(malformed)?;

        let week = week.parse::<u32>().map_err(|_| malformed())?;
        let day = day.parse::<u8>().map_err(|_| malformed())?;
        let block = block.parse::<u8>().map_err(|_| malformed())?;

        let key = Self::new(week, day, block)?;
        // Leading zeros or '+' would alias another key's map entry
        if key.to_string() != s {
            return Err(malformed());
        }
        Ok(key)
    }
}

impl From<BlockKey> for String {
    fn from(key: BlockKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for BlockKey {
    type Error = BootcampError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// A self-assessed rating on the 1..=5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Create a rating, rejecting values outside 1..=5.
    pub fn new(value: u8) -> Result<Self> {
        if (MIN_RATING..=MAX_RATING).contains(&value) {
            Ok(Self(value))
        } else {
            Err(BootcampError::validation(
                "rating",
                format!("must be in {}..={}, got {}", MIN_RATING, MAX_RATING, value),
            ))
        }
    }

    /// The numeric value.
    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, MAX_RATING)
    }
}

impl FromStr for Rating {
    type Err = BootcampError;

    /// Parse user-entered text. Anything but a whole number in range fails.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let value = trimmed.parse::<u8>().map_err(|_| {
            BootcampError::validation("rating", format!("expected a whole number, got '{}'", s))
        })?;
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = BootcampError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}
