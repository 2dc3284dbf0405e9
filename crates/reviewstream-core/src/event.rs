//! Review events and their wire format.
//!
//! One message is one JSON object per line:
//!
//! ```text
//! {"category": "RPG", "Review Score": 87, ...}
//! ```
//!
//! `category` and `Review Score` are the only keys the consumer reads. The
//! producer adds a few descriptive fields (`message`, `timestamp`,
//! `keyword_mentioned`, `message_length`) that consumers ignore.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone};
use enum_map::Enum;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Lowest valid review score (inclusive).
pub const SCORE_MIN: u32 = 0;
/// Highest valid review score (inclusive).
pub const SCORE_MAX: u32 = 100;

/// Wire key carrying the genre label.
pub const CATEGORY_KEY: &str = "category";
/// Wire key carrying the score. The space is part of the contract.
pub const SCORE_KEY: &str = "Review Score";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Game genre attached to a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Enum)]
pub enum Genre {
    Horror,
    Action,
    Rpg,
    Roguelike,
    Platformer,
    Sports,
    Strategy,
    Fps,
    Mmo,
    Mobile,
    Shooter,
}

impl Genre {
    /// Every genre, in declaration order.
    pub const ALL: [Genre; 11] = [
        Genre::Horror,
        Genre::Action,
        Genre::Rpg,
        Genre::Roguelike,
        Genre::Platformer,
        Genre::Sports,
        Genre::Strategy,
        Genre::Fps,
        Genre::Mmo,
        Genre::Mobile,
        Genre::Shooter,
    ];

    /// Label as it appears on the wire and in charts.
    pub fn label(self) -> &'static str {
        match self {
            Genre::Horror => "Horror",
            Genre::Action => "Action",
            Genre::Rpg => "RPG",
            Genre::Roguelike => "Roguelike",
            Genre::Platformer => "Platformer",
            Genre::Sports => "Sports",
            Genre::Strategy => "Strategy",
            Genre::Fps => "FPS",
            Genre::Mmo => "MMO",
            Genre::Mobile => "Mobile",
            Genre::Shooter => "Shooter",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Returned when a label is not one of the known genres.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown genre '{0}'")]
pub struct UnknownGenre(pub String);

impl FromStr for Genre {
    type Err = UnknownGenre;

    /// Labels are matched exactly; `rpg` is not `RPG`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Genre::ALL
            .into_iter()
            .find(|genre| genre.label() == s)
            .ok_or_else(|| UnknownGenre(s.to_string()))
    }
}

/// A single review: one genre, one score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewEvent {
    pub genre: Genre,
    pub score: u32,
}

impl ReviewEvent {
    pub fn new(genre: Genre, score: u32) -> Self {
        Self { genre, score }
    }
}

/// Why a raw message could not be turned into a [`ReviewEvent`].
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("message is not a JSON object")]
    NotAnObject,
    #[error("missing field '{0}'")]
    MissingField(&'static str),
    #[error("field '{field}' must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
    #[error(transparent)]
    UnknownGenre(#[from] UnknownGenre),
    #[error("score {0} is outside 0..=100")]
    ScoreOutOfRange(serde_json::Number),
}

/// Decodes one wire message.
///
/// Extra keys are ignored. The score must be a JSON integer within
/// [`SCORE_MIN`]..=[`SCORE_MAX`]; floats and numeric strings are rejected.
///
/// # Errors
/// Returns a [`DecodeError`] describing the first problem found.
pub fn decode(raw: &str) -> Result<ReviewEvent, DecodeError> {
    let value: Value = serde_json::from_str(raw.trim())?;
    let Value::Object(fields) = value else {
        return Err(DecodeError::NotAnObject);
    };

    let category = fields
        .get(CATEGORY_KEY)
        .ok_or(DecodeError::MissingField(CATEGORY_KEY))?
        .as_str()
        .ok_or(DecodeError::InvalidField {
            field: CATEGORY_KEY,
            expected: "a string",
        })?;
    let genre = category.parse::<Genre>()?;

    let score = match fields.get(SCORE_KEY) {
        None => return Err(DecodeError::MissingField(SCORE_KEY)),
        Some(Value::Number(number)) => parse_score(number)?,
        Some(_) => {
            return Err(DecodeError::InvalidField {
                field: SCORE_KEY,
                expected: "an integer",
            });
        }
    };

    Ok(ReviewEvent { genre, score })
}

fn parse_score(number: &serde_json::Number) -> Result<u32, DecodeError> {
    if !number.is_u64() && !number.is_i64() {
        return Err(DecodeError::InvalidField {
            field: SCORE_KEY,
            expected: "an integer",
        });
    }

    number
        .as_u64()
        .and_then(|score| u32::try_from(score).ok())
        .filter(|score| (SCORE_MIN..=SCORE_MAX).contains(score))
        .ok_or_else(|| DecodeError::ScoreOutOfRange(number.clone()))
}

/// The full message the producer publishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireMessage {
    pub message: String,
    pub timestamp: String,
    pub category: &'static str,
    #[serde(rename = "Review Score")]
    pub review_score: u32,
    pub keyword_mentioned: &'static str,
    pub message_length: usize,
}

impl WireMessage {
    /// Builds the published form of `event`, stamped with `at`.
    pub fn from_event<Tz>(event: &ReviewEvent, at: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let label = event.genre.label();
        let message = format!(
            "I just played a {label} game! I'd give it a score of {}.",
            event.score
        );
        Self {
            message_length: message.chars().count(),
            message,
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
            category: label,
            review_score: event.score,
            keyword_mentioned: label,
        }
    }

    /// Serializes to a single NDJSON line (without the trailing newline).
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
