//! Core proof types for validated domain values.
//!
//! These types enforce invariants at construction time. Once you hold a value,
//! you know it satisfies all required constraints. Deserialization goes through
//! the same constructors, so a persisted record with an out-of-range rating
//! fails at the parse boundary instead of leaking into scoring.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Validation errors ────────────────────────────────────────

/// Invariant violation detected at an entity-construction boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
        value: i64,
    },
    #[error("{field} must be between 0 and 100, got {value}")]
    PercentageOutOfRange { field: &'static str, value: f64 },
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("time frame ends ({end}) before it starts ({start})")]
    InvertedTimeFrame { start: String, end: String },
    #[error("step `{step}` is listed more than once")]
    DuplicateStep { step: String },
}

impl ValidationError {
    /// Rename the offending field, keeping the rest of the error intact.
    ///
    /// Newtype constructors report a generic field name; factories call this
    /// to point at the actual record field (e.g. `impact`, `priority`).
    #[must_use]
    pub fn for_field(self, field: &'static str) -> Self {
        match self {
            Self::OutOfRange {
                min, max, value, ..
            } => Self::OutOfRange {
                field,
                min,
                max,
                value,
            },
            Self::PercentageOutOfRange { value, .. } => {
                Self::PercentageOutOfRange { field, value }
            }
            Self::Empty { .. } => Self::Empty { field },
            other @ (Self::InvertedTimeFrame { .. } | Self::DuplicateStep { .. }) => other,
        }
    }
}

// ── NonEmptyString ───────────────────────────────────────────

/// A string guaranteed to be non-empty (after trimming).
///
/// Used for record names and requirement texts; an empty name is never a
/// valid author input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NonEmptyString(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("text must not be empty")]
pub struct EmptyStringError;

impl From<EmptyStringError> for ValidationError {
    fn from(_: EmptyStringError) -> Self {
        Self::Empty { field: "text" }
    }
}

impl NonEmptyString {
    pub fn new(value: impl Into<String>) -> Result<Self, EmptyStringError> {
        let value = value.into();
        if value.trim().is_empty() {
            Err(EmptyStringError)
        } else {
            Ok(Self(value))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for NonEmptyString {
    type Error = EmptyStringError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for NonEmptyString {
    type Error = EmptyStringError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl std::ops::Deref for NonEmptyString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl AsRef<str> for NonEmptyString {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for NonEmptyString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Rating ───────────────────────────────────────────────────

/// A 1..=5 rating: impact, likelihood, difficulty, success probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::OutOfRange {
                field: "rating",
                min: Self::MIN.into(),
                max: Self::MAX.into(),
                value: value.into(),
            })
        }
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }

    /// The rating mirrored around the middle of the scale (1 <-> 5, 2 <-> 4).
    #[must_use]
    pub const fn inverted(self) -> Self {
        Self(Self::MAX + Self::MIN - self.0)
    }
}

impl TryFrom<u8> for Rating {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── WorkshopNumber ───────────────────────────────────────────

/// One of the five EBIOS RM workshops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct WorkshopNumber(u8);

impl WorkshopNumber {
    pub const FIRST: Self = Self(1);
    pub const LAST: Self = Self(5);

    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if (Self::FIRST.0..=Self::LAST.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::OutOfRange {
                field: "workshop number",
                min: Self::FIRST.0.into(),
                max: Self::LAST.0.into(),
                value: value.into(),
            })
        }
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// All five workshops in methodology order.
    pub fn all() -> impl Iterator<Item = Self> {
        (Self::FIRST.0..=Self::LAST.0).map(Self)
    }

    /// The workshop that follows this one, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        if self.0 < Self::LAST.0 {
            Some(Self(self.0 + 1))
        } else {
            None
        }
    }
}

impl TryFrom<u8> for WorkshopNumber {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WorkshopNumber> for u8 {
    fn from(value: WorkshopNumber) -> Self {
        value.0
    }
}

impl fmt::Display for WorkshopNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── GapPriority ──────────────────────────────────────────────

/// Priority of a compliance gap, 1 (lowest) to 5 (highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct GapPriority(u8);

impl GapPriority {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::OutOfRange {
                field: "priority",
                min: Self::MIN.into(),
                max: Self::MAX.into(),
                value: value.into(),
            })
        }
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for GapPriority {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GapPriority> for u8 {
    fn from(value: GapPriority) -> Self {
        value.0
    }
}

// ── Percentage ───────────────────────────────────────────────

/// A finite percentage in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Percentage(f64);

impl Percentage {
    pub const ZERO: Self = Self(0.0);
    pub const FULL: Self = Self(100.0);

    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if value.is_finite() && (0.0..=100.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::PercentageOutOfRange {
                field: "percentage",
                value,
            })
        }
    }

    /// `done / total * 100`. An empty total counts as fully done.
    #[must_use]
    pub fn from_ratio(done: usize, total: usize) -> Self {
        if total == 0 {
            return Self::FULL;
        }
        let done = done.min(total);
        Self(done as f64 / total as f64 * 100.0)
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Percentage {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Percentage> for f64 {
    fn from(value: Percentage) -> Self {
        value.0
    }
}
