//! Star ratings and their aggregates.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Error returned when a rating is outside the 1-5 star range.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingError {
    /// Value outside [`RatingValue::MIN`]..=[`RatingValue::MAX`].
    #[error("rating must be between 1 and 5 (got {0})")]
    OutOfRange(i64),
}

/// A single 1-5 star rating.
///
/// ```
/// use store_rating_core::RatingValue;
///
/// assert_eq!(RatingValue::try_from(4_i64).unwrap().get(), 4);
/// assert!(RatingValue::try_from(0_i64).is_err());
/// assert!(RatingValue::try_from(6_i64).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct RatingValue(u8);

impl RatingValue {
    /// Lowest allowed rating.
    pub const MIN: u8 = 1;
    /// Highest allowed rating.
    pub const MAX: u8 = 5;

    /// The number of stars.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for RatingValue {
    type Error = RatingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or(RatingError::OutOfRange(value))
    }
}

impl TryFrom<i16> for RatingValue {
    type Error = RatingError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Self::try_from(i64::from(value))
    }
}

impl From<RatingValue> for u8 {
    fn from(value: RatingValue) -> Self {
        value.0
    }
}

impl From<RatingValue> for i16 {
    fn from(value: RatingValue) -> Self {
        Self::from(value.0)
    }
}

impl fmt::Display for RatingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mean star rating of a store, rounded to two decimal places.
///
/// Serialized as a JSON number (`4.5`, not `"4.50"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AverageRating(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl AverageRating {
    /// Decimal places kept after rounding.
    pub const SCALE: u32 = 2;

    /// Wrap a decimal, rounding half away from zero to two places.
    #[must_use]
    pub fn new(value: Decimal) -> Self {
        Self(value.round_dp_with_strategy(Self::SCALE, RoundingStrategy::MidpointAwayFromZero))
    }

    /// The rounded value.
    #[must_use]
    pub const fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for AverageRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sum and count of the ratings attached to one store.
///
/// The database computes both; the mean is derived here so that "no
/// ratings" stays distinct from an average of zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RatingSummary {
    /// Sum of all rating values.
    pub sum: i64,
    /// Number of ratings.
    pub count: i64,
}

impl RatingSummary {
    /// Create a summary from a database `SUM` and `COUNT`.
    #[must_use]
    pub const fn new(sum: i64, count: i64) -> Self {
        Self { sum, count }
    }

    /// Build a summary from individual ratings.
    #[must_use]
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = RatingValue>,
    {
        values.into_iter().fold(Self::default(), |acc, v| Self {
            sum: acc.sum + i64::from(v.get()),
            count: acc.count + 1,
        })
    }

    /// Mean rating, or `None` when the store has no ratings.
    #[must_use]
    pub fn average(&self) -> Option<AverageRating> {
        if self.count <= 0 {
            return None;
        }

        Decimal::from(self.sum)
            .checked_div(Decimal::from(self.count))
            .map(AverageRating::new)
    }
}
