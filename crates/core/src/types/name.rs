//! Display names for users and stores.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`DisplayName`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DisplayNameError {
    /// Fewer characters than [`DisplayName::MIN_LENGTH`].
    #[error("name must be at least {min} characters long")]
    TooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// More characters than [`DisplayName::MAX_LENGTH`].
    #[error("name must be at most {max} characters long")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A user or store name.
///
/// Length is counted in characters, not bytes, after trimming surrounding
/// whitespace.
///
/// ```
/// use store_rating_core::DisplayName;
///
/// assert!(DisplayName::parse("Alexandra Montgomery-Smith").is_ok());
/// assert!(DisplayName::parse("Bob").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct DisplayName(String);

impl DisplayName {
    /// Minimum length in characters.
    pub const MIN_LENGTH: usize = 20;
    /// Maximum length in characters.
    pub const MAX_LENGTH: usize = 60;

    /// Parse a `DisplayName` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is shorter than 20 or longer
    /// than 60 characters.
    pub fn parse(s: &str) -> Result<Self, DisplayNameError> {
        let s = s.trim();
        let len = s.chars().count();

        if len < Self::MIN_LENGTH {
            return Err(DisplayNameError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }

        if len > Self::MAX_LENGTH {
            return Err(DisplayNameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_inclusive() {
        assert!(DisplayName::parse(&"a".repeat(20)).is_ok());
        assert!(DisplayName::parse(&"a".repeat(60)).is_ok());
        assert_eq!(
            DisplayName::parse(&"a".repeat(19)),
            Err(DisplayNameError::TooShort { min: 20 })
        );
        assert_eq!(
            DisplayName::parse(&"a".repeat(61)),
            Err(DisplayNameError::TooLong { max: 60 })
        );
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // 10 characters, 20 bytes
        assert!(DisplayName::parse(&"é".repeat(10)).is_err());
        // 31 characters, 62 bytes
        assert!(DisplayName::parse(&"é".repeat(31)).is_ok());
    }

    #[test]
    fn test_trims_before_counting() {
        let padded = format!("   {}   ", "a".repeat(19));
        assert!(DisplayName::parse(&padded).is_err());
    }

    #[test]
    fn test_error_message() {
        let err = DisplayName::parse("short").unwrap_err();
        assert_eq!(err.to_string(), "name must be at least 20 characters long");
    }
}
