//! Postal addresses.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Address`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// The input is empty or only whitespace.
    #[error("address cannot be empty")]
    Empty,
    /// More characters than [`Address::MAX_LENGTH`].
    #[error("address must be at most {max} characters long")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A free-form postal address for a user or store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Maximum length in characters.
    pub const MAX_LENGTH: usize = 400;

    /// Parse an `Address` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or longer than 400
    /// characters.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(AddressError::Empty);
        }

        if s.chars().count() > Self::MAX_LENGTH {
            return Err(AddressError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert!(Address::parse("12 Harbour Road, Pune").is_ok());
        assert_eq!(Address::parse("   "), Err(AddressError::Empty));
        assert!(Address::parse(&"x".repeat(400)).is_ok());
        assert_eq!(
            Address::parse(&"x".repeat(401)),
            Err(AddressError::TooLong { max: 400 })
        );
    }
}
