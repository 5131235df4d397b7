//! Typed primary keys.
//!
//! Every table uses a `SERIAL` key. Wrapping each one in its own type keeps a
//! `StoreId` from being passed where a `UserId` belongs, which matters in
//! queries like the rating upsert that take both.

/// Define an `i32`-backed ID newtype.
///
/// The generated type is `Copy`, serializes as a bare JSON integer, converts
/// to and from `i32`, and (with the `postgres` feature) binds as `INTEGER`.
///
/// ```rust
/// # use store_rating_core::define_id;
/// define_id!(ReviewId);
///
/// let id = ReviewId::new(3);
/// assert_eq!(id.as_i32(), 3);
/// assert_eq!(id.to_string(), "3");
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize,
        )]
        #[serde(transparent)]
        #[cfg_attr(feature = "postgres", derive(::sqlx::Type))]
        #[cfg_attr(feature = "postgres", sqlx(transparent))]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn as_i32(self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(UserId);
define_id!(StoreId);
define_id!(RatingId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_bare_integer() {
        let id = StoreId::new(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");

        let parsed: StoreId = serde_json::from_str("42").unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_conversions() {
        let id = UserId::from(7);
        assert_eq!(id.as_i32(), 7);
        assert_eq!(i32::from(id), 7);
        assert_eq!(id.to_string(), "7");
    }

    #[test]
    fn test_ordering_follows_value() {
        let mut ids = vec![RatingId::new(9), RatingId::new(2), RatingId::new(5)];
        ids.sort();
        assert_eq!(ids, [RatingId::new(2), RatingId::new(5), RatingId::new(9)]);
    }
}
