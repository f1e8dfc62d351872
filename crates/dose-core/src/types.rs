//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for order fields and the scheduling horizon.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// An integer field fell outside its declared range.
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// A count or duration field was negative.
    #[error("{field} must be non-negative, got {value}")]
    Negative { field: &'static str, value: i64 },
}

impl ValidationError {
    /// Name of the field that failed validation.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Empty { field } | Self::OutOfRange { field, .. } | Self::Negative { field, .. } => {
                *field
            }
        }
    }
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

/// Generates a range-checked integer newtype.
macro_rules! define_bounded_int {
    (
        $(#[$meta:meta])*
        $name:ident($inner:ty), $field_name:literal, $min:literal, $max:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name($inner);

        impl $name {
            /// Smallest accepted value.
            pub const MIN: i64 = $min;

            /// Largest accepted value.
            pub const MAX: i64 = $max;

            /// Creates a new value after checking it lies in `MIN..=MAX`.
            pub fn new(value: i64) -> Result<Self, ValidationError> {
                let out_of_range = ValidationError::OutOfRange {
                    field: $field_name,
                    value,
                    min: Self::MIN,
                    max: Self::MAX,
                };
                if !(Self::MIN..=Self::MAX).contains(&value) {
                    return Err(out_of_range);
                }
                <$inner>::try_from(value).map(Self).map_err(|_| out_of_range)
            }

            /// Returns the inner value.
            #[must_use]
            pub const fn get(self) -> $inner {
                self.0
            }
        }

        impl TryFrom<i64> for $name {
            type Error = ValidationError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                Self::from(value.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_string_id!(
    /// A validated medication order identifier.
    ///
    /// Order IDs also serve as the tie-breaker during conflict resolution, so
    /// their ordering is plain lexicographic byte order.
    OrderId, "id"
);

define_string_id!(
    /// A validated patient identifier.
    PatientId, "patient_id"
);

define_bounded_int!(
    /// Number of doses administered per day (1 to 6).
    DosesPerDay(u8), "frequency_per_day", 1, 6
);

define_bounded_int!(
    /// Order priority (1 to 5). Higher values win conflicts.
    Priority(u8), "priority", 1, 5
);

define_bounded_int!(
    /// Length of the scheduling horizon in whole days (1 to 30).
    HorizonDays(u32), "days", 1, 30
);
