//! Validated primitive types shared across the MediFlow crates.
//!
//! These types are used at the edges of the system (command-line arguments, configuration) to
//! reject bad input before it reaches the patient record structures.

use std::fmt;

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// # Returns
    ///
    /// Returns `Ok(NonEmptyText)` if the trimmed input is non-empty,
    /// or `Err(TextError::Empty)` if it's empty or contains only whitespace.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the owned string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for NonEmptyText {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// TRIAGE PRIORITY
// ============================================================================

/// Errors returned when converting a raw level into a [`Priority`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PriorityError {
    /// The level is outside the triage range 1..=3.
    #[error("priority must be 1 (Critical), 2 (Urgent) or 3 (Normal), got {0}")]
    OutOfRange(i32),
}

/// Triage priority. Lower levels are more urgent and are seen first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Critical,
    Urgent,
    #[default]
    Normal,
}

impl Priority {
    /// Returns the numeric level stored in patient records (1, 2 or 3).
    pub fn level(self) -> i32 {
        match self {
            Priority::Critical => 1,
            Priority::Urgent => 2,
            Priority::Normal => 3,
        }
    }

    /// Returns the human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Priority::Critical => "Critical",
            Priority::Urgent => "Urgent",
            Priority::Normal => "Normal",
        }
    }
}

impl TryFrom<i32> for Priority {
    type Error = PriorityError;

    fn try_from(level: i32) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(Priority::Critical),
            2 => Ok(Priority::Urgent),
            3 => Ok(Priority::Normal),
            other => Err(PriorityError::OutOfRange(other)),
        }
    }
}

impl From<Priority> for i32 {
    fn from(priority: Priority) -> Self {
        priority.level()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl serde::Serialize for Priority {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(self.level())
    }
}

impl<'de> serde::Deserialize<'de> for Priority {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let level = i32::deserialize(deserializer)?;
        Priority::try_from(level).map_err(serde::de::Error::custom)
    }
}
