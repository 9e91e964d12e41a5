use std::{fmt, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;

/// A string that is non-empty after trimming.
///
/// The stored value is the trimmed input. Used for baked good names and
/// recipe content, neither of which may be blank.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonBlankString(NonEmptyString);

impl NonBlankString {
    /// Creates a new `NonBlankString`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`BlankStringError`] if nothing remains after trimming.
    pub fn new(s: impl AsRef<str>) -> Result<Self, BlankStringError> {
        NonEmptyString::new(s.as_ref().trim().to_string())
            .map(Self)
            .map_err(|_| BlankStringError)
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for NonBlankString {
    type Error = BlankStringError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for NonBlankString {
    type Error = BlankStringError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for NonBlankString {
    type Err = BlankStringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for NonBlankString {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Deref for NonBlankString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl fmt::Display for NonBlankString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a required string is empty or only whitespace.
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
#[error("value must not be blank")]
pub struct BlankStringError;

/// Normalizes optional free text: trims it and maps blank input to `None`.
#[must_use]
pub fn optional_text(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
