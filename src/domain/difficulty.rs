use std::{convert::Infallible, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// How demanding a bake was.
///
/// The journal treats difficulty as an open string. The three standard
/// levels are recognised case-insensitively and stored in canonical case;
/// anything else is kept verbatim. Which values are accepted for new
/// iterations is controlled by [`Config`](crate::Config).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Difficulty {
    /// A forgiving bake.
    Easy,
    /// Some technique required.
    #[default]
    Medium,
    /// Demanding timing or technique.
    Hard,
    /// Any other label.
    Other(String),
}

impl Difficulty {
    /// The label used for display and storage.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
            Self::Other(label) => label,
        }
    }
}

impl From<String> for Difficulty {
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("easy") {
            Self::Easy
        } else if trimmed.eq_ignore_ascii_case("medium") {
            Self::Medium
        } else if trimmed.eq_ignore_ascii_case("hard") {
            Self::Hard
        } else {
            Self::Other(trimmed.to_string())
        }
    }
}

impl From<Difficulty> for String {
    fn from(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Other(label) => label,
            standard => standard.as_str().to_string(),
        }
    }
}

impl FromStr for Difficulty {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("easy", Difficulty::Easy; "lowercase")]
    #[test_case("MEDIUM", Difficulty::Medium; "uppercase")]
    #[test_case(" Hard ", Difficulty::Hard; "padded")]
    #[test_case("Laminated", Difficulty::Other("Laminated".to_string()); "custom")]
    fn parses_labels(input: &str, expected: Difficulty) {
        assert_eq!(input.parse::<Difficulty>().unwrap(), expected);
    }

    #[test]
    fn serializes_canonical_label() {
        let yaml = serde_yaml::to_string(&Difficulty::from("hard".to_string())).unwrap();
        assert_eq!(yaml.trim(), "Hard");
    }
}
