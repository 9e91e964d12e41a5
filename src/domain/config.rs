use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{Difficulty, Identity, SortOption, feed::DEFAULT_COMMUNITY_LIMIT};

/// Configuration for a baking journal.
///
/// Stored as TOML in `.crumb/config.toml`. Every field has a default, so an
/// empty file (or no file at all) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// The difficulty labels accepted for new or edited iterations.
    ///
    /// Matching ignores case. If this is empty, any label is allowed.
    allowed_difficulties: Vec<String>,

    /// Whether to skip files in the journal directory that cannot be parsed,
    /// instead of refusing to load.
    pub allow_unrecognised: bool,

    /// How many baked goods the community feed shows.
    pub community_limit: usize,

    /// The iteration order used when none is requested.
    pub default_sort: SortOption,

    /// The identity to act as when none is given on the command line.
    pub identity: Option<IdentityConfig>,
}

/// A configured default identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Stable external subject.
    pub subject: String,
    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
}

impl From<IdentityConfig> for Identity {
    fn from(config: IdentityConfig) -> Self {
        Self {
            subject: config.subject,
            email: config.email,
            name: config.name,
            picture_url: config.picture_url,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            allowed_difficulties: default_difficulties(),
            allow_unrecognised: false,
            community_limit: DEFAULT_COMMUNITY_LIMIT,
            default_sort: SortOption::default(),
            identity: None,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the allowed difficulty labels.
    #[must_use]
    pub fn allowed_difficulties(&self) -> &[String] {
        &self.allowed_difficulties
    }

    /// Checks if a difficulty is allowed by the configuration.
    ///
    /// If `allowed_difficulties` is empty, everything is allowed.
    #[must_use]
    pub fn is_difficulty_allowed(&self, difficulty: &Difficulty) -> bool {
        self.allowed_difficulties.is_empty()
            || self
                .allowed_difficulties
                .iter()
                .any(|d| d.eq_ignore_ascii_case(difficulty.as_str()))
    }
}

fn default_difficulties() -> Vec<String> {
    [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
        .iter()
        .map(|d| d.as_str().to_string())
        .collect()
}

const fn default_community_limit() -> usize {
    DEFAULT_COMMUNITY_LIMIT
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_difficulties")]
        allowed_difficulties: Vec<String>,

        #[serde(default)]
        allow_unrecognised: bool,

        #[serde(default = "default_community_limit")]
        community_limit: usize,

        #[serde(default)]
        default_sort: SortOption,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        identity: Option<IdentityConfig>,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                allowed_difficulties,
                allow_unrecognised,
                community_limit,
                default_sort,
                identity,
            } => Self {
                allowed_difficulties,
                allow_unrecognised,
                community_limit,
                default_sort,
                identity,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            allowed_difficulties: config.allowed_difficulties,
            allow_unrecognised: config.allow_unrecognised,
            community_limit: config.community_limit,
            default_sort: config.default_sort,
            identity: config.identity,
        }
    }
}
