use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{NonBlankString, User};

/// A named subject of repeated baking attempts, such as a sourdough loaf.
///
/// Every baked good has exactly one owner. Its iterations are stored
/// separately and refer back to it by UUID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BakedGood {
    pub(crate) uuid: Uuid,
    pub(crate) owner: Uuid,
    pub(crate) name: NonBlankString,
    pub(crate) description: Option<String>,
    pub(crate) created: DateTime<Utc>,
    pub(crate) updated: DateTime<Utc>,
}

/// A partial update to a [`BakedGood`].
///
/// Fields left as `None` are not touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BakedGoodPatch {
    /// Replacement name.
    pub name: Option<NonBlankString>,
    /// Replacement description. An empty string clears it.
    pub description: Option<String>,
}

impl BakedGoodPatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

impl BakedGood {
    /// Creates a baked good owned by `owner`.
    #[must_use]
    pub fn new(owner: &User, name: NonBlankString, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            uuid: Uuid::new_v4(),
            owner: owner.uuid(),
            name,
            description: crate::domain::text::optional_text(description),
            created: now,
            updated: now,
        }
    }

    /// Applies a patch, bumping the update timestamp.
    pub fn apply(&mut self, patch: BakedGoodPatch) {
        let BakedGoodPatch { name, description } = patch;
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(description) = description {
            self.description = crate::domain::text::optional_text(Some(description));
        }
        self.updated = Utc::now();
    }

    /// The unique, stable identifier.
    #[must_use]
    pub const fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// The owning user's UUID.
    #[must_use]
    pub const fn owner(&self) -> Uuid {
        self.owner
    }

    /// Whether `user` owns this baked good.
    #[must_use]
    pub fn is_owned_by(&self, user: &User) -> bool {
        self.owner == user.uuid()
    }

    /// The name, never blank.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// When the baked good was created.
    #[must_use]
    pub const fn created(&self) -> DateTime<Utc> {
        self.created
    }

    /// When the baked good was last modified.
    #[must_use]
    pub const fn updated(&self) -> DateTime<Utc> {
        self.updated
    }
}
