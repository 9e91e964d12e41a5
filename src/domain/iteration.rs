use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::{Difficulty, NonBlankString, Rating, text::optional_text};

/// One recorded bake attempt of a [`BakedGood`](crate::BakedGood).
///
/// The recipe is markdown text. Total time is in minutes and therefore
/// never negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Iteration {
    pub(crate) uuid: Uuid,
    pub(crate) baked_good: Uuid,
    pub(crate) recipe: NonBlankString,
    pub(crate) difficulty: Difficulty,
    pub(crate) total_minutes: u32,
    pub(crate) bake_date: NaiveDate,
    pub(crate) rating: Option<Rating>,
    pub(crate) notes: Option<String>,
    pub(crate) source_url: Option<String>,
    pub(crate) created: DateTime<Utc>,
    pub(crate) updated: DateTime<Utc>,
}

/// The caller-supplied fields of a new iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIteration {
    /// Markdown recipe.
    pub recipe: NonBlankString,
    /// Difficulty label.
    pub difficulty: Difficulty,
    /// Total time in minutes.
    pub total_minutes: u32,
    /// The day of the bake.
    pub bake_date: NaiveDate,
    /// Optional rating.
    pub rating: Option<Rating>,
    /// Optional notes.
    pub notes: Option<String>,
    /// Optional link to where the recipe came from.
    pub source_url: Option<String>,
}

/// A partial update to an [`Iteration`].
///
/// `None` leaves a field untouched. Optional text fields are cleared by
/// passing an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IterationPatch {
    /// Replacement recipe.
    pub recipe: Option<NonBlankString>,
    /// Replacement difficulty.
    pub difficulty: Option<Difficulty>,
    /// Replacement total time.
    pub total_minutes: Option<u32>,
    /// Replacement bake date.
    pub bake_date: Option<NaiveDate>,
    /// Replacement rating.
    pub rating: Option<Rating>,
    /// Replacement notes.
    pub notes: Option<String>,
    /// Replacement source URL.
    pub source_url: Option<String>,
}

impl IterationPatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.recipe.is_none()
            && self.difficulty.is_none()
            && self.total_minutes.is_none()
            && self.bake_date.is_none()
            && self.rating.is_none()
            && self.notes.is_none()
            && self.source_url.is_none()
    }
}

impl Iteration {
    /// Creates an iteration of the given baked good.
    #[must_use]
    pub fn new(baked_good: Uuid, fields: NewIteration) -> Self {
        let NewIteration {
            recipe,
            difficulty,
            total_minutes,
            bake_date,
            rating,
            notes,
            source_url,
        } = fields;
        let now = Utc::now();

        Self {
            uuid: Uuid::new_v4(),
            baked_good,
            recipe,
            difficulty,
            total_minutes,
            bake_date,
            rating,
            notes: optional_text(notes),
            source_url: optional_text(source_url),
            created: now,
            updated: now,
        }
    }

    /// Starts a fresh attempt from this one.
    ///
    /// Recipe, difficulty, total time and source URL carry over. The bake
    /// date becomes `today`; rating and notes are left empty. Photos are not
    /// part of an iteration record and so are never copied.
    #[must_use]
    pub fn duplicate(&self, today: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            uuid: Uuid::new_v4(),
            baked_good: self.baked_good,
            recipe: self.recipe.clone(),
            difficulty: self.difficulty.clone(),
            total_minutes: self.total_minutes,
            bake_date: today,
            rating: None,
            notes: None,
            source_url: self.source_url.clone(),
            created: now,
            updated: now,
        }
    }

    /// Applies a patch, bumping the update timestamp.
    pub fn apply(&mut self, patch: IterationPatch) {
        let IterationPatch {
            recipe,
            difficulty,
            total_minutes,
            bake_date,
            rating,
            notes,
            source_url,
        } = patch;

        if let Some(recipe) = recipe {
            self.recipe = recipe;
        }
        if let Some(difficulty) = difficulty {
            self.difficulty = difficulty;
        }
        if let Some(total_minutes) = total_minutes {
            self.total_minutes = total_minutes;
        }
        if let Some(bake_date) = bake_date {
            self.bake_date = bake_date;
        }
        if rating.is_some() {
            self.rating = rating;
        }
        if notes.is_some() {
            self.notes = optional_text(notes);
        }
        if source_url.is_some() {
            self.source_url = optional_text(source_url);
        }
        self.updated = Utc::now();
    }

    /// The unique, stable identifier.
    #[must_use]
    pub const fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// The owning baked good's UUID.
    #[must_use]
    pub const fn baked_good(&self) -> Uuid {
        self.baked_good
    }

    /// The markdown recipe.
    #[must_use]
    pub fn recipe(&self) -> &str {
        self.recipe.as_str()
    }

    /// The difficulty label.
    #[must_use]
    pub const fn difficulty(&self) -> &Difficulty {
        &self.difficulty
    }

    /// Total time in minutes.
    #[must_use]
    pub const fn total_minutes(&self) -> u32 {
        self.total_minutes
    }

    /// The day of the bake.
    #[must_use]
    pub const fn bake_date(&self) -> NaiveDate {
        self.bake_date
    }

    /// The rating, if the bake has been rated.
    #[must_use]
    pub const fn rating(&self) -> Option<Rating> {
        self.rating
    }

    /// Free-text notes.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Where the recipe came from.
    #[must_use]
    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }

    /// When the iteration was recorded.
    #[must_use]
    pub const fn created(&self) -> DateTime<Utc> {
        self.created
    }

    /// When the iteration was last edited.
    #[must_use]
    pub const fn updated(&self) -> DateTime<Utc> {
        self.updated
    }
}
