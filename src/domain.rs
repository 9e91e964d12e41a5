//! Domain models for the baking journal.
//!
//! This module contains the journal entities (users, baked goods,
//! iterations and photos), the aggregated views built over them, and the
//! baker's math and substitution tools.

mod baked_good;
pub use baked_good::{BakedGood, BakedGoodPatch};

/// Baker's percentages, scaling and hydration.
pub mod bakers_math;
pub use bakers_math::{Formula, Ingredient, WeightedIngredient};

mod config;
pub use config::{Config, IdentityConfig};

mod difficulty;
pub use difficulty::Difficulty;

/// The community feed of recent baked goods.
pub mod feed;

mod iteration;
pub use iteration::{Iteration, IterationPatch, NewIteration};

mod photo;
pub use photo::{BlobHandle, Photo, next_order};

mod rating;
pub use rating::{InvalidRatingError, Rating};

/// Ingredient substitution guide.
pub mod substitution;

mod text;
pub use text::{BlankStringError, NonBlankString};

mod user;
pub use user::{Identity, SyncOutcome, UNKNOWN_BAKER, User};

pub mod view;
pub use view::{
    BakeRecord, BakedGoodSummary, BakedGoodView, IterationView, SortOption, Statistics,
    build_baked_good_view, sort_iterations,
};
