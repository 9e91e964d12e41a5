//! Plain-text baking journal
//!
//! Baked goods and their bake attempts are stored as YAML and markdown files
//! in a directory, with photos kept in a local blob store.
//!
//! The [`domain`] module holds the entities and the pure aggregation and
//! baker's math over them. The [`storage`] module loads a journal directory
//! into a [`Journal`] and applies changes to it on behalf of a [`User`].

pub mod domain;
pub use domain::{
    BakedGood, Config, Difficulty, Identity, Iteration, NonBlankString, Photo, Rating,
    SortOption, User, build_baked_good_view, sort_iterations,
};

/// Filesystem storage for the journal.
pub mod storage;
pub use storage::{Journal, JournalError, JournalLoadError, ValidationError};
