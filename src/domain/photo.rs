use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An opaque key into the blob store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobHandle(String);

impl BlobHandle {
    /// Wraps a handle issued by a blob store.
    #[must_use]
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    /// The handle as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A photo attached to an iteration.
///
/// The lowest `order` among an iteration's photos is its cover photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub(crate) uuid: Uuid,
    pub(crate) iteration: Uuid,
    pub(crate) handle: BlobHandle,
    pub(crate) order: i64,
    pub(crate) created: DateTime<Utc>,
}

impl Photo {
    /// Creates a photo record for an uploaded blob.
    #[must_use]
    pub fn new(iteration: Uuid, handle: BlobHandle, order: i64) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            iteration,
            handle,
            order,
            created: Utc::now(),
        }
    }

    /// The unique, stable identifier.
    #[must_use]
    pub const fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// The owning iteration's UUID.
    #[must_use]
    pub const fn iteration(&self) -> Uuid {
        self.iteration
    }

    /// The blob store handle.
    #[must_use]
    pub const fn handle(&self) -> &BlobHandle {
        &self.handle
    }

    /// Display position; lower comes first.
    #[must_use]
    pub const fn order(&self) -> i64 {
        self.order
    }

    /// When the photo was attached.
    #[must_use]
    pub const fn created(&self) -> DateTime<Utc> {
        self.created
    }
}

/// The order a new photo gets when none is requested: one past the highest
/// existing order, or zero for the first photo.
#[must_use]
pub fn next_order(existing: &[Photo]) -> i64 {
    existing
        .iter()
        .map(Photo::order)
        .max()
        .map_or(0, |max| max + 1)
}
