//! An in-memory index of a journal
//!
//! The [`Catalog`] knows nothing about the filesystem. It holds every baked
//! good, iteration and photo, and answers the lookups the journal needs:
//! by key, by parent, and by the loose references people type.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::domain::{
    BakedGood, BakedGoodView, BlobHandle, Iteration, Photo, User, build_baked_good_view,
};

/// An in-memory representation of the journal's records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    /// Baked goods, stored contiguously.
    baked_goods: Vec<BakedGood>,

    /// An index from UUID to position in `baked_goods`.
    index: HashMap<Uuid, usize>,

    /// Iterations of each baked good, in creation order.
    iterations: HashMap<Uuid, Vec<Iteration>>,

    /// The baked good each iteration belongs to.
    iteration_parents: HashMap<Uuid, Uuid>,

    /// Photos of each iteration, in insertion order.
    photos: HashMap<Uuid, Vec<Photo>>,

    /// The iteration each photo belongs to.
    photo_parents: HashMap<Uuid, Uuid>,
}

/// Errors from inserting into a [`Catalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// An entity with this UUID is already present.
    #[error("duplicate UUID {0}")]
    Duplicate(Uuid),
    /// The parent entity is not present.
    #[error("parent {0} not found")]
    MissingParent(Uuid),
    /// Another photo of the iteration already has this order.
    #[error("iteration {iteration} already has a photo at order {order}")]
    PhotoOrder {
        /// The iteration.
        iteration: Uuid,
        /// The colliding order.
        order: i64,
    },
}

/// The kinds of entity a reference can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A baked good.
    BakedGood,
    /// An iteration.
    Iteration,
    /// A photo.
    Photo,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::BakedGood => "baked good",
            Self::Iteration => "iteration",
            Self::Photo => "photo",
        })
    }
}

/// A reference that does not pick out exactly one entity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Nothing matches.
    #[error("no {kind} matches '{reference}'")]
    NotFound {
        /// What was looked for.
        kind: EntityKind,
        /// The reference as given.
        reference: String,
    },
    /// More than one entity matches.
    #[error("'{reference}' matches {count} {kind}s; use more of the UUID")]
    Ambiguous {
        /// What was looked for.
        kind: EntityKind,
        /// The reference as given.
        reference: String,
        /// How many entities match.
        count: usize,
    },
}

fn resolve<I>(kind: EntityKind, reference: &str, candidates: I) -> Result<Uuid, ResolveError>
where
    I: IntoIterator<Item = Uuid>,
{
    let needle = reference.trim().to_ascii_lowercase();
    let not_found = || ResolveError::NotFound {
        kind,
        reference: reference.to_string(),
    };
    if needle.is_empty() {
        return Err(not_found());
    }

    let mut matches = candidates
        .into_iter()
        .filter(|uuid| uuid.to_string().starts_with(&needle))
        .collect::<Vec<_>>();

    if matches.len() > 1 {
        if let Ok(exact) = Uuid::parse_str(&needle) {
            matches.retain(|uuid| *uuid == exact);
        }
    }

    match matches.as_slice() {
        [] => Err(not_found()),
        [uuid] => Ok(*uuid),
        _ => Err(ResolveError::Ambiguous {
            kind,
            reference: reference.to_string(),
            count: matches.len(),
        }),
    }
}

impl Catalog {
    /// An empty catalog sized for `capacity` baked goods.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            baked_goods: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Inserts a baked good.
    ///
    /// # Errors
    ///
    /// Fails if a baked good with the same UUID is already present.
    pub fn insert_baked_good(&mut self, baked_good: BakedGood) -> Result<(), CatalogError> {
        let uuid = baked_good.uuid();
        if self.index.contains_key(&uuid) {
            return Err(CatalogError::Duplicate(uuid));
        }
        self.index.insert(uuid, self.baked_goods.len());
        self.baked_goods.push(baked_good);
        Ok(())
    }

    /// Replaces a baked good with an updated version of itself.
    ///
    /// # Errors
    ///
    /// Fails if the baked good is not present.
    pub fn replace_baked_good(&mut self, baked_good: BakedGood) -> Result<(), CatalogError> {
        let &position = self
            .index
            .get(&baked_good.uuid())
            .ok_or(CatalogError::MissingParent(baked_good.uuid()))?;
        self.baked_goods[position] = baked_good;
        Ok(())
    }

    /// Retrieves a baked good by UUID.
    #[must_use]
    pub fn baked_good(&self, uuid: Uuid) -> Option<&BakedGood> {
        self.index
            .get(&uuid)
            .and_then(|&position| self.baked_goods.get(position))
    }

    /// Every baked good, in insertion order.
    pub fn baked_goods(&self) -> impl Iterator<Item = &BakedGood> {
        self.baked_goods.iter()
    }

    /// The baked goods owned by `owner`, in insertion order.
    pub fn baked_goods_of(&self, owner: &User) -> impl Iterator<Item = &BakedGood> {
        self.baked_goods
            .iter()
            .filter(move |baked_good| baked_good.is_owned_by(owner))
    }

    /// Removes a baked good with its iterations and their photos.
    pub fn remove_baked_good(&mut self, uuid: Uuid) -> Option<RemovedBakedGood> {
        let position = self.index.remove(&uuid)?;
        let baked_good = self.baked_goods.remove(position);
        for (i, remaining) in self.baked_goods.iter().enumerate().skip(position) {
            self.index.insert(remaining.uuid(), i);
        }

        let iterations = self.iterations.remove(&uuid).unwrap_or_default();
        let mut photos = Vec::new();
        for iteration in &iterations {
            self.iteration_parents.remove(&iteration.uuid());
            photos.extend(self.take_photos(iteration.uuid()));
        }

        Some(RemovedBakedGood {
            baked_good,
            iterations,
            photos,
        })
    }

    /// Inserts an iteration, keeping its baked good's iterations in creation
    /// order.
    ///
    /// # Errors
    ///
    /// Fails if the iteration is already present or its baked good is not.
    pub fn insert_iteration(&mut self, iteration: Iteration) -> Result<(), CatalogError> {
        let uuid = iteration.uuid();
        let parent = iteration.baked_good();
        if self.iteration_parents.contains_key(&uuid) {
            return Err(CatalogError::Duplicate(uuid));
        }
        if !self.index.contains_key(&parent) {
            return Err(CatalogError::MissingParent(parent));
        }

        let siblings = self.iterations.entry(parent).or_default();
        let key = (iteration.created(), uuid);
        let position = siblings.partition_point(|other| (other.created(), other.uuid()) < key);
        siblings.insert(position, iteration);
        self.iteration_parents.insert(uuid, parent);
        Ok(())
    }

    /// Replaces an iteration with an updated version of itself.
    ///
    /// # Errors
    ///
    /// Fails if the iteration is not present.
    pub fn replace_iteration(&mut self, iteration: Iteration) -> Result<(), CatalogError> {
        let uuid = iteration.uuid();
        let slot = self
            .iteration_mut(uuid)
            .ok_or(CatalogError::MissingParent(uuid))?;
        *slot = iteration;
        Ok(())
    }

    /// Retrieves an iteration by UUID.
    #[must_use]
    pub fn iteration(&self, uuid: Uuid) -> Option<&Iteration> {
        let parent = self.iteration_parents.get(&uuid)?;
        self.iterations
            .get(parent)?
            .iter()
            .find(|iteration| iteration.uuid() == uuid)
    }

    fn iteration_mut(&mut self, uuid: Uuid) -> Option<&mut Iteration> {
        let parent = self.iteration_parents.get(&uuid)?;
        self.iterations
            .get_mut(parent)?
            .iter_mut()
            .find(|iteration| iteration.uuid() == uuid)
    }

    /// The iterations of a baked good, in creation order.
    #[must_use]
    pub fn iterations_of(&self, baked_good: Uuid) -> &[Iteration] {
        self.iterations
            .get(&baked_good)
            .map_or(&[][..], Vec::as_slice)
    }

    /// Removes an iteration with its photos.
    pub fn remove_iteration(&mut self, uuid: Uuid) -> Option<(Iteration, Vec<Photo>)> {
        let parent = self.iteration_parents.remove(&uuid)?;
        let siblings = self.iterations.get_mut(&parent)?;
        let position = siblings
            .iter()
            .position(|iteration| iteration.uuid() == uuid)?;
        let iteration = siblings.remove(position);
        Some((iteration, self.take_photos(uuid)))
    }

    /// Inserts a photo.
    ///
    /// # Errors
    ///
    /// Fails if the photo is already present, its iteration is not, or
    /// another photo of the iteration has the same order.
    pub fn insert_photo(&mut self, photo: Photo) -> Result<(), CatalogError> {
        let uuid = photo.uuid();
        let parent = photo.iteration();
        if self.photo_parents.contains_key(&uuid) {
            return Err(CatalogError::Duplicate(uuid));
        }
        if !self.iteration_parents.contains_key(&parent) {
            return Err(CatalogError::MissingParent(parent));
        }
        let siblings = self.photos.entry(parent).or_default();
        if siblings.iter().any(|other| other.order() == photo.order()) {
            return Err(CatalogError::PhotoOrder {
                iteration: parent,
                order: photo.order(),
            });
        }
        siblings.push(photo);
        self.photo_parents.insert(uuid, parent);
        Ok(())
    }

    /// Retrieves a photo by UUID.
    #[must_use]
    pub fn photo(&self, uuid: Uuid) -> Option<&Photo> {
        let parent = self.photo_parents.get(&uuid)?;
        self.photos_of(*parent)
            .iter()
            .find(|photo| photo.uuid() == uuid)
    }

    /// The photos of an iteration, in insertion order.
    #[must_use]
    pub fn photos_of(&self, iteration: Uuid) -> &[Photo] {
        self.photos.get(&iteration).map_or(&[][..], Vec::as_slice)
    }

    /// Removes a photo.
    pub fn remove_photo(&mut self, uuid: Uuid) -> Option<Photo> {
        let parent = self.photo_parents.remove(&uuid)?;
        let siblings = self.photos.get_mut(&parent)?;
        let position = siblings.iter().position(|photo| photo.uuid() == uuid)?;
        Some(siblings.remove(position))
    }

    fn take_photos(&mut self, iteration: Uuid) -> Vec<Photo> {
        let photos = self.photos.remove(&iteration).unwrap_or_default();
        for photo in &photos {
            self.photo_parents.remove(&photo.uuid());
        }
        photos
    }

    /// Every blob handle referenced by a photo.
    #[must_use]
    pub fn referenced_handles(&self) -> HashSet<&BlobHandle> {
        self.photos.values().flatten().map(Photo::handle).collect()
    }

    /// The aggregated view of a baked good.
    #[must_use]
    pub fn view(&self, baked_good: Uuid) -> Option<BakedGoodView<'_>> {
        let baked_good = self.baked_good(baked_good)?;
        Some(build_baked_good_view(
            baked_good,
            self.iterations_of(baked_good.uuid()),
            &self.photos,
        ))
    }

    /// Resolves a reference to one of `owner`'s baked goods.
    ///
    /// The reference is a full UUID, a unique UUID prefix, or a name matched
    /// ignoring case. UUID matches are checked across every baked good, so a
    /// reference to someone else's baked good is resolved rather than
    /// reported missing.
    ///
    /// # Errors
    ///
    /// Fails if nothing or more than one baked good matches.
    pub fn resolve_baked_good(&self, owner: &User, reference: &str) -> Result<Uuid, ResolveError> {
        let by_uuid = resolve(
            EntityKind::BakedGood,
            reference,
            self.baked_goods.iter().map(BakedGood::uuid),
        );
        if !matches!(by_uuid, Err(ResolveError::NotFound { .. })) {
            return by_uuid;
        }

        let name = reference.trim();
        let named: Vec<Uuid> = self
            .baked_goods_of(owner)
            .filter(|baked_good| baked_good.name().eq_ignore_ascii_case(name))
            .map(BakedGood::uuid)
            .collect();

        match named.as_slice() {
            [] => by_uuid,
            [uuid] => Ok(*uuid),
            _ => Err(ResolveError::Ambiguous {
                kind: EntityKind::BakedGood,
                reference: reference.to_string(),
                count: named.len(),
            }),
        }
    }

    /// Resolves a full UUID or unique UUID prefix to an iteration.
    ///
    /// # Errors
    ///
    /// Fails if nothing or more than one iteration matches.
    pub fn resolve_iteration(&self, reference: &str) -> Result<Uuid, ResolveError> {
        resolve(
            EntityKind::Iteration,
            reference,
            self.iteration_parents.keys().copied(),
        )
    }

    /// Resolves a full UUID or unique UUID prefix to a photo.
    ///
    /// # Errors
    ///
    /// Fails if nothing or more than one photo matches.
    pub fn resolve_photo(&self, reference: &str) -> Result<Uuid, ResolveError> {
        resolve(
            EntityKind::Photo,
            reference,
            self.photo_parents.keys().copied(),
        )
    }
}

/// What [`Catalog::remove_baked_good`] took out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedBakedGood {
    /// The baked good itself.
    pub baked_good: BakedGood,
    /// Its iterations.
    pub iterations: Vec<Iteration>,
    /// Photos of those iterations.
    pub photos: Vec<Photo>,
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;
    use crate::domain::{Difficulty, Identity, NewIteration, NonBlankString, SortOption};

    fn user(subject: &str) -> User {
        User::from_identity(&Identity::new(subject))
    }

    fn good(owner: &User, name: &str) -> BakedGood {
        BakedGood::new(owner, NonBlankString::new(name).unwrap(), None)
    }

    fn iteration(baked_good: &BakedGood, day: u32) -> Iteration {
        let mut iteration = Iteration::new(
            baked_good.uuid(),
            NewIteration {
                recipe: NonBlankString::new("flour, water").unwrap(),
                difficulty: Difficulty::Easy,
                total_minutes: 60,
                bake_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
                rating: None,
                notes: None,
                source_url: None,
            },
        );
        iteration.created = Utc.with_ymd_and_hms(2024, 1, day, 8, 0, 0).unwrap();
        iteration
    }

    #[test]
    fn iterations_are_kept_in_creation_order() {
        let owner = user("ada");
        let good = good(&owner, "Bagel");
        let mut catalog = Catalog::default();
        catalog.insert_baked_good(good.clone()).unwrap();

        let late = iteration(&good, 20);
        let early = iteration(&good, 2);
        let middle = iteration(&good, 9);
        for it in [&late, &early, &middle] {
            catalog.insert_iteration(it.clone()).unwrap();
        }

        let order: Vec<Uuid> = catalog
            .iterations_of(good.uuid())
            .iter()
            .map(Iteration::uuid)
            .collect();
        assert_eq!(order, vec![early.uuid(), middle.uuid(), late.uuid()]);
    }

    #[test]
    fn children_require_their_parent() {
        let owner = user("ada");
        let good = good(&owner, "Bagel");
        let mut catalog = Catalog::default();

        let orphan = iteration(&good, 1);
        assert_eq!(
            catalog.insert_iteration(orphan.clone()),
            Err(CatalogError::MissingParent(good.uuid()))
        );

        let photo = Photo::new(orphan.uuid(), BlobHandle::new("x"), 0);
        assert_eq!(
            catalog.insert_photo(photo),
            Err(CatalogError::MissingParent(orphan.uuid()))
        );
    }

    #[test]
    fn duplicates_are_rejected() {
        let owner = user("ada");
        let good = good(&owner, "Bagel");
        let mut catalog = Catalog::default();
        catalog.insert_baked_good(good.clone()).unwrap();

        assert_eq!(
            catalog.insert_baked_good(good.clone()),
            Err(CatalogError::Duplicate(good.uuid()))
        );
    }

    #[test]
    fn photo_orders_are_unique_per_iteration() {
        let owner = user("ada");
        let good = good(&owner, "Bagel");
        let first = iteration(&good, 1);
        let second = iteration(&good, 2);
        let mut catalog = Catalog::default();
        catalog.insert_baked_good(good).unwrap();
        catalog.insert_iteration(first.clone()).unwrap();
        catalog.insert_iteration(second.clone()).unwrap();

        catalog
            .insert_photo(Photo::new(first.uuid(), BlobHandle::new("a"), 0))
            .unwrap();
        catalog
            .insert_photo(Photo::new(second.uuid(), BlobHandle::new("b"), 0))
            .unwrap();

        assert_eq!(
            catalog.insert_photo(Photo::new(first.uuid(), BlobHandle::new("c"), 0)),
            Err(CatalogError::PhotoOrder {
                iteration: first.uuid(),
                order: 0,
            })
        );
        assert_eq!(catalog.photos_of(first.uuid()).len(), 1);
    }

    #[test]
    fn removing_a_baked_good_takes_its_children() {
        let owner = user("ada");
        let keep = good(&owner, "Keep");
        let drop = good(&owner, "Drop");
        let mut catalog = Catalog::default();
        catalog.insert_baked_good(drop.clone()).unwrap();
        catalog.insert_baked_good(keep.clone()).unwrap();
        let it = iteration(&drop, 1);
        catalog.insert_iteration(it.clone()).unwrap();
        let photo = Photo::new(it.uuid(), BlobHandle::new("x"), 0);
        catalog.insert_photo(photo.clone()).unwrap();

        let removed = catalog.remove_baked_good(drop.uuid()).unwrap();

        assert_eq!(removed.iterations, vec![it.clone()]);
        assert_eq!(removed.photos, vec![photo.clone()]);
        assert!(catalog.iteration(it.uuid()).is_none());
        assert!(catalog.photo(photo.uuid()).is_none());
        assert!(catalog.referenced_handles().is_empty());
        assert_eq!(catalog.baked_good(keep.uuid()), Some(&keep));
    }

    #[test]
    fn removing_an_iteration_takes_its_photos() {
        let owner = user("ada");
        let good = good(&owner, "Bagel");
        let mut catalog = Catalog::default();
        catalog.insert_baked_good(good.clone()).unwrap();
        let it = iteration(&good, 1);
        catalog.insert_iteration(it.clone()).unwrap();
        let photo = Photo::new(it.uuid(), BlobHandle::new("x"), 0);
        catalog.insert_photo(photo.clone()).unwrap();

        let (removed, photos) = catalog.remove_iteration(it.uuid()).unwrap();

        assert_eq!(removed, it);
        assert_eq!(photos, vec![photo]);
        assert!(catalog.iterations_of(good.uuid()).is_empty());
    }

    #[test]
    fn view_aggregates_iterations_and_photos() {
        let owner = user("ada");
        let good = good(&owner, "Bagel");
        let mut catalog = Catalog::default();
        catalog.insert_baked_good(good.clone()).unwrap();
        let first = iteration(&good, 1);
        let second = iteration(&good, 5);
        catalog.insert_iteration(first.clone()).unwrap();
        catalog.insert_iteration(second.clone()).unwrap();
        catalog
            .insert_photo(Photo::new(second.uuid(), BlobHandle::new("cover"), 0))
            .unwrap();

        let view = catalog.view(good.uuid()).unwrap();

        assert_eq!(view.stats.iteration_count, 2);
        assert_eq!(
            view.cover_photo().map(|p| p.handle().as_str()),
            Some("cover")
        );
        let oldest_first = view.sorted(SortOption::DateAsc);
        assert_eq!(oldest_first[0].iteration.uuid(), first.uuid());
    }

    #[test]
    fn resolve_baked_good_by_name_prefix_or_uuid() {
        let ada = user("ada");
        let grace = user("grace");
        let bagel = good(&ada, "Bagel");
        let theirs = good(&grace, "Bagel");
        let mut catalog = Catalog::default();
        catalog.insert_baked_good(bagel.clone()).unwrap();
        catalog.insert_baked_good(theirs.clone()).unwrap();

        assert_eq!(catalog.resolve_baked_good(&ada, "bagel"), Ok(bagel.uuid()));
        assert_eq!(
            catalog.resolve_baked_good(&grace, " BAGEL "),
            Ok(theirs.uuid())
        );
        assert_eq!(
            catalog.resolve_baked_good(&ada, &theirs.uuid().to_string()),
            Ok(theirs.uuid())
        );
        assert_eq!(
            catalog.resolve_baked_good(&ada, &bagel.uuid().to_string()[..8]),
            Ok(bagel.uuid())
        );
        assert!(matches!(
            catalog.resolve_baked_good(&ada, "Croissant"),
            Err(ResolveError::NotFound { .. })
        ));
    }

    #[test]
    fn duplicate_names_are_ambiguous() {
        let ada = user("ada");
        let mut catalog = Catalog::default();
        catalog.insert_baked_good(good(&ada, "Loaf")).unwrap();
        catalog.insert_baked_good(good(&ada, "loaf")).unwrap();

        assert_eq!(
            catalog.resolve_baked_good(&ada, "LOAF"),
            Err(ResolveError::Ambiguous {
                kind: EntityKind::BakedGood,
                reference: "LOAF".to_string(),
                count: 2,
            })
        );
    }

    #[test]
    fn empty_prefix_matches_nothing() {
        let ada = user("ada");
        let mut catalog = Catalog::default();
        catalog.insert_baked_good(good(&ada, "Loaf")).unwrap();

        assert!(matches!(
            catalog.resolve_iteration("  "),
            Err(ResolveError::NotFound { .. })
        ));
    }
}
