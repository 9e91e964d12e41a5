//! A filesystem backed baking journal
//!
//! The [`Journal`] manages baked goods, iterations and photos stored in a
//! directory. It is a wrapper around the filesystem agnostic [`Catalog`].
//!
//! Every mutation takes the calling [`User`] explicitly and checks that the
//! caller owns the baked good at the top of the entity chain. Records are
//! written to disk first; the catalog is only updated once the write has
//! succeeded.

use std::{
    collections::HashSet,
    ffi::OsStr,
    fmt, fs, io,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use nonempty::NonEmpty;
use rayon::iter::{Either, IntoParallelRefIterator, ParallelIterator};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::{
    domain::{
        BakedGood, BakedGoodPatch, BakedGoodSummary, BakedGoodView, BlankStringError, BlobHandle,
        Config, Difficulty, Identity, InvalidRatingError, Iteration, IterationPatch,
        IterationView, NewIteration, NonBlankString, Photo, SyncOutcome, User,
        feed::{self, CommunityEntry},
        next_order,
    },
    storage::{
        BlobStore, Catalog, CatalogError, EntityKind, FsBlobStore, JournalPath, Layout, LoadError,
        MarkdownIteration, PhotoUpload, ResolveError, UserRegistry, load_baked_good,
        save_baked_good,
    },
};

/// A journal whose records are in memory.
#[derive(Debug, PartialEq, Eq)]
pub struct Loaded {
    catalog: Catalog,
    config: Config,
    users: UserRegistry,
    blobs: FsBlobStore,
    /// Files under the root that were skipped while loading.
    skipped: Vec<PathBuf>,
}

/// A journal that has not been read yet.
#[derive(Debug, PartialEq, Eq)]
pub struct Unloaded;

/// A filesystem backed baking journal.
#[derive(Debug)]
pub struct Journal<S> {
    layout: Layout,
    state: S,
}

impl<S> Journal<S> {
    /// The journal root.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    /// Where the journal's files live.
    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }
}

impl Journal<Unloaded> {
    /// Opens a journal at the given path.
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self {
            layout: Layout::new(root),
            state: Unloaded,
        }
    }

    /// Load every record from disk.
    ///
    /// # Errors
    ///
    /// Fails if the user registry cannot be read. The behaviour for other
    /// files depends on the configuration. If `allow_unrecognised` is
    /// `true`, files that are not journal records, cannot be parsed, or
    /// belong to a missing baked good are skipped. If it is `false` (the
    /// default), any such file is an error.
    pub fn load_all(self) -> Result<Journal<Loaded>, JournalLoadError> {
        let layout = self.layout;
        let config = load_config(&layout);
        let users = UserRegistry::load(&layout.users_path())?;
        let paths = collect_record_paths(layout.root());

        let (records, mut unrecognised): (Vec<Record>, Vec<PathBuf>) = paths
            .par_iter()
            .partition_map(|path| match try_load_record(path, &layout) {
                Ok(record) => Either::Left(record),
                Err(path) => Either::Right(path),
            });

        let mut baked_goods = Vec::new();
        let mut iterations = Vec::new();
        for record in records {
            match record {
                Record::BakedGood(baked_good, path) => baked_goods.push((baked_good, path)),
                Record::Iteration(iteration, photos, path) => {
                    iterations.push((iteration, photos, path));
                }
            }
        }
        baked_goods.sort_by_key(|(baked_good, _)| (baked_good.created(), baked_good.uuid()));

        let mut catalog = Catalog::with_capacity(baked_goods.len());
        for (baked_good, path) in baked_goods {
            if let Err(e) = catalog.insert_baked_good(baked_good) {
                tracing::debug!("Skipping baked good at {}: {e}", path.display());
                unrecognised.push(path);
            }
        }
        for (iteration, photos, path) in iterations {
            if let Err(e) = catalog.insert_iteration(iteration) {
                tracing::debug!("Skipping iteration at {}: {e}", path.display());
                unrecognised.push(path);
                continue;
            }
            for photo in photos {
                if let Err(e) = catalog.insert_photo(photo) {
                    tracing::warn!("Skipping photo in {}: {e}", path.display());
                }
            }
        }

        unrecognised.sort();
        if !config.allow_unrecognised && !unrecognised.is_empty() {
            return Err(JournalLoadError::UnrecognisedFiles(unrecognised));
        }
        for path in &unrecognised {
            tracing::debug!("Ignored unrecognised file {}", path.display());
        }
        let skipped = unrecognised;

        let blobs = FsBlobStore::new(layout.blobs_dir(), layout.uploads_dir());

        Ok(Journal {
            layout,
            state: Loaded {
                catalog,
                config,
                users,
                blobs,
                skipped,
            },
        })
    }
}

/// Errors from [`Journal::load_all`].
#[derive(Debug, thiserror::Error)]
pub enum JournalLoadError {
    /// Files that are not valid journal records.
    UnrecognisedFiles(Vec<PathBuf>),
    /// The user registry could not be read.
    Users(#[from] LoadError),
}

impl fmt::Display for JournalLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrecognisedFiles(paths) => {
                write!(f, "Unrecognised files: ")?;
                for (i, path) in paths.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", path.display())?;
                }
                Ok(())
            }
            Self::Users(e) => write!(f, "failed to read the user registry: {e}"),
        }
    }
}

fn load_config(layout: &Layout) -> Config {
    let path = layout.config_path();
    Config::load(&path).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    })
}

fn collect_record_paths(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            // Hidden entries include the metadata directory.
            entry.depth() == 0
                || !entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.starts_with('.'))
        })
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            matches!(
                entry.path().extension().and_then(OsStr::to_str),
                Some("md" | "yaml" | "yml")
            )
        })
        .map(walkdir::DirEntry::into_path)
        .collect()
}

enum Record {
    BakedGood(BakedGood, PathBuf),
    Iteration(Iteration, Vec<Photo>, PathBuf),
}

fn try_load_record(path: &Path, layout: &Layout) -> Result<Record, PathBuf> {
    let unrecognised = |reason: &dyn fmt::Display| {
        tracing::debug!("Skipping {}: {reason}", path.display());
        path.to_path_buf()
    };

    match layout.parse_path(path).map_err(|e| unrecognised(&e))? {
        JournalPath::BakedGood(uuid) => {
            let baked_good = load_baked_good(path).map_err(|e| unrecognised(&e))?;
            if baked_good.uuid() != uuid {
                return Err(unrecognised(&"UUID does not match its directory"));
            }
            Ok(Record::BakedGood(baked_good, path.to_path_buf()))
        }
        JournalPath::Iteration {
            baked_good,
            iteration,
        } => {
            let markdown = MarkdownIteration::load(path).map_err(|e| unrecognised(&e))?;
            if markdown.uuid() != iteration || markdown.baked_good() != baked_good {
                return Err(unrecognised(&"UUIDs do not match the file location"));
            }
            let (iteration, photos) = markdown.into_domain().map_err(|e| unrecognised(&e))?;
            Ok(Record::Iteration(iteration, photos, path.to_path_buf()))
        }
    }
}

impl Journal<Loaded> {
    /// The journal configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.state.config
    }

    /// The in-memory index of every record.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.state.catalog
    }

    /// Files that were skipped while loading because they could not be read
    /// as journal records.
    #[must_use]
    pub fn skipped_files(&self) -> &[PathBuf] {
        &self.state.skipped
    }

    /// The store holding photo contents.
    #[must_use]
    pub const fn blob_store(&self) -> &FsBlobStore {
        &self.state.blobs
    }

    /// Looks up a user by UUID.
    #[must_use]
    pub fn user(&self, uuid: Uuid) -> Option<&User> {
        self.state.users.get(uuid)
    }

    /// Looks up a user by external subject.
    #[must_use]
    pub fn user_by_subject(&self, subject: &str) -> Option<&User> {
        self.state.users.by_subject(subject)
    }

    /// Finds or creates the user for an external identity, refreshing the
    /// stored profile from it.
    ///
    /// # Errors
    ///
    /// Fails if a new or changed user cannot be written to the registry.
    pub fn sync_user(&mut self, identity: &Identity) -> Result<(User, SyncOutcome), JournalError> {
        let mut users = self.state.users.clone();
        let (user, outcome) = users.sync(identity);

        if outcome != SyncOutcome::Unchanged {
            users.save(&self.layout.users_path())?;
            self.state.users = users;
        }
        if outcome == SyncOutcome::Created {
            tracing::info!("Registered user {}", user.subject());
        }

        Ok((user, outcome))
    }

    fn owned_baked_good(&self, caller: &User, uuid: Uuid) -> Result<&BakedGood, JournalError> {
        let baked_good = self
            .state
            .catalog
            .baked_good(uuid)
            .ok_or(JournalError::NotFound {
                kind: EntityKind::BakedGood,
                uuid,
            })?;

        if baked_good.is_owned_by(caller) {
            Ok(baked_good)
        } else {
            Err(JournalError::NotOwned {
                kind: EntityKind::BakedGood,
                uuid,
            })
        }
    }

    fn owned_iteration(&self, caller: &User, uuid: Uuid) -> Result<&Iteration, JournalError> {
        let catalog = &self.state.catalog;
        let iteration = catalog.iteration(uuid).ok_or(JournalError::NotFound {
            kind: EntityKind::Iteration,
            uuid,
        })?;

        let owned = catalog
            .baked_good(iteration.baked_good())
            .is_some_and(|baked_good| baked_good.is_owned_by(caller));
        if owned {
            Ok(iteration)
        } else {
            Err(JournalError::NotOwned {
                kind: EntityKind::Iteration,
                uuid,
            })
        }
    }

    fn owned_photo(&self, caller: &User, uuid: Uuid) -> Result<&Photo, JournalError> {
        let photo = self
            .state
            .catalog
            .photo(uuid)
            .ok_or(JournalError::NotFound {
                kind: EntityKind::Photo,
                uuid,
            })?;

        match self.owned_iteration(caller, photo.iteration()) {
            Ok(_) => Ok(photo),
            Err(JournalError::NotOwned { .. }) => Err(JournalError::NotOwned {
                kind: EntityKind::Photo,
                uuid,
            }),
            Err(e) => Err(e),
        }
    }

    /// Resolves a reference to one of the caller's baked goods.
    ///
    /// # Errors
    ///
    /// Fails if the reference matches nothing, matches more than one baked
    /// good, or names a baked good the caller does not own.
    pub fn resolve_baked_good(
        &self,
        caller: &User,
        reference: &str,
    ) -> Result<&BakedGood, JournalError> {
        let uuid = self.state.catalog.resolve_baked_good(caller, reference)?;
        self.owned_baked_good(caller, uuid)
    }

    /// Resolves a reference to one of the caller's iterations.
    ///
    /// # Errors
    ///
    /// Fails if the reference matches nothing, matches more than one
    /// iteration, or names an iteration the caller does not own.
    pub fn resolve_iteration(
        &self,
        caller: &User,
        reference: &str,
    ) -> Result<&Iteration, JournalError> {
        let uuid = self.state.catalog.resolve_iteration(reference)?;
        self.owned_iteration(caller, uuid)
    }

    /// Resolves a reference to one of the caller's photos.
    ///
    /// # Errors
    ///
    /// Fails if the reference matches nothing, matches more than one photo,
    /// or names a photo the caller does not own.
    pub fn resolve_photo(&self, caller: &User, reference: &str) -> Result<&Photo, JournalError> {
        let uuid = self.state.catalog.resolve_photo(reference)?;
        self.owned_photo(caller, uuid)
    }

    /// The caller's baked goods, oldest first, with their summaries.
    #[must_use]
    pub fn baked_goods_of(&self, caller: &User) -> Vec<BakedGoodSummary<'_>> {
        let catalog = &self.state.catalog;
        catalog
            .baked_goods_of(caller)
            .filter_map(|baked_good| catalog.view(baked_good.uuid()))
            .map(|view| view.summary())
            .collect()
    }

    /// The aggregated view of one of the caller's baked goods.
    ///
    /// # Errors
    ///
    /// Fails if the baked good does not exist or is not the caller's.
    pub fn baked_good_view(
        &self,
        caller: &User,
        baked_good: Uuid,
    ) -> Result<BakedGoodView<'_>, JournalError> {
        self.owned_baked_good(caller, baked_good)?;
        self.state
            .catalog
            .view(baked_good)
            .ok_or(JournalError::NotFound {
                kind: EntityKind::BakedGood,
                uuid: baked_good,
            })
    }

    /// One of the caller's iterations with its photos in display order.
    ///
    /// # Errors
    ///
    /// Fails if the iteration does not exist or is not the caller's.
    pub fn iteration_view(
        &self,
        caller: &User,
        iteration: Uuid,
    ) -> Result<IterationView<'_>, JournalError> {
        let found = self.owned_iteration(caller, iteration)?;
        Ok(IterationView::new(
            found,
            self.state.catalog.photos_of(iteration),
        ))
    }

    /// The most recently created baked goods of every user.
    #[must_use]
    pub fn community_feed(&self, limit: usize) -> Vec<CommunityEntry<'_>> {
        feed::community_feed(
            self.state.catalog.baked_goods(),
            |uuid| self.state.users.get(uuid),
            limit,
        )
    }

    /// A URL the photo can be displayed from.
    #[must_use]
    pub fn display_url(&self, photo: &Photo) -> Option<String> {
        self.state.blobs.display_url(photo.handle())
    }

    /// Creates a baked good owned by the caller.
    ///
    /// # Errors
    ///
    /// Fails if the record cannot be written.
    pub fn create_baked_good(
        &mut self,
        caller: &User,
        name: NonBlankString,
        description: Option<String>,
    ) -> Result<BakedGood, JournalError> {
        let baked_good = BakedGood::new(caller, name, description);

        save_baked_good(&self.layout.baked_good_path(baked_good.uuid()), &baked_good)?;
        self.state.catalog.insert_baked_good(baked_good.clone())?;

        tracing::info!("Added baked good: {}", baked_good.name());
        Ok(baked_good)
    }

    /// Applies a patch to one of the caller's baked goods.
    ///
    /// # Errors
    ///
    /// Fails if the baked good is not the caller's or cannot be written.
    pub fn update_baked_good(
        &mut self,
        caller: &User,
        baked_good: Uuid,
        patch: BakedGoodPatch,
    ) -> Result<BakedGood, JournalError> {
        let mut updated = self.owned_baked_good(caller, baked_good)?.clone();
        updated.apply(patch);

        save_baked_good(&self.layout.baked_good_path(baked_good), &updated)?;
        self.state.catalog.replace_baked_good(updated.clone())?;

        tracing::info!("Updated baked good: {}", updated.name());
        Ok(updated)
    }

    /// Deletes one of the caller's baked goods with all its iterations,
    /// photos and blobs.
    ///
    /// The baked good's directory is moved into the trash in one step, so
    /// the journal never holds half a baked good. Blobs and the trash entry
    /// are removed afterwards; anything left behind is picked up by
    /// [`Journal::collect_garbage`].
    ///
    /// # Errors
    ///
    /// Fails if the baked good is not the caller's or cannot be detached.
    pub fn delete_baked_good(
        &mut self,
        caller: &User,
        baked_good: Uuid,
    ) -> Result<DeleteReport, JournalError> {
        self.owned_baked_good(caller, baked_good)?;

        let trash = self.layout.trash_path(baked_good);
        fs::create_dir_all(self.layout.trash_dir())?;
        detach(&self.layout.baked_good_dir(baked_good), &trash)?;

        let removed = self
            .state
            .catalog
            .remove_baked_good(baked_good)
            .ok_or(JournalError::NotFound {
                kind: EntityKind::BakedGood,
                uuid: baked_good,
            })?;

        let left_for_gc = self.finish_cascade(&trash, removed.photos.iter().map(Photo::handle));

        tracing::info!("Deleted baked good: {}", removed.baked_good.name());
        Ok(DeleteReport {
            iterations: removed.iterations.len(),
            photos: removed.photos.len(),
            left_for_gc,
        })
    }

    /// Removes detached files and blobs, returning how many could not be
    /// removed.
    fn finish_cascade<'a>(
        &self,
        trash: &Path,
        handles: impl IntoIterator<Item = &'a BlobHandle>,
    ) -> usize {
        let mut failures = 0;
        for handle in handles {
            if let Err(e) = self.state.blobs.delete(handle) {
                tracing::warn!("Failed to delete blob {handle}: {e}");
                failures += 1;
            }
        }
        if let Err(e) = purge(trash) {
            tracing::warn!("Failed to empty trash entry {}: {e}", trash.display());
            failures += 1;
        }
        failures
    }

    fn check_difficulty(&self, difficulty: &Difficulty) -> Result<(), ValidationError> {
        let config = &self.state.config;
        if config.is_difficulty_allowed(difficulty) {
            Ok(())
        } else {
            Err(ValidationError::Difficulty {
                difficulty: difficulty.to_string(),
                allowed: config.allowed_difficulties().join(", "),
            })
        }
    }

    fn save_iteration(&self, iteration: &Iteration, photos: &[Photo]) -> Result<(), JournalError> {
        let path = self
            .layout
            .iteration_path(iteration.baked_good(), iteration.uuid());
        MarkdownIteration::new(iteration, photos).save(&path)?;
        Ok(())
    }

    /// Records a new iteration of one of the caller's baked goods.
    ///
    /// # Errors
    ///
    /// Fails if the baked good is not the caller's, the difficulty is not
    /// allowed, or the record cannot be written.
    pub fn create_iteration(
        &mut self,
        caller: &User,
        baked_good: Uuid,
        fields: NewIteration,
    ) -> Result<Iteration, JournalError> {
        self.owned_baked_good(caller, baked_good)?;
        self.check_difficulty(&fields.difficulty)?;

        let iteration = Iteration::new(baked_good, fields);
        self.save_iteration(&iteration, &[])?;
        self.state.catalog.insert_iteration(iteration.clone())?;

        tracing::info!("Added iteration {}", iteration.uuid());
        Ok(iteration)
    }

    /// Applies a patch to one of the caller's iterations.
    ///
    /// # Errors
    ///
    /// Fails if the iteration is not the caller's, a new difficulty is not
    /// allowed, or the record cannot be written.
    pub fn update_iteration(
        &mut self,
        caller: &User,
        iteration: Uuid,
        patch: IterationPatch,
    ) -> Result<Iteration, JournalError> {
        let mut updated = self.owned_iteration(caller, iteration)?.clone();
        if let Some(difficulty) = &patch.difficulty {
            self.check_difficulty(difficulty)?;
        }
        updated.apply(patch);

        self.save_iteration(&updated, self.state.catalog.photos_of(iteration))?;
        self.state.catalog.replace_iteration(updated.clone())?;

        tracing::info!("Updated iteration {iteration}");
        Ok(updated)
    }

    /// Starts a new iteration from one of the caller's iterations, dated
    /// `today`.
    ///
    /// Recipe, difficulty, time and source carry over; rating, notes and
    /// photos do not.
    ///
    /// # Errors
    ///
    /// Fails if the iteration is not the caller's or the copy cannot be
    /// written.
    pub fn duplicate_iteration(
        &mut self,
        caller: &User,
        iteration: Uuid,
        today: NaiveDate,
    ) -> Result<Iteration, JournalError> {
        let copy = self.owned_iteration(caller, iteration)?.duplicate(today);

        self.save_iteration(&copy, &[])?;
        self.state.catalog.insert_iteration(copy.clone())?;

        tracing::info!("Duplicated iteration {iteration} as {}", copy.uuid());
        Ok(copy)
    }

    /// Deletes one of the caller's iterations with its photos and blobs.
    ///
    /// # Errors
    ///
    /// Fails if the iteration is not the caller's or cannot be detached.
    pub fn delete_iteration(
        &mut self,
        caller: &User,
        iteration: Uuid,
    ) -> Result<DeleteReport, JournalError> {
        let baked_good = self.owned_iteration(caller, iteration)?.baked_good();

        let trash = self.layout.trash_path(iteration);
        fs::create_dir_all(self.layout.trash_dir())?;
        detach(&self.layout.iteration_path(baked_good, iteration), &trash)?;

        let (_, photos) =
            self.state
                .catalog
                .remove_iteration(iteration)
                .ok_or(JournalError::NotFound {
                    kind: EntityKind::Iteration,
                    uuid: iteration,
                })?;

        let left_for_gc = self.finish_cascade(&trash, photos.iter().map(Photo::handle));

        tracing::info!("Deleted iteration {iteration}");
        Ok(DeleteReport {
            iterations: 1,
            photos: photos.len(),
            left_for_gc,
        })
    }

    /// Attaches a stored blob to one of the caller's iterations.
    ///
    /// Without an explicit `order` the photo goes after the existing ones.
    ///
    /// # Errors
    ///
    /// Fails if the iteration is not the caller's, `order` is already used
    /// by one of its photos, or the record cannot be written.
    pub fn add_photo(
        &mut self,
        caller: &User,
        iteration: Uuid,
        handle: BlobHandle,
        order: Option<i64>,
    ) -> Result<Photo, JournalError> {
        let found = self.owned_iteration(caller, iteration)?;
        let existing = self.state.catalog.photos_of(iteration);

        let order = match order {
            Some(order) if existing.iter().any(|photo| photo.order() == order) => {
                return Err(ValidationError::PhotoOrder(order).into());
            }
            Some(order) => order,
            None => next_order(existing),
        };

        let photo = Photo::new(iteration, handle, order);
        let mut photos = existing.to_vec();
        photos.push(photo.clone());
        self.save_iteration(found, &photos)?;
        self.state.catalog.insert_photo(photo.clone())?;

        tracing::info!("Added photo {} to iteration {iteration}", photo.uuid());
        Ok(photo)
    }

    /// Removes one of the caller's photos and its blob.
    ///
    /// # Errors
    ///
    /// Fails if the photo is not the caller's or the iteration record cannot
    /// be written.
    pub fn delete_photo(&mut self, caller: &User, photo: Uuid) -> Result<Photo, JournalError> {
        let iteration_uuid = self.owned_photo(caller, photo)?.iteration();
        let iteration = self
            .state
            .catalog
            .iteration(iteration_uuid)
            .ok_or(JournalError::NotFound {
                kind: EntityKind::Iteration,
                uuid: iteration_uuid,
            })?;

        let remaining: Vec<Photo> = self
            .state
            .catalog
            .photos_of(iteration_uuid)
            .iter()
            .filter(|other| other.uuid() != photo)
            .cloned()
            .collect();
        self.save_iteration(iteration, &remaining)?;

        let removed = self
            .state
            .catalog
            .remove_photo(photo)
            .ok_or(JournalError::NotFound {
                kind: EntityKind::Photo,
                uuid: photo,
            })?;
        if let Err(e) = self.state.blobs.delete(removed.handle()) {
            tracing::warn!("Failed to delete blob {}: {e}", removed.handle());
        }

        tracing::info!("Deleted photo {photo}");
        Ok(removed)
    }

    /// Runs one upload against one of the caller's iterations.
    ///
    /// Failures are recorded in the returned upload rather than returned as
    /// errors.
    #[must_use]
    pub fn upload_photo(
        &mut self,
        caller: &User,
        iteration: Uuid,
        upload: PhotoUpload,
    ) -> PhotoUpload {
        let blobs = self.state.blobs.clone();
        upload.run(&blobs, |handle| {
            self.add_photo(caller, iteration, handle, None)
        })
    }

    /// Uploads local files as photos of one of the caller's iterations.
    ///
    /// Every file is attempted; a failed upload does not stop the rest.
    ///
    /// # Errors
    ///
    /// Fails up front if the iteration is not the caller's.
    pub fn upload_photos(
        &mut self,
        caller: &User,
        iteration: Uuid,
        sources: impl IntoIterator<Item = PathBuf>,
    ) -> Result<Vec<PhotoUpload>, JournalError> {
        self.owned_iteration(caller, iteration)?;

        Ok(sources
            .into_iter()
            .map(|source| self.upload_photo(caller, iteration, PhotoUpload::new(source)))
            .collect())
    }

    /// Finishes interrupted deletes and removes blobs that no photo
    /// references, along with abandoned upload tickets.
    ///
    /// # Errors
    ///
    /// This method does *not* fail fast. It attempts every removal and then
    /// reports all the failures together.
    pub fn collect_garbage(&self) -> Result<GcReport, GcError> {
        let mut report = GcReport::default();
        let mut failures = Vec::new();

        let trash_dir = self.layout.trash_dir();
        match list_entries(&trash_dir) {
            Ok(entries) => {
                for entry in entries {
                    match purge(&entry) {
                        Ok(()) => report.trash_entries += 1,
                        Err(e) => failures.push((entry, e)),
                    }
                }
            }
            Err(e) => failures.push((trash_dir, e)),
        }

        let blobs = &self.state.blobs;
        match blobs.pending_uploads() {
            Ok(tickets) => {
                for ticket in tickets {
                    match fs::remove_file(&ticket) {
                        Ok(()) => report.abandoned_uploads += 1,
                        Err(e) => failures.push((ticket, e)),
                    }
                }
            }
            Err(e) => failures.push((self.layout.uploads_dir(), e)),
        }

        if !self.state.skipped.is_empty() {
            tracing::warn!(
                "Not removing unused blobs: {} file(s) were skipped while loading and may reference them",
                self.state.skipped.len()
            );
            report.blob_sweep_skipped = true;
            return finish_gc(report, failures);
        }

        let referenced: HashSet<&BlobHandle> = self.state.catalog.referenced_handles();
        match blobs.handles() {
            Ok(handles) => {
                for handle in handles.iter().filter(|h| !referenced.contains(h)) {
                    match blobs.delete(handle) {
                        Ok(()) => report.orphaned_blobs += 1,
                        Err(e) => failures.push((
                            blobs
                                .path(handle)
                                .unwrap_or_else(|| self.layout.blobs_dir().join(handle.as_str())),
                            e,
                        )),
                    }
                }
            }
            Err(e) => failures.push((self.layout.blobs_dir(), e)),
        }

        finish_gc(report, failures)
    }
}

fn finish_gc(report: GcReport, failures: Vec<(PathBuf, io::Error)>) -> Result<GcReport, GcError> {
    match NonEmpty::from_vec(failures) {
        Some(failures) => Err(GcError { failures }),
        None => {
            tracing::info!("{report}");
            Ok(report)
        }
    }
}

fn detach(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

fn purge(path: &Path) -> io::Result<()> {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

fn list_entries(dir: &Path) -> io::Result<Vec<PathBuf>> {
    match fs::read_dir(dir) {
        Ok(entries) => entries.map(|entry| entry.map(|e| e.path())).collect(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

/// What a cascading delete removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteReport {
    /// Iterations removed.
    pub iterations: usize,
    /// Photos removed.
    pub photos: usize,
    /// Blobs or trash entries that could not be removed yet.
    pub left_for_gc: usize,
}

/// What [`Journal::collect_garbage`] removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GcReport {
    /// Leftovers of interrupted deletes.
    pub trash_entries: usize,
    /// Upload tickets that were never completed.
    pub abandoned_uploads: usize,
    /// Blobs no photo referenced.
    pub orphaned_blobs: usize,
    /// Unused blobs were left alone because some files could not be loaded.
    pub blob_sweep_skipped: bool,
}

impl fmt::Display for GcReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "removed {} trash entries, {} abandoned uploads and {} orphaned blobs",
            self.trash_entries, self.abandoned_uploads, self.orphaned_blobs
        )?;
        if self.blob_sweep_skipped {
            f.write_str(" (unused blobs kept: some files were skipped while loading)")?;
        }
        Ok(())
    }
}

/// Input that breaks a journal rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required text field is blank.
    #[error(transparent)]
    Blank(#[from] BlankStringError),
    /// A rating is outside 1 to 5.
    #[error(transparent)]
    Rating(#[from] InvalidRatingError),
    /// The difficulty is not in the configured list.
    #[error("difficulty '{difficulty}' is not allowed (expected one of: {allowed})")]
    Difficulty {
        /// The rejected label.
        difficulty: String,
        /// The configured labels.
        allowed: String,
    },
    /// Another photo of the iteration already has this order.
    #[error("photo order {0} is already taken on this iteration")]
    PhotoOrder(i64),
}

/// Errors from journal operations.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    /// The input was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A reference did not pick out exactly one entity.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    /// The entity does not exist.
    #[error("{kind} {uuid} not found")]
    NotFound {
        /// What was looked for.
        kind: EntityKind,
        /// Its UUID.
        uuid: Uuid,
    },
    /// The caller does not own the entity.
    #[error("{kind} {uuid} belongs to another baker")]
    NotOwned {
        /// What was accessed.
        kind: EntityKind,
        /// Its UUID.
        uuid: Uuid,
    },
    /// The catalog rejected a record.
    #[error(transparent)]
    Conflict(#[from] CatalogError),
    /// A record could not be written.
    #[error("failed to write journal record: {0}")]
    Record(#[from] LoadError),
    /// A file operation failed.
    #[error("failed to update journal: {0}")]
    Io(#[from] io::Error),
}

/// Failures from [`Journal::collect_garbage`].
#[derive(Debug, thiserror::Error)]
pub struct GcError {
    failures: NonEmpty<(PathBuf, io::Error)>,
}

impl GcError {
    /// Every path that could not be removed, with the reason.
    #[must_use]
    pub const fn failures(&self) -> &NonEmpty<(PathBuf, io::Error)> {
        &self.failures
    }
}

impl fmt::Display for GcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MAX_DISPLAY: usize = 5;

        write!(f, "failed to collect garbage: ")?;

        let total = self.failures.len();

        let displayed_paths: Vec<String> = self
            .failures
            .iter()
            .take(MAX_DISPLAY)
            .map(|(p, _e)| p.display().to_string())
            .collect();

        let msg = displayed_paths.join(", ");

        if total <= MAX_DISPLAY {
            write!(f, "{msg}")
        } else {
            write!(f, "{msg}... (and {} more)", total - MAX_DISPLAY)
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::domain::{Rating, SortOption};

    struct Fixture {
        tmp: TempDir,
        journal: Journal<Loaded>,
        ada: User,
        grace: User,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = TempDir::new().expect("failed to create temp dir");
            let mut journal = Journal::new(tmp.path().to_path_buf()).load_all().unwrap();
            let (ada, _) = journal.sync_user(&Identity::new("ada")).unwrap();
            let (grace, _) = journal.sync_user(&Identity::new("grace")).unwrap();
            Self {
                tmp,
                journal,
                ada,
                grace,
            }
        }

        fn reload(&self) -> Journal<Loaded> {
            Journal::new(self.tmp.path().to_path_buf())
                .load_all()
                .unwrap()
        }

        fn good(&mut self, name: &str) -> BakedGood {
            self.journal
                .create_baked_good(&self.ada, NonBlankString::new(name).unwrap(), None)
                .unwrap()
        }

        fn bake(&mut self, baked_good: &BakedGood, day: u32, rating: Option<u8>) -> Iteration {
            self.journal
                .create_iteration(&self.ada, baked_good.uuid(), fields(day, rating))
                .unwrap()
        }

        fn photo_file(&self, name: &str) -> PathBuf {
            let path = self.tmp.path().join(".fixtures").join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, name).unwrap();
            path
        }
    }

    fn fields(day: u32, rating: Option<u8>) -> NewIteration {
        NewIteration {
            recipe: NonBlankString::new("flour, water, salt").unwrap(),
            difficulty: Difficulty::Medium,
            total_minutes: 240,
            bake_date: NaiveDate::from_ymd_opt(2024, 2, day).unwrap(),
            rating: rating.map(|r| Rating::new(r).unwrap()),
            notes: Some("good oven spring".to_string()),
            source_url: Some("https://example.com/loaf".to_string()),
        }
    }

    #[test]
    fn records_survive_a_reload() {
        let mut fx = Fixture::new();
        let good = fx.good("Sourdough");
        let iteration = fx.bake(&good, 3, Some(4));
        let photo_path = fx.photo_file("crumb.jpg");
        let uploads = fx
            .journal
            .upload_photos(&fx.ada, iteration.uuid(), [photo_path])
            .unwrap();
        let photo = uploads[0].photo().unwrap().clone();

        let reloaded = fx.reload();

        let catalog = reloaded.catalog();
        assert_eq!(catalog.baked_good(good.uuid()), Some(&good));
        assert_eq!(catalog.iteration(iteration.uuid()), Some(&iteration));
        assert_eq!(catalog.photos_of(iteration.uuid()), &[photo]);
        assert_eq!(reloaded.user(fx.ada.uuid()), Some(&fx.ada));
    }

    #[test]
    fn sync_user_is_idempotent() {
        let mut fx = Fixture::new();
        let (again, outcome) = fx.journal.sync_user(&Identity::new("ada")).unwrap();

        assert_eq!(outcome, SyncOutcome::Unchanged);
        assert_eq!(again.uuid(), fx.ada.uuid());
    }

    #[test]
    fn other_bakers_cannot_touch_your_bakes() {
        let mut fx = Fixture::new();
        let good = fx.good("Focaccia");
        let iteration = fx.bake(&good, 1, None);
        let grace = fx.grace.clone();

        let rename = BakedGoodPatch {
            name: Some(NonBlankString::new("Mine now").unwrap()),
            description: None,
        };
        assert!(matches!(
            fx.journal.update_baked_good(&grace, good.uuid(), rename),
            Err(JournalError::NotOwned { .. })
        ));
        assert!(matches!(
            fx.journal
                .create_iteration(&grace, good.uuid(), fields(2, None)),
            Err(JournalError::NotOwned { .. })
        ));
        assert!(matches!(
            fx.journal.delete_iteration(&grace, iteration.uuid()),
            Err(JournalError::NotOwned { .. })
        ));
        assert!(matches!(
            fx.journal.baked_good_view(&grace, good.uuid()),
            Err(JournalError::NotOwned { .. })
        ));
        assert!(matches!(
            fx.journal
                .resolve_baked_good(&grace, &good.uuid().to_string()),
            Err(JournalError::NotOwned { .. })
        ));
        assert!(fx.journal.baked_goods_of(&grace).is_empty());
    }

    #[test]
    fn missing_entities_are_not_found() {
        let mut fx = Fixture::new();
        let ada = fx.ada.clone();

        assert!(matches!(
            fx.journal.delete_baked_good(&ada, Uuid::new_v4()),
            Err(JournalError::NotFound {
                kind: EntityKind::BakedGood,
                ..
            })
        ));
        assert!(matches!(
            fx.journal.resolve_iteration(&ada, "0123"),
            Err(JournalError::Resolve(ResolveError::NotFound { .. }))
        ));
    }

    #[test]
    fn update_baked_good_persists() {
        let mut fx = Fixture::new();
        let good = fx.good("Rye");
        let ada = fx.ada.clone();

        let updated = fx
            .journal
            .update_baked_good(
                &ada,
                good.uuid(),
                BakedGoodPatch {
                    name: None,
                    description: Some("Dark and dense".to_string()),
                },
            )
            .unwrap();

        assert_eq!(updated.name(), "Rye");
        assert_eq!(
            fx.reload()
                .catalog()
                .baked_good(good.uuid())
                .and_then(BakedGood::description),
            Some("Dark and dense")
        );
    }

    #[test]
    fn disallowed_difficulty_is_rejected() {
        let mut fx = Fixture::new();
        let good = fx.good("Croissant");
        let ada = fx.ada.clone();
        let mut new = fields(1, None);
        new.difficulty = Difficulty::Other("Heroic".to_string());

        let result = fx.journal.create_iteration(&ada, good.uuid(), new);

        assert!(matches!(
            result,
            Err(JournalError::Validation(ValidationError::Difficulty { .. }))
        ));
        assert!(fx.journal.catalog().iterations_of(good.uuid()).is_empty());
    }

    #[test]
    fn update_iteration_keeps_photos() {
        let mut fx = Fixture::new();
        let good = fx.good("Baguette");
        let iteration = fx.bake(&good, 1, None);
        let ada = fx.ada.clone();
        fx.journal
            .add_photo(&ada, iteration.uuid(), BlobHandle::new("x"), None)
            .unwrap();

        let updated = fx
            .journal
            .update_iteration(
                &ada,
                iteration.uuid(),
                IterationPatch {
                    rating: Some(Rating::new(5).unwrap()),
                    notes: Some(String::new()),
                    ..IterationPatch::default()
                },
            )
            .unwrap();

        assert_eq!(updated.rating(), Rating::new(5).ok());
        assert_eq!(updated.notes(), None);
        let reloaded = fx.reload();
        assert_eq!(reloaded.catalog().photos_of(iteration.uuid()).len(), 1);
        assert_eq!(
            reloaded.catalog().iteration(iteration.uuid()),
            Some(&updated)
        );
    }

    #[test]
    fn duplicate_starts_a_fresh_iteration() {
        let mut fx = Fixture::new();
        let good = fx.good("Brioche");
        let original = fx.bake(&good, 1, Some(3));
        let ada = fx.ada.clone();
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let copy = fx
            .journal
            .duplicate_iteration(&ada, original.uuid(), today)
            .unwrap();

        assert_ne!(copy.uuid(), original.uuid());
        assert_eq!(copy.recipe(), original.recipe());
        assert_eq!(copy.source_url(), original.source_url());
        assert_eq!(copy.bake_date(), today);
        assert_eq!(copy.rating(), None);
        assert_eq!(copy.notes(), None);
        assert_eq!(fx.journal.catalog().iterations_of(good.uuid()).len(), 2);
    }

    #[test]
    fn photo_order_defaults_to_the_end_and_rejects_collisions() {
        let mut fx = Fixture::new();
        let good = fx.good("Pretzel");
        let iteration = fx.bake(&good, 1, None);
        let ada = fx.ada.clone();

        let first = fx
            .journal
            .add_photo(&ada, iteration.uuid(), BlobHandle::new("a"), None)
            .unwrap();
        let explicit = fx
            .journal
            .add_photo(&ada, iteration.uuid(), BlobHandle::new("b"), Some(7))
            .unwrap();
        let next = fx
            .journal
            .add_photo(&ada, iteration.uuid(), BlobHandle::new("c"), None)
            .unwrap();

        assert_eq!(first.order(), 0);
        assert_eq!(explicit.order(), 7);
        assert_eq!(next.order(), 8);
        assert!(matches!(
            fx.journal
                .add_photo(&ada, iteration.uuid(), BlobHandle::new("d"), Some(7)),
            Err(JournalError::Validation(ValidationError::PhotoOrder(7)))
        ));
    }

    #[test]
    fn upload_batch_continues_past_a_failure() {
        let mut fx = Fixture::new();
        let good = fx.good("Bagel");
        let iteration = fx.bake(&good, 1, None);
        let ada = fx.ada.clone();
        let sources = vec![
            fx.photo_file("one.jpg"),
            fx.tmp.path().join("missing.jpg"),
            fx.photo_file("three.jpg"),
        ];

        let uploads = fx
            .journal
            .upload_photos(&ada, iteration.uuid(), sources)
            .unwrap();

        let registered: Vec<bool> = uploads.iter().map(|u| u.photo().is_some()).collect();
        assert_eq!(registered, vec![true, false, true]);
        assert!(uploads[1].failure().is_some());

        let view = fx.journal.iteration_view(&ada, iteration.uuid()).unwrap();
        let orders: Vec<i64> = view.photos.iter().map(|p| p.order()).collect();
        assert_eq!(orders, vec![0, 1]);
        assert_eq!(fx.journal.blob_store().handles().unwrap().len(), 2);
    }

    #[test]
    fn uploads_to_someone_elses_iteration_are_refused() {
        let mut fx = Fixture::new();
        let good = fx.good("Bagel");
        let iteration = fx.bake(&good, 1, None);
        let grace = fx.grace.clone();
        let source = fx.photo_file("one.jpg");

        let result = fx
            .journal
            .upload_photos(&grace, iteration.uuid(), [source]);

        assert!(matches!(result, Err(JournalError::NotOwned { .. })));
        assert!(fx.journal.blob_store().handles().unwrap().is_empty());
    }

    #[test]
    fn delete_baked_good_cascades_to_files_and_blobs() {
        let mut fx = Fixture::new();
        let good = fx.good("Challah");
        let keep = fx.good("Keep");
        let first = fx.bake(&good, 1, None);
        fx.bake(&good, 2, None);
        let ada = fx.ada.clone();
        let source = fx.photo_file("braid.jpg");
        fx.journal
            .upload_photos(&ada, first.uuid(), [source])
            .unwrap();

        let report = fx.journal.delete_baked_good(&ada, good.uuid()).unwrap();

        assert_eq!(
            report,
            DeleteReport {
                iterations: 2,
                photos: 1,
                left_for_gc: 0
            }
        );
        assert!(!fx.journal.layout().baked_good_dir(good.uuid()).exists());
        assert!(!fx.journal.layout().trash_path(good.uuid()).exists());
        assert!(fx.journal.blob_store().handles().unwrap().is_empty());

        let reloaded = fx.reload();
        assert!(reloaded.catalog().baked_good(good.uuid()).is_none());
        assert!(reloaded.catalog().iteration(first.uuid()).is_none());
        assert!(reloaded.catalog().baked_good(keep.uuid()).is_some());
    }

    #[test]
    fn delete_iteration_removes_file_and_blobs() {
        let mut fx = Fixture::new();
        let good = fx.good("Scone");
        let doomed = fx.bake(&good, 1, None);
        let kept = fx.bake(&good, 2, None);
        let ada = fx.ada.clone();
        let source = fx.photo_file("scone.jpg");
        fx.journal
            .upload_photos(&ada, doomed.uuid(), [source])
            .unwrap();

        let report = fx.journal.delete_iteration(&ada, doomed.uuid()).unwrap();

        assert_eq!(report.photos, 1);
        assert!(
            !fx.journal
                .layout()
                .iteration_path(good.uuid(), doomed.uuid())
                .exists()
        );
        assert!(fx.journal.blob_store().handles().unwrap().is_empty());
        let remaining: Vec<Uuid> = fx
            .journal
            .catalog()
            .iterations_of(good.uuid())
            .iter()
            .map(Iteration::uuid)
            .collect();
        assert_eq!(remaining, vec![kept.uuid()]);
    }

    #[test]
    fn delete_photo_removes_record_and_blob() {
        let mut fx = Fixture::new();
        let good = fx.good("Pita");
        let iteration = fx.bake(&good, 1, None);
        let ada = fx.ada.clone();
        let sources = [fx.photo_file("a.jpg"), fx.photo_file("b.jpg")];
        let uploads = fx
            .journal
            .upload_photos(&ada, iteration.uuid(), sources)
            .unwrap();
        let cover = uploads[0].photo().unwrap().clone();

        fx.journal.delete_photo(&ada, cover.uuid()).unwrap();

        let reloaded = fx.reload();
        let photos = reloaded.catalog().photos_of(iteration.uuid());
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].order(), 1);
        assert_eq!(fx.journal.blob_store().handles().unwrap().len(), 1);
    }

    #[test]
    fn garbage_collection_finishes_interrupted_work() {
        let mut fx = Fixture::new();
        let good = fx.good("Bun");
        let iteration = fx.bake(&good, 1, None);
        let ada = fx.ada.clone();
        let source = fx.photo_file("bun.jpg");
        let uploads = fx
            .journal
            .upload_photos(&ada, iteration.uuid(), [source])
            .unwrap();
        let kept = uploads[0].photo().unwrap().handle().clone();

        let store = fx.journal.blob_store();
        let orphan = store.begin_upload().unwrap();
        store.complete_upload(orphan, b"orphan").unwrap();
        store.begin_upload().unwrap();
        let stale = fx.journal.layout().trash_path(Uuid::new_v4());
        fs::create_dir_all(&stale).unwrap();
        fs::write(stale.join("left.md"), "x").unwrap();

        let report = fx.journal.collect_garbage().unwrap();

        assert_eq!(
            report,
            GcReport {
                trash_entries: 1,
                abandoned_uploads: 1,
                orphaned_blobs: 1,
                blob_sweep_skipped: false,
            }
        );
        assert_eq!(fx.journal.blob_store().handles().unwrap(), vec![kept]);
        assert!(!stale.exists());
    }

    #[test]
    fn views_and_summaries() {
        let mut fx = Fixture::new();
        let good = fx.good("Loaf");
        fx.bake(&good, 1, Some(3));
        fx.bake(&good, 2, Some(5));
        fx.bake(&good, 3, None);
        let ada = fx.ada.clone();

        let view = fx.journal.baked_good_view(&ada, good.uuid()).unwrap();
        assert_eq!(view.stats.iteration_count, 3);
        assert!(view.stats.avg_rating.is_some_and(|avg| (avg - 4.0).abs() < 1e-9));
        let ratings: Vec<Option<u8>> = view
            .sorted(SortOption::RatingDesc)
            .iter()
            .map(|i| i.iteration.rating().map(Rating::get))
            .collect();
        assert_eq!(ratings, vec![Some(5), Some(3), None]);

        let summaries = fx.journal.baked_goods_of(&ada);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].iteration_count, 3);
    }

    #[test]
    fn community_feed_names_authors() {
        let mut fx = Fixture::new();
        fx.good("Ada's loaf");
        let grace = fx.grace.clone();
        fx.journal
            .create_baked_good(&grace, NonBlankString::new("Grace's tart").unwrap(), None)
            .unwrap();

        fx.journal
            .sync_user(&Identity {
                name: Some("Grace".to_string()),
                ..Identity::new("grace")
            })
            .unwrap();

        let feed = fx.journal.community_feed(12);

        assert_eq!(feed.len(), 2);
        for entry in feed {
            let expected = if entry.baked_good.name() == "Grace's tart" {
                "Grace"
            } else {
                crate::domain::UNKNOWN_BAKER
            };
            assert_eq!(entry.author_name, expected);
        }
    }

    #[test]
    fn unrecognised_files_fail_the_load_unless_allowed() {
        let fx = Fixture::new();
        let stray = fx.tmp.path().join("notes.md");
        fs::write(&stray, "# shopping list").unwrap();

        let error = Journal::new(fx.tmp.path().to_path_buf())
            .load_all()
            .unwrap_err();
        let JournalLoadError::UnrecognisedFiles(paths) = error else {
            panic!("expected unrecognised files");
        };
        assert_eq!(paths, vec![stray]);

        let layout = fx.journal.layout();
        fs::create_dir_all(layout.meta_dir()).unwrap();
        let mut config = Config::default();
        config.allow_unrecognised = true;
        config.save(&layout.config_path()).unwrap();

        assert!(
            Journal::new(fx.tmp.path().to_path_buf())
                .load_all()
                .is_ok()
        );
    }

    #[test]
    fn orphaned_iterations_are_unrecognised() {
        let mut fx = Fixture::new();
        let good = fx.good("Gone");
        let iteration = fx.bake(&good, 1, None);
        fs::remove_file(fx.journal.layout().baked_good_path(good.uuid())).unwrap();

        let error = Journal::new(fx.tmp.path().to_path_buf())
            .load_all()
            .unwrap_err();

        let JournalLoadError::UnrecognisedFiles(paths) = error else {
            panic!("expected unrecognised files");
        };
        assert_eq!(
            paths,
            vec![
                fx.journal
                    .layout()
                    .iteration_path(good.uuid(), iteration.uuid())
            ]
        );
    }

    fn allow_unrecognised(fx: &Fixture) {
        let layout = fx.journal.layout();
        fs::create_dir_all(layout.meta_dir()).unwrap();
        let mut config = Config::default();
        config.allow_unrecognised = true;
        config.save(&layout.config_path()).unwrap();
    }

    #[test]
    fn garbage_collection_keeps_blobs_of_skipped_files() {
        let mut fx = Fixture::new();
        let good = fx.good("Rye");
        let iteration = fx.bake(&good, 1, None);
        let ada = fx.ada.clone();
        let source = fx.photo_file("rye.jpg");
        let uploads = fx
            .journal
            .upload_photos(&ada, iteration.uuid(), [source])
            .unwrap();
        let handle = uploads[0].photo().unwrap().handle().clone();

        allow_unrecognised(&fx);
        let path = fx
            .journal
            .layout()
            .iteration_path(good.uuid(), iteration.uuid());
        let contents = fs::read_to_string(&path).unwrap();
        fs::write(&path, contents.replacen("---", "--", 1)).unwrap();

        let reloaded = fx.reload();
        assert_eq!(reloaded.skipped_files(), &[path]);
        assert!(reloaded.catalog().iteration(iteration.uuid()).is_none());

        let report = reloaded.collect_garbage().unwrap();

        assert!(report.blob_sweep_skipped);
        assert_eq!(report.orphaned_blobs, 0);
        assert_eq!(reloaded.blob_store().handles().unwrap(), vec![handle]);
    }

    #[test]
    fn colliding_photo_orders_are_skipped_on_load() {
        let mut fx = Fixture::new();
        let good = fx.good("Focaccia");
        let iteration = fx.bake(&good, 1, None);
        let ada = fx.ada.clone();
        let sources = [fx.photo_file("a.jpg"), fx.photo_file("b.jpg")];
        let uploads = fx
            .journal
            .upload_photos(&ada, iteration.uuid(), sources)
            .unwrap();
        let first = uploads[0].photo().unwrap().clone();
        assert_eq!(uploads[1].photo().unwrap().order(), 1);

        let path = fx
            .journal
            .layout()
            .iteration_path(good.uuid(), iteration.uuid());
        let contents = fs::read_to_string(&path).unwrap();
        fs::write(&path, contents.replace("order: 1", "order: 0")).unwrap();

        let reloaded = fx.reload();

        assert_eq!(reloaded.catalog().photos_of(iteration.uuid()), &[first]);
        assert!(reloaded.skipped_files().is_empty());
    }
}
