use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use crate::{
    domain::{BlobHandle, Photo},
    storage::{BlobStore, UploadTicket},
};

/// Where a single photo upload has got to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadState {
    /// Not started.
    Pending,
    /// A ticket has been issued; the contents are not stored yet.
    Uploading(UploadTicket),
    /// Stored and recorded against its iteration.
    Registered(Photo),
    /// Gave up, with the reason.
    Failed(String),
}

/// One photo being uploaded from a local file.
///
/// An upload moves `Pending -> Uploading -> Registered`, or to `Failed` from
/// any step. A blob that was stored but could not be registered is deleted
/// again before the upload is marked failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    source: PathBuf,
    state: UploadState,
}

impl PhotoUpload {
    /// A pending upload of the file at `source`.
    #[must_use]
    pub const fn new(source: PathBuf) -> Self {
        Self {
            source,
            state: UploadState::Pending,
        }
    }

    /// The file being uploaded.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The current state.
    #[must_use]
    pub const fn state(&self) -> &UploadState {
        &self.state
    }

    /// The registered photo, once the upload has succeeded.
    #[must_use]
    pub const fn photo(&self) -> Option<&Photo> {
        match &self.state {
            UploadState::Registered(photo) => Some(photo),
            _ => None,
        }
    }

    /// Why the upload failed, if it did.
    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        match &self.state {
            UploadState::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    fn fail(mut self, reason: impl fmt::Display) -> Self {
        let reason = reason.to_string();
        tracing::warn!("Upload of {} failed: {reason}", self.source.display());
        self.state = UploadState::Failed(reason);
        self
    }

    /// Asks the store for an upload ticket.
    ///
    /// Only a pending upload can begin; any other upload is returned as is.
    #[must_use]
    pub fn begin<B: BlobStore + ?Sized>(self, store: &B) -> Self {
        if self.state != UploadState::Pending {
            return self;
        }
        match store.begin_upload() {
            Ok(ticket) => Self {
                state: UploadState::Uploading(ticket),
                ..self
            },
            Err(e) => self.fail(e),
        }
    }

    /// Stores the file contents and records the photo with `register`.
    ///
    /// Only an upload holding a ticket can finish; any other upload is
    /// returned as is.
    #[must_use]
    pub fn finish<B, F, E>(self, store: &B, register: F) -> Self
    where
        B: BlobStore + ?Sized,
        F: FnOnce(BlobHandle) -> Result<Photo, E>,
        E: fmt::Display,
    {
        let UploadState::Uploading(ticket) = &self.state else {
            return self;
        };
        let ticket = ticket.clone();

        let bytes = match fs::read(&self.source) {
            Ok(bytes) => bytes,
            Err(e) => {
                if let Err(abandon) = store.abandon_upload(ticket) {
                    tracing::debug!("Failed to abandon upload ticket: {abandon}");
                }
                return self.fail(e);
            }
        };

        let handle = match store.complete_upload(ticket, &bytes) {
            Ok(handle) => handle,
            Err(e) => return self.fail(e),
        };

        match register(handle.clone()) {
            Ok(photo) => Self {
                state: UploadState::Registered(photo),
                ..self
            },
            Err(e) => {
                if let Err(delete) = store.delete(&handle) {
                    tracing::warn!("Failed to delete unregistered blob {handle}: {delete}");
                }
                self.fail(e)
            }
        }
    }

    /// Runs the upload to completion.
    #[must_use]
    pub fn run<B, F, E>(self, store: &B, register: F) -> Self
    where
        B: BlobStore + ?Sized,
        F: FnOnce(BlobHandle) -> Result<Photo, E>,
        E: fmt::Display,
    {
        self.begin(store).finish(store, register)
    }
}
