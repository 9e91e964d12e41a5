//! Photo contents, kept apart from the records that reference them.

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use uuid::Uuid;

use crate::domain::BlobHandle;

/// Permission to store one blob, issued by [`BlobStore::begin_upload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTicket(Uuid);

impl fmt::Display for UploadTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Storage for photo contents.
pub trait BlobStore {
    /// A URL the blob can be displayed from, if the blob exists.
    fn display_url(&self, handle: &BlobHandle) -> Option<String>;

    /// Starts an upload.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot accept uploads.
    fn begin_upload(&self) -> io::Result<UploadTicket>;

    /// Stores the contents for a ticket and returns the new blob's handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the ticket is unknown or the contents cannot be
    /// written.
    fn complete_upload(&self, ticket: UploadTicket, bytes: &[u8]) -> io::Result<BlobHandle>;

    /// Gives up an upload without storing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the ticket cannot be released.
    fn abandon_upload(&self, ticket: UploadTicket) -> io::Result<()>;

    /// Deletes a blob. Deleting a blob that does not exist succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob exists but cannot be removed.
    fn delete(&self, handle: &BlobHandle) -> io::Result<()>;

    /// Every stored blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be listed.
    fn handles(&self) -> io::Result<Vec<BlobHandle>>;
}

/// A [`BlobStore`] backed by a directory.
///
/// Each blob is a file named by its handle. Upload tickets are placeholder
/// files in a separate directory, so uploads that never complete can be
/// found and cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsBlobStore {
    blobs: PathBuf,
    uploads: PathBuf,
}

impl FsBlobStore {
    /// A store over the given blob and upload directories.
    #[must_use]
    pub const fn new(blobs: PathBuf, uploads: PathBuf) -> Self {
        Self { blobs, uploads }
    }

    /// The file holding a blob.
    ///
    /// Returns `None` for handles this store could not have issued.
    #[must_use]
    pub fn path(&self, handle: &BlobHandle) -> Option<PathBuf> {
        Uuid::parse_str(handle.as_str())
            .ok()
            .map(|uuid| self.blobs.join(uuid.to_string()))
    }

    fn ticket_path(&self, ticket: &UploadTicket) -> PathBuf {
        self.uploads.join(ticket.0.to_string())
    }

    /// Upload tickets that were never completed or abandoned.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload directory cannot be listed.
    pub fn pending_uploads(&self) -> io::Result<Vec<PathBuf>> {
        list_files(&self.uploads)
    }
}

fn list_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();
    Ok(paths)
}

fn invalid_handle(handle: &BlobHandle) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("'{handle}' is not a blob handle"),
    )
}

impl BlobStore for FsBlobStore {
    fn display_url(&self, handle: &BlobHandle) -> Option<String> {
        let path = fs::canonicalize(self.path(handle)?).ok()?;
        Some(format!("file://{}", path.display()))
    }

    fn begin_upload(&self) -> io::Result<UploadTicket> {
        fs::create_dir_all(&self.uploads)?;
        let ticket = UploadTicket(Uuid::new_v4());
        fs::File::create_new(self.ticket_path(&ticket))?;
        Ok(ticket)
    }

    fn complete_upload(&self, ticket: UploadTicket, bytes: &[u8]) -> io::Result<BlobHandle> {
        let staging = self.ticket_path(&ticket);
        if !staging.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("upload ticket {ticket} is not pending"),
            ));
        }
        fs::write(&staging, bytes)?;

        fs::create_dir_all(&self.blobs)?;
        let handle = BlobHandle::new(Uuid::new_v4().to_string());
        let target = self.path(&handle).ok_or_else(|| invalid_handle(&handle))?;
        fs::rename(&staging, &target)?;

        tracing::debug!("Stored blob {handle}");
        Ok(handle)
    }

    fn abandon_upload(&self, ticket: UploadTicket) -> io::Result<()> {
        match fs::remove_file(self.ticket_path(&ticket)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    fn delete(&self, handle: &BlobHandle) -> io::Result<()> {
        let path = self.path(handle).ok_or_else(|| invalid_handle(handle))?;
        match fs::remove_file(path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => {
                tracing::debug!("Deleted blob {handle}");
                Ok(())
            }
        }
    }

    fn handles(&self) -> io::Result<Vec<BlobHandle>> {
        Ok(list_files(&self.blobs)?
            .into_iter()
            .filter_map(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(BlobHandle::new)
            })
            .collect())
    }
}
