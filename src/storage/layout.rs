//! Where things live inside a journal directory.
//!
//! ```text
//! .crumb/config.toml
//! .crumb/users.yaml
//! .crumb/blobs/<handle>
//! .crumb/uploads/<ticket>
//! .crumb/trash/<uuid>
//! <baked-good-uuid>/baked-good.yaml
//! <baked-good-uuid>/<iteration-uuid>.md
//! ```

use std::{
    fs, io,
    path::{Component, Path, PathBuf},
};

use uuid::Uuid;

/// Name of the metadata directory at the journal root.
pub const META_DIR: &str = ".crumb";

/// File name of a baked good record inside its directory.
pub const BAKED_GOOD_FILE: &str = "baked-good.yaml";

const ITERATION_EXTENSION: &str = "md";

/// Paths of a journal rooted at a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    /// A layout rooted at `root`.
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The journal root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The metadata directory.
    #[must_use]
    pub fn meta_dir(&self) -> PathBuf {
        self.root.join(META_DIR)
    }

    /// The configuration file.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.meta_dir().join("config.toml")
    }

    /// The user registry.
    #[must_use]
    pub fn users_path(&self) -> PathBuf {
        self.meta_dir().join("users.yaml")
    }

    /// Directory holding blob contents.
    #[must_use]
    pub fn blobs_dir(&self) -> PathBuf {
        self.meta_dir().join("blobs")
    }

    /// Directory holding in-flight upload tickets.
    #[must_use]
    pub fn uploads_dir(&self) -> PathBuf {
        self.meta_dir().join("uploads")
    }

    /// Directory holding entities that are being deleted.
    #[must_use]
    pub fn trash_dir(&self) -> PathBuf {
        self.meta_dir().join("trash")
    }

    /// Where a detached entity is parked during a cascading delete.
    #[must_use]
    pub fn trash_path(&self, uuid: Uuid) -> PathBuf {
        self.trash_dir().join(uuid.to_string())
    }

    /// Directory of a baked good.
    #[must_use]
    pub fn baked_good_dir(&self, baked_good: Uuid) -> PathBuf {
        self.root.join(baked_good.to_string())
    }

    /// Record file of a baked good.
    #[must_use]
    pub fn baked_good_path(&self, baked_good: Uuid) -> PathBuf {
        self.baked_good_dir(baked_good).join(BAKED_GOOD_FILE)
    }

    /// Markdown file of an iteration.
    #[must_use]
    pub fn iteration_path(&self, baked_good: Uuid, iteration: Uuid) -> PathBuf {
        self.baked_good_dir(baked_good)
            .join(iteration.to_string())
            .with_extension(ITERATION_EXTENSION)
    }

    /// Creates the metadata directories.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created.
    pub fn create_dirs(&self) -> io::Result<()> {
        for dir in [self.blobs_dir(), self.uploads_dir(), self.trash_dir()] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Classifies a file found in the journal.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not one of the record files of the
    /// layout.
    pub fn parse_path(&self, path: &Path) -> Result<JournalPath, ParseError> {
        let relative = path
            .strip_prefix(&self.root)
            .map_err(|_| ParseError::OutsideRoot)?;

        let components: Vec<&str> = relative
            .components()
            .map(|component| match component {
                Component::Normal(s) => s.to_str().ok_or(ParseError::NotUtf8),
                _ => Err(ParseError::UnexpectedLocation),
            })
            .collect::<Result<_, _>>()?;

        let [dir, file] = components.as_slice() else {
            return Err(ParseError::UnexpectedLocation);
        };

        let baked_good = parse_uuid(dir)?;

        if *file == BAKED_GOOD_FILE {
            return Ok(JournalPath::BakedGood(baked_good));
        }

        let file = Path::new(file);
        if file.extension().and_then(|e| e.to_str()) != Some(ITERATION_EXTENSION) {
            return Err(ParseError::UnexpectedFile);
        }
        let stem = file
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or(ParseError::UnexpectedFile)?;

        Ok(JournalPath::Iteration {
            baked_good,
            iteration: parse_uuid(stem)?,
        })
    }
}

fn parse_uuid(s: &str) -> Result<Uuid, ParseError> {
    Uuid::parse_str(s).map_err(|_| ParseError::InvalidUuid(s.to_string()))
}

/// A record file, identified by its place in the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalPath {
    /// `<baked-good>/baked-good.yaml`
    BakedGood(Uuid),
    /// `<baked-good>/<iteration>.md`
    Iteration {
        /// Owning baked good, from the directory name.
        baked_good: Uuid,
        /// Iteration, from the file name.
        iteration: Uuid,
    },
}

/// Errors from [`Layout::parse_path`].
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The path is not below the journal root.
    #[error("path is outside the journal root")]
    OutsideRoot,
    /// A path component is not valid UTF-8.
    #[error("path is not valid UTF-8")]
    NotUtf8,
    /// The file is not directly inside a baked good directory.
    #[error("file is not inside a baked good directory")]
    UnexpectedLocation,
    /// The file name matches neither record kind.
    #[error("file is neither a baked good record nor an iteration")]
    UnexpectedFile,
    /// A directory or file name is not a UUID.
    #[error("'{0}' is not a UUID")]
    InvalidUuid(String),
}
