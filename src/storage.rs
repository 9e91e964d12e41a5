//! Filesystem storage for the journal
//!
//! Records live as YAML and markdown files under the journal root; photo
//! contents live in a blob store under `.crumb/`.

use std::{fs, io, path::Path};

mod blob;
mod catalog;
pub mod journal;
mod layout;
/// Markdown serialization for iterations.
pub mod markdown;
mod records;
mod upload;

pub use blob::{BlobStore, FsBlobStore, UploadTicket};
pub use catalog::{Catalog, CatalogError, EntityKind, RemovedBakedGood, ResolveError};
pub use journal::{
    DeleteReport, GcError, GcReport, Journal, JournalError, JournalLoadError, Loaded, Unloaded,
    ValidationError,
};
pub use layout::{BAKED_GOOD_FILE, JournalPath, Layout, META_DIR, ParseError};
pub use markdown::{LoadError, MarkdownIteration};
pub use records::{UserRegistry, load_baked_good, save_baked_good};
pub use upload::{PhotoUpload, UploadState};

/// Replaces the file at `path` with `contents` in one step, creating parent
/// directories as needed.
///
/// The contents go to a sibling temporary file first, which is then renamed
/// over the target.
pub(crate) fn write_atomically(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    fs::write(&staging, contents)?;
    fs::rename(&staging, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomically_replaces_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("record.yaml");

        write_atomically(&path, b"first").unwrap();
        write_atomically(&path, b"second").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second");
        let names: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec!["record.yaml"]);
    }
}
