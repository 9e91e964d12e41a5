use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::Path,
};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domain::{BlobHandle, Difficulty, Iteration, NonBlankString, Photo, Rating},
    storage::write_atomically,
};

/// An iteration serialized as markdown with YAML frontmatter.
///
/// The frontmatter holds the iteration's attributes and its photo records;
/// the markdown body is the recipe.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkdownIteration {
    frontmatter: FrontMatter,
    recipe: String,
}

impl MarkdownIteration {
    /// Builds the file representation of an iteration and its photos.
    #[must_use]
    pub fn new(iteration: &Iteration, photos: &[Photo]) -> Self {
        let frontmatter = FrontMatter {
            uuid: iteration.uuid,
            baked_good: iteration.baked_good,
            difficulty: iteration.difficulty.clone(),
            total_minutes: iteration.total_minutes,
            bake_date: iteration.bake_date,
            rating: iteration.rating,
            notes: iteration.notes.clone(),
            source_url: iteration.source_url.clone(),
            created: iteration.created,
            updated: iteration.updated,
            photos: photos.iter().map(PhotoRecord::from).collect(),
        };

        Self {
            frontmatter,
            recipe: iteration.recipe.to_string(),
        }
    }

    /// The UUID recorded in the frontmatter.
    #[must_use]
    pub const fn uuid(&self) -> Uuid {
        self.frontmatter.uuid
    }

    /// The baked good recorded in the frontmatter.
    #[must_use]
    pub const fn baked_good(&self) -> Uuid {
        self.frontmatter.baked_good
    }

    fn write<W: Write>(&self, writer: &mut W) -> Result<(), LoadError> {
        let frontmatter = serde_yaml::to_string(&self.frontmatter)?;
        write!(writer, "---\n{frontmatter}---\n{}\n", self.recipe.trim_end())?;
        Ok(())
    }

    pub(crate) fn read<R: BufRead>(reader: &mut R) -> Result<Self, LoadError> {
        let mut lines = reader.lines();

        let first_line = lines
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "Empty input"))??;

        if first_line.trim() != "---" {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Expected frontmatter starting with '---'",
            )
            .into());
        }

        let frontmatter = lines
            .by_ref()
            .map_while(|line| match line {
                Ok(content) if content.trim() == "---" => None,
                Ok(content) => Some(Ok(content)),
                Err(e) => Some(Err(e)),
            })
            .collect::<Result<Vec<_>, _>>()?
            .join("\n");

        let recipe = lines.collect::<Result<Vec<_>, _>>()?.join("\n");

        Ok(Self {
            frontmatter: serde_yaml::from_str(&frontmatter)?,
            recipe: recipe.trim().to_string(),
        })
    }

    /// Reads an iteration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, or not a valid
    /// iteration.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let file = File::open(path).map_err(|io_error| match io_error.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound,
            _ => LoadError::Io(io_error),
        })?;

        Self::read(&mut BufReader::new(file))
    }

    /// Writes the iteration file, replacing any previous version in one step.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), LoadError> {
        let mut buffer = Vec::new();
        self.write(&mut buffer)?;
        write_atomically(path, &buffer)?;
        Ok(())
    }

    /// Converts back into domain values.
    ///
    /// Photos are returned in file order.
    ///
    /// # Errors
    ///
    /// Returns an error if the recipe body is blank.
    pub fn into_domain(self) -> Result<(Iteration, Vec<Photo>), LoadError> {
        let recipe = NonBlankString::new(&self.recipe).map_err(|_| LoadError::Blank("recipe"))?;
        let FrontMatter {
            uuid,
            baked_good,
            difficulty,
            total_minutes,
            bake_date,
            rating,
            notes,
            source_url,
            created,
            updated,
            photos,
        } = self.frontmatter;

        let iteration = Iteration {
            uuid,
            baked_good,
            recipe,
            difficulty,
            total_minutes,
            bake_date,
            rating,
            notes,
            source_url,
            created,
            updated,
        };
        let photos = photos
            .into_iter()
            .map(|record| Photo {
                uuid: record.uuid,
                iteration: uuid,
                handle: record.handle,
                order: record.order,
                created: record.created,
            })
            .collect();

        Ok((iteration, photos))
    }
}

/// Errors that can occur when reading a journal record.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file was not found.
    #[error("file not found")]
    NotFound,
    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The YAML could not be parsed or written.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    /// A required text field is blank.
    #[error("{0} must not be blank")]
    Blank(&'static str),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(from = "FrontMatterVersion")]
#[serde(into = "FrontMatterVersion")]
struct FrontMatter {
    uuid: Uuid,
    baked_good: Uuid,
    difficulty: Difficulty,
    total_minutes: u32,
    bake_date: NaiveDate,
    rating: Option<Rating>,
    notes: Option<String>,
    source_url: Option<String>,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
    photos: Vec<PhotoRecord>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
struct PhotoRecord {
    uuid: Uuid,
    handle: BlobHandle,
    order: i64,
    created: DateTime<Utc>,
}

impl From<&Photo> for PhotoRecord {
    fn from(photo: &Photo) -> Self {
        Self {
            uuid: photo.uuid,
            handle: photo.handle.clone(),
            order: photo.order,
            created: photo.created,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum FrontMatterVersion {
    #[serde(rename = "1")]
    V1 {
        uuid: Uuid,
        baked_good: Uuid,
        difficulty: Difficulty,
        total_minutes: u32,
        bake_date: NaiveDate,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rating: Option<Rating>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source_url: Option<String>,
        created: DateTime<Utc>,
        updated: DateTime<Utc>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        photos: Vec<PhotoRecord>,
    },
}

impl From<FrontMatterVersion> for FrontMatter {
    fn from(version: FrontMatterVersion) -> Self {
        match version {
            FrontMatterVersion::V1 {
                uuid,
                baked_good,
                difficulty,
                total_minutes,
                bake_date,
                rating,
                notes,
                source_url,
                created,
                updated,
                photos,
            } => Self {
                uuid,
                baked_good,
                difficulty,
                total_minutes,
                bake_date,
                rating,
                notes,
                source_url,
                created,
                updated,
                photos,
            },
        }
    }
}

impl From<FrontMatter> for FrontMatterVersion {
    fn from(front_matter: FrontMatter) -> Self {
        let FrontMatter {
            uuid,
            baked_good,
            difficulty,
            total_minutes,
            bake_date,
            rating,
            notes,
            source_url,
            created,
            updated,
            photos,
        } = front_matter;
        Self::V1 {
            uuid,
            baked_good,
            difficulty,
            total_minutes,
            bake_date,
            rating,
            notes,
            source_url,
            created,
            updated,
            photos,
        }
    }
}
