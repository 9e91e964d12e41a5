//! YAML records for baked goods and the user registry.

use std::{fs, io, path::Path};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domain::{BakedGood, Identity, NonBlankString, SyncOutcome, User},
    storage::{LoadError, write_atomically},
};

fn read_yaml<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, LoadError> {
    let content = fs::read_to_string(path).map_err(|io_error| match io_error.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound,
        _ => LoadError::Io(io_error),
    })?;
    Ok(serde_yaml::from_str(&content)?)
}

fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<(), LoadError> {
    let content = serde_yaml::to_string(value)?;
    write_atomically(path, content.as_bytes())?;
    Ok(())
}

/// Reads a `baked-good.yaml` record.
///
/// # Errors
///
/// Returns an error if the file is missing, unreadable, or has a blank name.
pub fn load_baked_good(path: &Path) -> Result<BakedGood, LoadError> {
    let BakedGoodVersion::V1 {
        uuid,
        owner,
        name,
        description,
        created,
        updated,
    } = read_yaml(path)?;

    Ok(BakedGood {
        uuid,
        owner,
        name: NonBlankString::new(name).map_err(|_| LoadError::Blank("name"))?,
        description,
        created,
        updated,
    })
}

/// Writes a `baked-good.yaml` record.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_baked_good(path: &Path, baked_good: &BakedGood) -> Result<(), LoadError> {
    write_yaml(
        path,
        &BakedGoodVersion::V1 {
            uuid: baked_good.uuid,
            owner: baked_good.owner,
            name: baked_good.name.to_string(),
            description: baked_good.description.clone(),
            created: baked_good.created,
            updated: baked_good.updated,
        },
    )
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum BakedGoodVersion {
    #[serde(rename = "1")]
    V1 {
        uuid: Uuid,
        owner: Uuid,
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        created: DateTime<Utc>,
        updated: DateTime<Utc>,
    },
}

/// Every user known to the journal, keyed by external subject.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserRegistry {
    users: Vec<User>,
}

impl UserRegistry {
    /// Reads the registry. A missing file is an empty registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        match read_yaml::<RegistryVersion>(path) {
            Ok(RegistryVersion::V1 { users }) => Ok(Self {
                users: users.into_iter().map(User::from).collect(),
            }),
            Err(LoadError::NotFound) => {
                tracing::debug!("No user registry at {}", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Writes the registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), LoadError> {
        write_yaml(
            path,
            &RegistryVersion::V1 {
                users: self.users.iter().map(UserRecord::from).collect(),
            },
        )
    }

    /// Looks up a user by UUID.
    #[must_use]
    pub fn get(&self, uuid: Uuid) -> Option<&User> {
        self.users.iter().find(|user| user.uuid == uuid)
    }

    /// Looks up a user by external subject.
    #[must_use]
    pub fn by_subject(&self, subject: &str) -> Option<&User> {
        self.users.iter().find(|user| user.subject == subject)
    }

    /// All users, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.users.iter()
    }

    /// Finds the user for `identity`, registering it on first use and
    /// refreshing its profile otherwise.
    ///
    /// The registry is only modified in memory.
    pub fn sync(&mut self, identity: &Identity) -> (User, SyncOutcome) {
        if let Some(user) = self
            .users
            .iter_mut()
            .find(|user| user.subject == identity.subject)
        {
            let outcome = user.sync(identity);
            return (user.clone(), outcome);
        }

        let user = User::from_identity(identity);
        self.users.push(user.clone());
        (user, SyncOutcome::Created)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum RegistryVersion {
    #[serde(rename = "1")]
    V1 {
        #[serde(default)]
        users: Vec<UserRecord>,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct UserRecord {
    uuid: Uuid,
    subject: String,
    email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            uuid: record.uuid,
            subject: record.subject,
            email: record.email,
            username: record.username,
            name: record.name,
            image_url: record.image_url,
            created: record.created,
            updated: record.updated,
        }
    }
}

impl From<&User> for UserRecord {
    fn from(user: &User) -> Self {
        Self {
            uuid: user.uuid,
            subject: user.subject.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
            name: user.name.clone(),
            image_url: user.image_url.clone(),
            created: user.created,
            updated: user.updated,
        }
    }
}
