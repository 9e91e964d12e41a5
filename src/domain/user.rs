use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Name shown for an author whose record is missing or has no name.
pub const UNKNOWN_BAKER: &str = "Unknown Baker";

/// The identity claims handed over by whoever authenticated the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Identity {
    /// Stable external subject identifier.
    pub subject: String,
    /// Email address, if the provider supplies one.
    pub email: Option<String>,
    /// Display name, if the provider supplies one.
    pub name: Option<String>,
    /// Avatar URL, if the provider supplies one.
    pub picture_url: Option<String>,
}

impl Identity {
    /// An identity with only a subject.
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            ..Self::default()
        }
    }
}

/// A journal user.
///
/// Users are created on first use from an [`Identity`], and own baked goods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub(crate) uuid: Uuid,
    pub(crate) subject: String,
    pub(crate) email: String,
    pub(crate) username: Option<String>,
    pub(crate) name: Option<String>,
    pub(crate) image_url: Option<String>,
    pub(crate) created: DateTime<Utc>,
    pub(crate) updated: DateTime<Utc>,
}

/// What [`User::sync`] did to a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The user did not exist and was created.
    Created,
    /// Some profile fields changed.
    Updated,
    /// Nothing changed.
    Unchanged,
}

impl User {
    /// Creates a user record from an identity.
    #[must_use]
    pub fn from_identity(identity: &Identity) -> Self {
        let now = Utc::now();
        Self {
            uuid: Uuid::new_v4(),
            subject: identity.subject.clone(),
            email: identity.email.clone().unwrap_or_default(),
            username: None,
            name: identity.name.clone(),
            image_url: identity.picture_url.clone(),
            created: now,
            updated: now,
        }
    }

    /// Brings profile fields in line with a fresh identity.
    ///
    /// The email only changes when the identity carries one. Name and image
    /// follow the identity exactly, including being cleared.
    pub fn sync(&mut self, identity: &Identity) -> SyncOutcome {
        let mut changed = false;

        if let Some(email) = &identity.email {
            if *email != self.email {
                self.email.clone_from(email);
                changed = true;
            }
        }
        if identity.name != self.name {
            self.name.clone_from(&identity.name);
            changed = true;
        }
        if identity.picture_url != self.image_url {
            self.image_url.clone_from(&identity.picture_url);
            changed = true;
        }

        if changed {
            self.updated = Utc::now();
            SyncOutcome::Updated
        } else {
            SyncOutcome::Unchanged
        }
    }

    /// The stable internal identifier.
    #[must_use]
    pub const fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// The external subject this user was created from.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Email address (may be empty).
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Optional username.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Sets the username.
    pub fn set_username(&mut self, username: Option<String>) {
        self.username = username;
        self.updated = Utc::now();
    }

    /// Optional display name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Optional avatar URL.
    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    /// When the user was first seen.
    #[must_use]
    pub const fn created(&self) -> DateTime<Utc> {
        self.created
    }

    /// When the profile last changed.
    #[must_use]
    pub const fn updated(&self) -> DateTime<Utc> {
        self.updated
    }

    /// Name shown next to this user's public baked goods.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or(UNKNOWN_BAKER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            subject: "user_123".to_string(),
            email: Some("baker@example.com".to_string()),
            name: Some("Ada".to_string()),
            picture_url: None,
        }
    }

    #[test]
    fn from_identity_copies_claims() {
        let user = User::from_identity(&identity());
        assert_eq!(user.subject(), "user_123");
        assert_eq!(user.email(), "baker@example.com");
        assert_eq!(user.name(), Some("Ada"));
        assert_eq!(user.created(), user.updated());
    }

    #[test]
    fn sync_is_unchanged_for_same_identity() {
        let mut user = User::from_identity(&identity());
        assert_eq!(user.sync(&identity()), SyncOutcome::Unchanged);
    }

    #[test]
    fn sync_updates_changed_fields() {
        let mut user = User::from_identity(&identity());
        let mut fresh = identity();
        fresh.name = Some("Ada L.".to_string());
        fresh.picture_url = Some("https://img.example.com/a.png".to_string());

        assert_eq!(user.sync(&fresh), SyncOutcome::Updated);
        assert_eq!(user.name(), Some("Ada L."));
        assert_eq!(user.image_url(), Some("https://img.example.com/a.png"));
    }

    #[test]
    fn sync_keeps_email_when_identity_has_none() {
        let mut user = User::from_identity(&identity());
        let mut fresh = identity();
        fresh.email = None;

        assert_eq!(user.sync(&fresh), SyncOutcome::Unchanged);
        assert_eq!(user.email(), "baker@example.com");
    }

    #[test]
    fn display_name_falls_back() {
        let mut user = User::from_identity(&Identity::new("anon"));
        assert_eq!(user.display_name(), UNKNOWN_BAKER);

        user.set_username(Some("crumbshot".to_string()));
        assert_eq!(user.display_name(), "crumbshot");

        user.name = Some("Grace".to_string());
        assert_eq!(user.display_name(), "Grace");
    }
}
