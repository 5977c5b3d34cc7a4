//! The user entity.

use serde::{Deserialize, Serialize};

use super::{Email, UserId, UserName};

/// A stored user.
///
/// Serializes to `{"id": "...", "name": "...", "email": "..."}`, which is both
/// the API representation and the on-disk record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: UserName,
    /// Contact email address.
    pub email: Email,
}

impl User {
    /// Create a user from already-validated parts.
    #[must_use]
    pub const fn new(id: UserId, name: UserName, email: Email) -> Self {
        Self { id, name, email }
    }

    /// Merge a partial update into this user.
    ///
    /// Fields absent from the patch are left untouched. The id never changes.
    pub fn apply(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
    }
}

/// A partial update to a [`User`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    /// New name, if changing.
    pub name: Option<UserName>,
    /// New email, if changing.
    pub email: Option<Email>,
}

impl UserPatch {
    /// Returns true if the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}
