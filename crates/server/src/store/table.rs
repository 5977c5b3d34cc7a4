//! In-memory user table with insertion-ordered keys.
//!
//! On disk the table is a JSON object keyed by user id:
//!
//! ```json
//! {
//!   "3fa85f64-5717-4562-b3fc-2c963f66afa6": {
//!     "id": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
//!     "name": "Ada Lovelace",
//!     "email": "ada@example.com"
//!   }
//! }
//! ```
//!
//! Key order is significant: listing and pagination follow insertion order,
//! and replacing an existing user keeps its position. An empty table may also
//! be stored as `[]`, and a JSON array of users is accepted on read.

use std::fmt;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use userbase_core::{User, UserId};

/// Ordered mapping from [`UserId`] to [`User`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserTable {
    users: Vec<User>,
}

impl UserTable {
    /// Number of stored users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns true if the table holds no users.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Look up a user by id.
    #[must_use]
    pub fn get(&self, id: &UserId) -> Option<&User> {
        self.users.iter().find(|u| &u.id == id)
    }

    /// Look up a user by id for modification.
    pub fn get_mut(&mut self, id: &UserId) -> Option<&mut User> {
        self.users.iter_mut().find(|u| &u.id == id)
    }

    /// Insert or replace a user, returning true if the id was new.
    ///
    /// A replaced user keeps its position in the table.
    pub fn upsert(&mut self, user: User) -> bool {
        if let Some(existing) = self.get_mut(&user.id) {
            *existing = user;
            false
        } else {
            self.users.push(user);
            true
        }
    }

    /// Remove a user by id.
    pub fn remove(&mut self, id: &UserId) -> Option<User> {
        let pos = self.users.iter().position(|u| &u.id == id)?;
        Some(self.users.remove(pos))
    }

    /// Drop every user.
    pub fn clear(&mut self) {
        self.users.clear();
    }

    /// Iterate users in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, User> {
        self.users.iter()
    }
}

impl<'a> IntoIterator for &'a UserTable {
    type Item = &'a User;
    type IntoIter = std::slice::Iter<'a, User>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for UserTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.users.len()))?;
        for user in &self.users {
            map.serialize_entry(user.id.as_str(), user)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for UserTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(UserTableVisitor)
    }
}

struct UserTableVisitor;

impl<'de> Visitor<'de> for UserTableVisitor {
    type Value = UserTable;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object mapping user ids to users")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut table = UserTable::default();
        while let Some((key, user)) = access.next_entry::<String, User>()? {
            if key != user.id.as_str() {
                return Err(de::Error::custom(format!(
                    "record key {key:?} does not match user id {:?}",
                    user.id.as_str()
                )));
            }
            table.upsert(user);
        }
        Ok(table)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut table = UserTable::default();
        while let Some(user) = access.next_element::<User>()? {
            table.upsert(user);
        }
        Ok(table)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(UserTable::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use userbase_core::{Email, UserName};

    use super::*;

    fn user(id: &str, name: &str) -> User {
        User::new(
            UserId::parse(id).unwrap(),
            UserName::parse(name).unwrap(),
            Email::parse(&format!("{id}@example.com")).unwrap(),
        )
    }

    #[test]
    fn test_upsert_keeps_position() {
        let mut table = UserTable::default();
        assert!(table.upsert(user("a", "A")));
        assert!(table.upsert(user("b", "B")));
        assert!(!table.upsert(user("a", "A2")));

        let names: Vec<&str> = table.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["A2", "B"]);
    }

    #[test]
    fn test_remove() {
        let mut table = UserTable::default();
        table.upsert(user("a", "A"));
        table.upsert(user("b", "B"));

        let removed = table.remove(&UserId::parse("a").unwrap()).unwrap();
        assert_eq!(removed.name.as_str(), "A");
        assert!(table.remove(&UserId::parse("a").unwrap()).is_none());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_serializes_as_keyed_object_in_order() {
        let mut table = UserTable::default();
        table.upsert(user("z", "Zed"));
        table.upsert(user("a", "Ay"));

        let text = serde_json::to_string(&table).unwrap();
        assert!(text.find("\"z\"").unwrap() < text.find("\"a\"").unwrap());

        let parsed: UserTable = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, table);
    }

    #[test]
    fn test_accepts_empty_array_and_null() {
        let from_array: UserTable = serde_json::from_str("[]").unwrap();
        assert!(from_array.is_empty());

        let from_null: UserTable = serde_json::from_str("null").unwrap();
        assert!(from_null.is_empty());
    }

    #[test]
    fn test_rejects_mismatched_key() {
        let value = json!({"a": {"id": "b", "name": "B", "email": "b@example.com"}});
        assert!(serde_json::from_value::<UserTable>(value).is_err());
    }

    #[test]
    fn test_rejects_invalid_record() {
        let value = json!({"a": {"id": "a", "name": "A", "email": "not-an-email"}});
        assert!(serde_json::from_value::<UserTable>(value).is_err());
    }

    #[test]
    fn test_rejects_blank_id() {
        let value = json!({" ": {"id": " ", "name": "B", "email": "b@example.com"}});
        assert!(serde_json::from_value::<UserTable>(value).is_err());
    }
}
