//! Flat-file persistence for the user table.
//!
//! # File: `USERBASE_DATA_FILE` (default `var/users.json`)
//!
//! The whole table is loaded on every operation and rewritten in full on
//! every mutation. See [`table`] for the on-disk layout.
//!
//! # Consistency
//!
//! - Mutations run under a per-store async mutex, so read-modify-write cycles
//!   from concurrent requests in this process never interleave.
//! - Saves write a sibling temp file and rename it over the target, so a
//!   reader sees either the old table or the new one, never a torn write.
//! - A file that cannot be decoded is reported as [`StoreError::Corrupt`] and
//!   left untouched.

pub mod table;

use std::io;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use userbase_core::{Email, PageRequest, User, UserId, UserName, UserPatch};

pub use table::UserTable;

/// Errors from the file store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the data file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The data file exists but does not hold a valid user table.
    #[error("corrupt user table in {path}: {source}")]
    Corrupt {
        /// File being decoded.
        path: PathBuf,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },

    /// The in-memory table could not be encoded.
    #[error("failed to encode user table: {0}")]
    Encode(#[source] serde_json::Error),
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// File-backed user repository.
#[derive(Debug)]
pub struct UserStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl UserStore {
    /// Open a store at `path`, creating the parent directory if needed.
    ///
    /// The data file itself is created lazily on the first mutation.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the parent directory cannot be created.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }
        tracing::debug!(path = %path.display(), "user store opened");
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full table from disk.
    ///
    /// A missing or blank file is an empty table.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the file cannot be read, or
    /// `StoreError::Corrupt` if its contents are not a valid table.
    pub async fn load(&self) -> Result<UserTable, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(UserTable::default()),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(UserTable::default());
        }

        serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Write the full table to disk atomically.
    async fn save(&self, table: &UserTable) -> Result<(), StoreError> {
        let mut bytes = serde_json::to_vec_pretty(table).map_err(StoreError::Encode)?;
        bytes.push(b'\n');

        let tmp_path = self.temp_path();
        let mut file = tokio::fs::File::create(&tmp_path)
            .await
            .map_err(|e| StoreError::io(&tmp_path, e))?;
        file.write_all(&bytes)
            .await
            .map_err(|e| StoreError::io(&tmp_path, e))?;
        file.sync_all()
            .await
            .map_err(|e| StoreError::io(&tmp_path, e))?;
        drop(file);

        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;

        tracing::debug!(path = %self.path.display(), users = table.len(), "user table saved");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Run one read-modify-write cycle under the write lock.
    ///
    /// `f` returns its result and whether the table changed; unchanged
    /// tables are not written back.
    async fn mutate<T>(
        &self,
        f: impl FnOnce(&mut UserTable) -> (T, bool),
    ) -> Result<T, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut table = self.load().await?;
        let (out, changed) = f(&mut table);
        if changed {
            self.save(&table).await?;
        }
        Ok(out)
    }

    /// Verify the backing file can be read and decoded.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`UserStore::load`].
    pub async fn check(&self) -> Result<(), StoreError> {
        self.load().await.map(|_| ())
    }

    /// Number of stored users.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`UserStore::load`].
    pub async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.load().await?.len())
    }

    /// Fetch one page of users in insertion order, plus the total count.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`UserStore::load`].
    pub async fn list(&self, page: PageRequest) -> Result<(Vec<User>, usize), StoreError> {
        let table = self.load().await?;
        let users = page.slice(table.iter().cloned()).collect();
        Ok((users, table.len()))
    }

    /// Fetch a user by id.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`UserStore::load`].
    pub async fn get(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        Ok(self.load().await?.get(id).cloned())
    }

    /// Create a user under a freshly generated id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the table cannot be loaded or saved.
    pub async fn create(&self, name: UserName, email: Email) -> Result<User, StoreError> {
        let user = User::new(UserId::generate(), name, email);
        self.mutate(|table| {
            table.upsert(user.clone());
            (user, true)
        })
        .await
    }

    /// Store a user under `id`, replacing any existing record.
    ///
    /// Returns the stored user and whether the id was new.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the table cannot be loaded or saved.
    pub async fn replace(
        &self,
        id: UserId,
        name: UserName,
        email: Email,
    ) -> Result<(User, bool), StoreError> {
        let user = User::new(id, name, email);
        self.mutate(|table| {
            let created = table.upsert(user.clone());
            ((user, created), true)
        })
        .await
    }

    /// Merge a partial update into an existing user.
    ///
    /// Returns `None` if no user has this id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the table cannot be loaded or saved.
    pub async fn update(&self, id: &UserId, patch: UserPatch) -> Result<Option<User>, StoreError> {
        self.mutate(|table| match table.get_mut(id) {
            Some(user) => {
                let changed = !patch.is_empty();
                user.apply(patch);
                (Some(user.clone()), changed)
            }
            None => (None, false),
        })
        .await
    }

    /// Delete a user, returning true if it existed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the table cannot be loaded or saved.
    pub async fn delete(&self, id: &UserId) -> Result<bool, StoreError> {
        self.mutate(|table| {
            let removed = table.remove(id).is_some();
            (removed, removed)
        })
        .await
    }

    /// Create many users in one write, optionally clearing the table first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the table cannot be loaded or saved.
    pub async fn insert_many(
        &self,
        entries: Vec<(UserName, Email)>,
        clear_existing: bool,
    ) -> Result<Vec<User>, StoreError> {
        let users: Vec<User> = entries
            .into_iter()
            .map(|(name, email)| User::new(UserId::generate(), name, email))
            .collect();
        self.mutate(|table| {
            if clear_existing {
                table.clear();
            }
            for user in &users {
                table.upsert(user.clone());
            }
            (users, true)
        })
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn name(s: &str) -> UserName {
        UserName::parse(s).unwrap()
    }

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    async fn temp_store() -> (tempfile::TempDir, UserStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = UserStore::open(dir.path().join("db").join("users.json"))
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let (_dir, store) = temp_store().await;
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_blank_file_is_empty() {
        let (_dir, store) = temp_store().await;
        tokio::fs::write(store.path(), "  \n").await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let (_dir, store) = temp_store().await;
        let created = store
            .create(name("Ada"), email("ada@example.com"))
            .await
            .unwrap();

        let fetched = store.get(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let (_dir, store) = temp_store().await;
        let created = store
            .create(name("Ada"), email("ada@example.com"))
            .await
            .unwrap();

        let reopened = UserStore::open(store.path().to_path_buf()).await.unwrap();
        assert_eq!(reopened.get(&created.id).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn test_replace_creates_then_overwrites() {
        let (_dir, store) = temp_store().await;
        let id = UserId::parse("custom-id").unwrap();

        let (user, created) = store
            .replace(id.clone(), name("First"), email("first@example.com"))
            .await
            .unwrap();
        assert!(created);
        assert_eq!(user.id, id);

        let (user, created) = store
            .replace(id.clone(), name("Second"), email("second@example.com"))
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(user.name.as_str(), "Second");
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let (_dir, store) = temp_store().await;
        let created = store
            .create(name("Ada"), email("ada@example.com"))
            .await
            .unwrap();

        let patch = UserPatch {
            name: None,
            email: Some(email("lovelace@example.com")),
        };
        let updated = store.update(&created.id, patch).await.unwrap().unwrap();
        assert_eq!(updated.name.as_str(), "Ada");
        assert_eq!(updated.email.as_str(), "lovelace@example.com");
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let (_dir, store) = temp_store().await;
        let missing = UserId::parse("nope").unwrap();
        assert!(
            store
                .update(&missing, UserPatch::default())
                .await
                .unwrap()
                .is_none()
        );
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_delete() {
        let (_dir, store) = temp_store().await;
        let created = store
            .create(name("Ada"), email("ada@example.com"))
            .await
            .unwrap();

        assert!(store.delete(&created.id).await.unwrap());
        assert!(!store.delete(&created.id).await.unwrap());
        assert!(store.get(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_pages_in_insertion_order() {
        let (_dir, store) = temp_store().await;
        for i in 0..5 {
            store
                .create(name(&format!("User {i}")), email(&format!("u{i}@example.com")))
                .await
                .unwrap();
        }

        let (page, total) = store.list(PageRequest::new(2, 2, 100)).await.unwrap();
        assert_eq!(total, 5);
        let names: Vec<&str> = page.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["User 2", "User 3"]);

        let (page, total) = store.list(PageRequest::new(9, 2, 100)).await.unwrap();
        assert_eq!(total, 5);
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_insert_many_with_clear() {
        let (_dir, store) = temp_store().await;
        store
            .create(name("Old"), email("old@example.com"))
            .await
            .unwrap();

        let inserted = store
            .insert_many(
                vec![
                    (name("A"), email("a@example.com")),
                    (name("B"), email("b@example.com")),
                ],
                true,
            )
            .await
            .unwrap();
        assert_eq!(inserted.len(), 2);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported_and_preserved() {
        let (_dir, store) = temp_store().await;
        tokio::fs::write(store.path(), "{not json").await.unwrap();

        let err = store
            .create(name("Ada"), email("ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));

        let contents = tokio::fs::read_to_string(store.path()).await.unwrap();
        assert_eq!(contents, "{not json");
    }

    #[tokio::test]
    async fn test_concurrent_creates_are_not_lost() {
        let (_dir, store) = temp_store().await;
        let store = Arc::new(store);

        let mut handles = Vec::new();
        for i in 0..20 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .create(name(&format!("User {i}")), email(&format!("u{i}@example.com")))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.count().await.unwrap(), 20);
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let (_dir, store) = temp_store().await;
        store
            .create(name("Ada"), email("ada@example.com"))
            .await
            .unwrap();
        assert!(!store.temp_path().exists());
    }
}
