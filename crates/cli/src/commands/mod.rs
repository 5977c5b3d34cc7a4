//! CLI command implementations.

pub mod seed;
pub mod users;

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use userbase_server::store::{StoreError, UserStore};

/// Errors specific to CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// A user-supplied value failed validation.
    #[error("{0}")]
    Invalid(String),
    /// No user has the requested id.
    #[error("user {0} not found")]
    NotFound(String),
}

/// Open the store backing the server's data file.
///
/// # Errors
///
/// Returns `StoreError` if the parent directory cannot be created.
pub async fn open_store(path: &Path) -> Result<UserStore, StoreError> {
    let store = UserStore::open(path).await?;
    tracing::debug!(path = %store.path().display(), "Using data file");
    Ok(store)
}

/// Write a value to stdout as pretty JSON.
fn write_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}
