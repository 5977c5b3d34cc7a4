//! Seed the user file from a YAML fixture.
//!
//! The file is a plain list:
//!
//! ```yaml
//! - name: Ada Lovelace
//!   email: ada@example.com
//! - name: Grace Hopper
//!   email: grace@example.com
//! ```
//!
//! Every entry is validated before anything is written, so a bad fixture
//! leaves the data file untouched.

use std::path::Path;

use serde::Deserialize;
use tracing::{error, info};
use userbase_core::{Email, UserName};
use userbase_server::store::UserStore;

/// One fixture entry.
#[derive(Debug, Deserialize)]
pub struct SeedUser {
    pub name: String,
    pub email: String,
}

/// Validate fixture entries, collecting every problem.
///
/// Returns the parsed pairs, or one message per invalid entry.
pub fn validate(entries: &[SeedUser]) -> Result<Vec<(UserName, Email)>, Vec<String>> {
    let mut valid = Vec::with_capacity(entries.len());
    let mut errors = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        match (UserName::parse(&entry.name), Email::parse(&entry.email)) {
            (Ok(name), Ok(email)) => valid.push((name, email)),
            (Err(e), _) => errors.push(format!("entry {index}: {e}")),
            (_, Err(e)) => errors.push(format!("entry {index} ({}): {e}", entry.email)),
        }
    }

    if errors.is_empty() {
        Ok(valid)
    } else {
        Err(errors)
    }
}

/// Seed users from a YAML file.
///
/// # Arguments
///
/// * `store` - Target user store
/// * `file_path` - Path to the YAML fixture
/// * `clear_existing` - If true, remove existing users first
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, any entry is
/// invalid, or the data file cannot be written.
pub async fn users(
    store: &UserStore,
    file_path: &Path,
    clear_existing: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file_path.exists() {
        return Err(format!("File not found: {}", file_path.display()).into());
    }

    info!(path = %file_path.display(), "Loading users from file");

    // Read and validate YAML before touching the data file
    let content = tokio::fs::read_to_string(file_path).await?;
    let entries: Vec<SeedUser> = serde_yaml::from_str(&content)?;

    info!(entries = entries.len(), "Parsed fixture");

    let valid = match validate(&entries) {
        Ok(valid) => valid,
        Err(errors) => {
            error!("Fixture validation failed:");
            for err in &errors {
                error!("  - {err}");
            }
            return Err(format!("{} validation errors found", errors.len()).into());
        }
    };

    info!(clear_existing, "Starting seeding process");
    let inserted = store.insert_many(valid, clear_existing).await?;

    info!("Seeding complete!");
    info!("  Users inserted: {}", inserted.len());
    info!("  Users in file: {}", store.count().await?);

    Ok(())
}
