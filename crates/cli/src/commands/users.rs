//! `users` subcommands: list, show, create, delete.

use serde_json::json;
use tracing::info;
use userbase_core::{Email, PageRequest, UserId, UserName};
use userbase_server::store::UserStore;

use super::{CommandError, write_json};

/// Largest page the CLI will print at once.
const MAX_CLI_PAGE_SIZE: usize = 1_000;

/// Print one page of users with pagination info.
///
/// # Errors
///
/// Returns an error if the data file cannot be read.
pub async fn list(
    store: &UserStore,
    page: i64,
    limit: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    let page = PageRequest::new(page, limit, MAX_CLI_PAGE_SIZE);
    let (users, total) = store.list(page).await?;
    write_json(&json!({
        "users": users,
        "pagination": page.info(total),
    }))
}

/// Print a single user.
///
/// # Errors
///
/// Returns an error if the id is unknown or the data file cannot be read.
pub async fn show(store: &UserStore, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let user_id = parse_id(id)?;
    let user = store
        .get(&user_id)
        .await?
        .ok_or_else(|| CommandError::NotFound(id.to_string()))?;
    write_json(&user)
}

/// Create a user and print it.
///
/// # Errors
///
/// Returns an error if the name or email is invalid, or the data file
/// cannot be written.
pub async fn create(
    store: &UserStore,
    name: &str,
    email: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let name = UserName::parse(name).map_err(|e| CommandError::Invalid(e.to_string()))?;
    let email = Email::parse(email).map_err(|e| CommandError::Invalid(e.to_string()))?;

    let user = store.create(name, email).await?;
    info!(id = %user.id, email = %user.email, "User created");
    write_json(&user)
}

/// Delete a user.
///
/// # Errors
///
/// Returns an error if the id is unknown or the data file cannot be written.
pub async fn delete(store: &UserStore, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let user_id = parse_id(id)?;
    if !store.delete(&user_id).await? {
        return Err(CommandError::NotFound(id.to_string()).into());
    }
    info!(id = %user_id, "User deleted");
    Ok(())
}

fn parse_id(id: &str) -> Result<UserId, CommandError> {
    UserId::parse(id).map_err(|e| CommandError::Invalid(e.to_string()))
}
