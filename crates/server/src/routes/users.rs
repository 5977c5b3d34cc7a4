//! User resource handlers.
//!
//! ```text
//! GET     /api/users?limit=10&page=1  - Paginated list
//! POST    /api/users                  - Create {"name", "email"}
//! GET     /api/users/{id}             - Fetch one
//! PUT     /api/users/{id}             - Replace (creates if absent)
//! PATCH   /api/users/{id}             - Merge name and/or email
//! DELETE  /api/users/{id}             - Remove
//! OPTIONS /api/users[/{id}]           - CORS preflight
//! ```

use axum::{
    extract::State,
    http::{
        StatusCode,
        header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS},
    },
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use userbase_core::{Email, PageInfo, PageRequest, User, UserId, UserName, UserPatch};

use super::envelope::Envelope;
use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::state::AppState;

const INVALID_NAME_OR_EMAIL: &str = "Invalid name or email format";
const INVALID_NAME: &str = "Invalid name format";
const INVALID_EMAIL: &str = "Invalid email format";

/// Methods advertised to CORS preflight requests.
pub const ALLOWED_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, OPTIONS";
/// Request headers advertised to CORS preflight requests.
pub const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

// =============================================================================
// Request / Response Types
// =============================================================================

/// Query parameters for the list endpoint.
///
/// Kept as raw strings so that junk values fall back to defaults instead of
/// failing the request.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: Option<String>,
    pub page: Option<String>,
}

impl ListQuery {
    /// Pick `limit` and `page` out of decoded query pairs. The last
    /// occurrence of a repeated key wins; other keys are ignored.
    #[must_use]
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "limit" => query.limit = Some(value),
                "page" => query.page = Some(value),
                _ => {}
            }
        }
        query
    }
}

/// Body accepted by POST, PUT and PATCH.
///
/// Only a JSON object decodes; arrays and scalars are rejected as malformed.
/// Fields are untyped so that a wrong JSON type is a validation failure
/// rather than a malformed body. Keys other than `name` and `email` are
/// ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct UserPayload {
    pub name: Option<Value>,
    pub email: Option<Value>,
}

impl From<Map<String, Value>> for UserPayload {
    fn from(mut object: Map<String, Value>) -> Self {
        Self {
            name: object.remove("name"),
            email: object.remove("email"),
        }
    }
}

/// Payload of the list endpoint.
#[derive(Debug, Serialize)]
pub struct UserList {
    pub users: Vec<User>,
    pub pagination: PageInfo,
}

// =============================================================================
// Handlers
// =============================================================================

/// List users, one page at a time.
///
/// # Errors
///
/// Returns `AppError::Store` if the data file cannot be read.
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(pairs): ApiQuery<Vec<(String, String)>>,
) -> Result<Envelope<UserList>> {
    let query = ListQuery::from_pairs(pairs);
    let config = state.config();
    let page = PageRequest::new(
        int_param(query.page.as_deref(), 1),
        int_param(
            query.limit.as_deref(),
            i64::try_from(config.default_page_size).unwrap_or(i64::MAX),
        ),
        config.max_page_size,
    );

    let (users, total) = state.store().list(page).await?;

    Ok(Envelope::data(UserList {
        users,
        pagination: page.info(total),
    }))
}

/// Fetch a single user.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown id.
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Envelope<User>> {
    let id = known_id(&id)?;
    let user = state
        .store()
        .get(&id)
        .await?
        .ok_or_else(AppError::user_not_found)?;
    Ok(Envelope::data(user))
}

/// Create a user under a new id.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if `name` or `email` is missing or invalid.
pub async fn create(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<UserPayload>,
) -> Result<(StatusCode, Envelope<User>)> {
    let (name, email) = parse_full(&payload)?;
    let user = state.store().create(name, email).await?;

    tracing::info!(user_id = %user.id, "User created");
    add_breadcrumb("create", user.id.as_str());

    Ok((
        StatusCode::CREATED,
        Envelope::with_message(user, "User created successfully"),
    ))
}

/// Replace a user wholesale, creating it if the id is new.
///
/// Both outcomes answer 200 "User updated successfully".
///
/// # Errors
///
/// Returns `AppError::BadRequest` if `name` or `email` is missing or invalid,
/// or if the id itself is unusable.
pub async fn replace(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(payload): ApiJson<UserPayload>,
) -> Result<Envelope<User>> {
    let id =
        UserId::parse(&id).map_err(|e| AppError::BadRequest(format!("Invalid user id: {e}")))?;
    let (name, email) = parse_full(&payload)?;
    let (user, created) = state.store().replace(id, name, email).await?;

    add_breadcrumb("replace", user.id.as_str());
    tracing::info!(user_id = %user.id, created, "User replaced");

    Ok(Envelope::with_message(user, "User updated successfully"))
}

/// Merge `name` and/or `email` into an existing user.
///
/// Existence is checked before the body is looked at, so an unknown id is a
/// 404 even when the body is also bad.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown id, or
/// `AppError::BadRequest` if a supplied field is invalid.
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    body: std::result::Result<ApiJson<UserPayload>, AppError>,
) -> Result<Envelope<User>> {
    let id = known_id(&id)?;
    if state.store().get(&id).await?.is_none() {
        return Err(AppError::user_not_found());
    }

    let ApiJson(payload) = body?;
    let patch = parse_patch(payload)?;

    let user = state
        .store()
        .update(&id, patch)
        .await?
        .ok_or_else(AppError::user_not_found)?;

    tracing::info!(user_id = %user.id, "User updated");
    add_breadcrumb("update", user.id.as_str());

    Ok(Envelope::with_message(user, "User updated successfully"))
}

/// Delete a user.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown id.
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<StatusCode> {
    let id = known_id(&id)?;
    if !state.store().delete(&id).await? {
        return Err(AppError::user_not_found());
    }

    tracing::info!(user_id = %id, "User deleted");
    add_breadcrumb("delete", id.as_str());

    Ok(StatusCode::NO_CONTENT)
}

/// CORS preflight for both the collection and item paths.
pub async fn options() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [
            (ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS),
            (ACCESS_CONTROL_ALLOW_HEADERS, ALLOWED_HEADERS),
        ],
    )
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an integer query parameter, using `default` when absent or junk.
fn int_param(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(default)
}

/// Parse an id from the path; ids that can never exist are simply not found.
fn known_id(raw: &str) -> Result<UserId> {
    UserId::parse(raw).map_err(|_| AppError::user_not_found())
}

/// Run `parse` over a JSON string value; non-strings and parse failures are `None`.
fn string_field<T, E>(
    value: Option<&Value>,
    parse: impl FnOnce(&str) -> std::result::Result<T, E>,
) -> Option<T> {
    value.and_then(Value::as_str).and_then(|s| parse(s).ok())
}

/// Validate a full record (POST and PUT): both fields required.
fn parse_full(payload: &UserPayload) -> Result<(UserName, Email)> {
    let name = string_field(payload.name.as_ref(), UserName::parse);
    let email = string_field(payload.email.as_ref(), Email::parse);
    match (name, email) {
        (Some(name), Some(email)) => Ok((name, email)),
        _ => Err(AppError::BadRequest(INVALID_NAME_OR_EMAIL.to_string())),
    }
}

/// Validate a partial record (PATCH): absent or null fields are left alone.
fn parse_patch(payload: UserPayload) -> Result<UserPatch> {
    let email = match payload.email {
        None | Some(Value::Null) => None,
        Some(value) => Some(
            string_field(Some(&value), Email::parse)
                .ok_or_else(|| AppError::BadRequest(INVALID_EMAIL.to_string()))?,
        ),
    };
    let name = match payload.name {
        None | Some(Value::Null) => None,
        Some(value) => Some(
            string_field(Some(&value), UserName::parse)
                .ok_or_else(|| AppError::BadRequest(INVALID_NAME.to_string()))?,
        ),
    };
    Ok(UserPatch { name, email })
}
