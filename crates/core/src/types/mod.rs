//! Core types for Userbase.
//!
//! This module provides type-safe wrappers for the user entity and its fields.

pub mod email;
pub mod id;
pub mod name;
pub mod page;
pub mod user;

pub use email::{Email, EmailError};
pub use id::{UserId, UserIdError};
pub use name::{UserName, UserNameError};
pub use page::{PageInfo, PageRequest};
pub use user::{User, UserPatch};
