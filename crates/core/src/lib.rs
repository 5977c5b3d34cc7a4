//! Userbase Core - Shared types library.
//!
//! This crate provides the validated domain types used by every Userbase
//! component:
//! - `server` - JSON-over-HTTP user API
//! - `cli` - Command-line tools for inspecting and seeding the data file
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no file access,
//! no HTTP. Anything that holds a `User` has already passed validation.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for user ids, names, emails, and pagination

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
