//! Restock Core - Shared domain types.
//!
//! This crate provides the types used across all Restock components:
//! - `server` - Purchase history service (sessions, items, cart)
//! - `cli` - Command-line tools for migrations and account management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for item slugs, usernames, session tokens,
//!   purchase dates and session state

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
