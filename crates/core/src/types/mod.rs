//! Core types for Restock.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod purchase_date;
pub mod status;
pub mod username;

pub use id::{ItemId, SessionToken};
pub use purchase_date::{PURCHASE_HOUR, PurchaseDateError, parse_purchase_date, purchase_date_string};
pub use status::SessionState;
pub use username::{Username, UsernameError};
