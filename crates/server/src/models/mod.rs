//! Domain models for the purchase history service.
//!
//! An account is persisted as a single document with its items embedded.

pub mod account;
pub mod item;
pub mod session;

pub use account::UserAccount;
pub use item::{Item, ItemDraft, ItemForm, ItemFormError, ItemProfile, sort_by_recency};
pub use session::keys as session_keys;
