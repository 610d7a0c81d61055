//! Business logic services.
//!
//! # Services
//!
//! - `sessions` - Registration, login, logout and session lookup
//! - `items` - Item catalog create/update/delete
//! - `cart` - Cart flags, clear and checkout
//!
//! Every mutating item or cart operation goes through
//! [`persist_or_revert`], and request handlers run them via
//! [`completion::dispatch`] so each call completes exactly once.

pub mod cart;
pub mod completion;
mod error;
pub mod items;
pub mod outcome;
pub mod sessions;
mod transaction;

pub use cart::CartController;
pub use completion::{Completion, CompletionError, CompletionSignal, dispatch};
pub use error::ServiceError;
pub use items::ItemStore;
pub use outcome::{Operation, Outcome};
pub use sessions::{ActiveSession, SessionManager, SessionStatus, create_account};
pub use transaction::persist_or_revert;
