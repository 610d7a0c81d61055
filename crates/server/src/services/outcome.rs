//! Operation kinds and their result messages.
//!
//! Every mutating operation finishes with exactly one [`Outcome`], which maps
//! to exactly one human-readable message for the caller.

use std::borrow::Cow;
use std::fmt;

use super::ServiceError;

/// Shown when registering a username that is taken.
pub const ACCOUNT_EXISTS_MESSAGE: &str =
    "Account already exists, try logging in if this is you, or choose a different name";
/// Shown when login details do not match an account.
pub const INVALID_CREDENTIALS_MESSAGE: &str =
    "Incorrect login details, review your input or try registering";
/// Shown when an item name (or its slug) is already in use.
pub const DUPLICATE_ITEM_MESSAGE: &str = "Item already exists";
/// Shown when an operation references an item the account does not have.
pub const ITEM_NOT_FOUND_MESSAGE: &str = "Item not found";
/// Shown when a session-scoped operation runs without a session.
pub const NO_SESSION_MESSAGE: &str = "No active session, please log in";

/// The kinds of mutating operation, each with its own completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Registration,
    Login,
    Entry,
    Update,
    Delete,
    CartAddition,
    CartRemoval,
    CartClear,
    CartCheckout,
}

impl Operation {
    /// Name of the completion event for this operation.
    #[must_use]
    pub const fn event_name(self) -> &'static str {
        match self {
            Self::Registration => "registration-complete",
            Self::Login => "login-complete",
            Self::Entry => "entry-complete",
            Self::Update => "update-complete",
            Self::Delete => "delete-complete",
            Self::CartAddition => "cart-addition-complete",
            Self::CartRemoval => "cart-removal-complete",
            Self::CartClear => "cart-clear-complete",
            Self::CartCheckout => "cart-checkout-complete",
        }
    }

    /// Message reported when the operation succeeds.
    #[must_use]
    pub const fn success_message(self) -> &'static str {
        match self {
            Self::Registration | Self::Login => "success",
            Self::Entry => "Item successfully entered into database",
            Self::Update => "Item successfully updated",
            Self::Delete => "Item deleted successfully.",
            Self::CartAddition => "Item added to cart successfully",
            Self::CartRemoval => "Item removed from cart successfully",
            Self::CartClear => "Cart cleared successfully",
            Self::CartCheckout => "Transaction recorded successfully",
        }
    }

    /// Message reported when the store fails and state has been restored.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Registration => "An error has occured in the registration process",
            Self::Login => "An error has occured in the authentication process",
            Self::Entry => {
                "An error has occured in the item creation process. Your account has been reverted to its previous state"
            }
            Self::Update => {
                "An error has occured in the update process. The item has been restored to its previous state"
            }
            Self::Delete => {
                "An error has occured in the deletion process. The item has been preserved"
            }
            Self::CartAddition => {
                "An error has occured when adding item to cart. The cart's previous state has been restored"
            }
            Self::CartRemoval => {
                "An error has occured when removing item from cart. The cart's previous state has been restored"
            }
            Self::CartClear => {
                "An error has occured when clearing the cart. The cart's previous state has been restored"
            }
            Self::CartCheckout => {
                "An error has occured in the recording process. The previous state of the cart and its contents has been restored"
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

/// The single result of one mutating operation.
#[derive(Debug)]
pub struct Outcome<T = ()> {
    operation: Operation,
    result: Result<T, ServiceError>,
}

impl<T> Outcome<T> {
    /// Wrap the result of `operation`.
    #[must_use]
    pub const fn new(operation: Operation, result: Result<T, ServiceError>) -> Self {
        Self { operation, result }
    }

    /// The operation this outcome belongs to.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    /// Whether the operation succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Borrow the value, if the operation succeeded.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        self.result.as_ref().ok()
    }

    /// Borrow the error, if the operation failed.
    #[must_use]
    pub fn error(&self) -> Option<&ServiceError> {
        self.result.as_ref().err()
    }

    /// Consume the outcome, returning the underlying result.
    ///
    /// # Errors
    ///
    /// Returns the operation's error if it failed.
    pub fn into_result(self) -> Result<T, ServiceError> {
        self.result
    }

    /// The message shown to the caller.
    #[must_use]
    pub fn message(&self) -> Cow<'static, str> {
        match &self.result {
            Ok(_) => Cow::Borrowed(self.operation.success_message()),
            Err(err) => client_message(err)
                .unwrap_or_else(|| Cow::Borrowed(self.operation.failure_message())),
        }
    }
}

/// The message a client sees for `err`.
///
/// Returns `None` for server-side failures, whose wording depends on where
/// they happened.
#[must_use]
pub fn client_message(err: &ServiceError) -> Option<Cow<'static, str>> {
    let message = match err {
        ServiceError::AlreadyExists => Cow::Borrowed(ACCOUNT_EXISTS_MESSAGE),
        ServiceError::InvalidCredentials => Cow::Borrowed(INVALID_CREDENTIALS_MESSAGE),
        ServiceError::DuplicateName => Cow::Borrowed(DUPLICATE_ITEM_MESSAGE),
        ServiceError::NotFound => Cow::Borrowed(ITEM_NOT_FOUND_MESSAGE),
        ServiceError::NoActiveSession => Cow::Borrowed(NO_SESSION_MESSAGE),
        ServiceError::InvalidUsername(e) => Cow::Owned(capitalize(&e.to_string())),
        ServiceError::InvalidItem(e) => Cow::Owned(capitalize(&e.to_string())),
        ServiceError::InvalidPassword(msg) => Cow::Owned(capitalize(msg)),
        ServiceError::PasswordHash | ServiceError::Persistence(_) => return None,
    };
    Some(message)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::RepositoryError;

    #[test]
    fn test_event_names_are_distinct() {
        let all = [
            Operation::Registration,
            Operation::Login,
            Operation::Entry,
            Operation::Update,
            Operation::Delete,
            Operation::CartAddition,
            Operation::CartRemoval,
            Operation::CartClear,
            Operation::CartCheckout,
        ];
        let names: std::collections::HashSet<_> = all.iter().map(|op| op.event_name()).collect();
        assert_eq!(names.len(), all.len());
        assert_eq!(Operation::Delete.to_string(), "delete-complete");
    }

    #[test]
    fn test_success_messages() {
        assert_eq!(Outcome::new(Operation::Login, Ok(())).message(), "success");
        assert_eq!(
            Outcome::new(Operation::CartCheckout, Ok(())).message(),
            "Transaction recorded successfully"
        );
    }

    #[test]
    fn test_persistence_failure_uses_operation_message() {
        let outcome: Outcome = Outcome::new(
            Operation::Delete,
            Err(ServiceError::Persistence(RepositoryError::NotFound)),
        );
        assert_eq!(
            outcome.message(),
            "An error has occured in the deletion process. The item has been preserved"
        );
    }

    #[test]
    fn test_not_found_is_plain() {
        let outcome: Outcome = Outcome::new(Operation::Update, Err(ServiceError::NotFound));
        assert_eq!(outcome.message(), ITEM_NOT_FOUND_MESSAGE);
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_validation_message_is_capitalized() {
        let outcome: Outcome = Outcome::new(
            Operation::Registration,
            Err(ServiceError::InvalidPassword("password cannot be empty".to_owned())),
        );
        assert_eq!(outcome.message(), "Password cannot be empty");
    }
}
