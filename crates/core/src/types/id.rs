//! Identifier newtypes.
//!
//! [`ItemId`] is the slug that identifies an item inside one account's
//! collection. [`SessionToken`] is the opaque key for an active session.

use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Slug identifier for an item, derived from the item's display name.
///
/// Every run of whitespace in the name becomes a single hyphen; all other
/// characters are kept as-is. Two names that differ only in the kind or
/// length of their whitespace runs map to the same id.
///
/// ```
/// use restock_core::ItemId;
///
/// assert_eq!(ItemId::from_name("Oat milk").as_str(), "Oat-milk");
/// assert_eq!(ItemId::from_name("AA  batteries\t(4)").as_str(), "AA-batteries-(4)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Derive the id for an item called `name`.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let mut slug = String::with_capacity(name.len());
        let mut in_whitespace = false;

        for c in name.chars() {
            if c.is_whitespace() {
                if !in_whitespace {
                    slug.push('-');
                }
                in_whitespace = true;
            } else {
                slug.push(c);
                in_whitespace = false;
            }
        }

        Self(slug)
    }

    /// Wrap an id received from a client (e.g. a query string).
    ///
    /// No normalisation happens here; lookups with an id that was never
    /// derived from a name simply find nothing.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the id and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Opaque key for an active session.
///
/// Generated on login/registration and handed to the transport layer (a
/// cookie session). It carries no meaning beyond identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(Uuid);

impl SessionToken {
    /// Generate a fresh random token.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for SessionToken {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_single_spaces() {
        assert_eq!(ItemId::from_name("paper towels").as_str(), "paper-towels");
    }

    #[test]
    fn test_slug_collapses_whitespace_runs() {
        assert_eq!(ItemId::from_name("dish \t\n soap").as_str(), "dish-soap");
    }

    #[test]
    fn test_slug_edges_keep_hyphen() {
        assert_eq!(ItemId::from_name("  coffee ").as_str(), "-coffee-");
    }

    #[test]
    fn test_slug_without_whitespace_is_identity() {
        assert_eq!(ItemId::from_name("Toothpaste").as_str(), "Toothpaste");
        assert_eq!(ItemId::from_name("").as_str(), "");
    }

    #[test]
    fn test_slug_keeps_case_and_punctuation() {
        assert_eq!(
            ItemId::from_name("Mr. Clean's Magic Eraser").as_str(),
            "Mr.-Clean's-Magic-Eraser"
        );
    }

    #[test]
    fn test_item_id_serde_transparent() {
        let id = ItemId::from_name("green tea");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"green-tea\"");

        let parsed: ItemId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_session_tokens_are_unique() {
        assert_ne!(SessionToken::generate(), SessionToken::generate());
    }

    #[test]
    fn test_session_token_serde_roundtrip() {
        let token = SessionToken::generate();
        let json = serde_json::to_string(&token).unwrap();
        let parsed: SessionToken = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, token);
    }
}
