//! Account domain type.

use serde::{Deserialize, Serialize};

use restock_core::{ItemId, Username};

use super::item::Item;

/// A registered account together with its embedded item catalog.
///
/// This is the unit of persistence: every save writes the whole document.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    /// Unique identity key.
    pub username: Username,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// The account's items, in no particular order.
    #[serde(default)]
    pub items: Vec<Item>,
}

impl std::fmt::Debug for UserAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserAccount")
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("items", &self.items)
            .finish()
    }
}

impl UserAccount {
    /// Create an account with an empty catalog.
    #[must_use]
    pub const fn new(username: Username, password_hash: String) -> Self {
        Self {
            username,
            password_hash,
            items: Vec::new(),
        }
    }

    /// Position of the first item with `id`.
    #[must_use]
    pub fn position(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    /// Look up an item by id.
    #[must_use]
    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Look up an item by id for mutation.
    pub fn item_mut(&mut self, id: &ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| &item.id == id)
    }

    /// Whether any item has exactly this display name.
    #[must_use]
    pub fn has_item_named(&self, name: &str) -> bool {
        self.items.iter().any(|item| item.name == name)
    }

    /// Number of items currently in the cart.
    #[must_use]
    pub fn cart_len(&self) -> usize {
        self.items.iter().filter(|item| item.in_cart).count()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn item(name: &str, in_cart: bool) -> Item {
        Item {
            id: ItemId::from_name(name),
            name: name.to_owned(),
            links: Vec::new(),
            description: String::new(),
            comments: Vec::new(),
            last_purchased: Utc.with_ymd_and_hms(2024, 1, 1, 4, 0, 0).unwrap(),
            in_cart,
            image_data: String::new(),
        }
    }

    fn account() -> UserAccount {
        let mut account =
            UserAccount::new(Username::parse("sam").unwrap(), "$argon2id$x".to_owned());
        account.items = vec![item("oat milk", true), item("rice", false)];
        account
    }

    #[test]
    fn test_lookup_by_id() {
        let account = account();
        let id = ItemId::from_name("oat milk");
        assert_eq!(account.position(&id), Some(0));
        assert_eq!(account.item(&id).unwrap().name, "oat milk");
        assert!(account.item(&ItemId::new("nope")).is_none());
    }

    #[test]
    fn test_has_item_named_is_exact() {
        let account = account();
        assert!(account.has_item_named("rice"));
        assert!(!account.has_item_named("Rice"));
        assert!(!account.has_item_named("rice "));
    }

    #[test]
    fn test_cart_len() {
        assert_eq!(account().cart_len(), 1);
    }

    #[test]
    fn test_debug_redacts_password_hash() {
        let output = format!("{:?}", account());
        assert!(output.contains("[REDACTED]"));
        assert!(!output.contains("argon2id"));
    }

    #[test]
    fn test_document_roundtrip() {
        let account = account();
        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["username"], "sam");
        assert_eq!(json["items"][0]["inCart"], true);

        let parsed: UserAccount = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, account);
    }
}
