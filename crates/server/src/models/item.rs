//! Item domain types.
//!
//! [`ItemForm`] is the raw authoring form as submitted by a client,
//! [`ItemDraft`] its validated form, and [`Item`] the stored entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use restock_core::{ItemId, PurchaseDateError, parse_purchase_date, purchase_date_string};

/// Something the account owner buys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Slug derived from `name`.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// External URLs.
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub description: String,
    /// Free-form notes, stored verbatim.
    #[serde(default)]
    pub comments: Vec<String>,
    /// When the item was last bought.
    pub last_purchased: DateTime<Utc>,
    /// Whether the item is in the cart.
    #[serde(default)]
    pub in_cart: bool,
    /// Opaque data URL for the item's picture.
    #[serde(default)]
    pub image_data: String,
}

impl Item {
    /// Build a new item (not in the cart) from a validated draft.
    #[must_use]
    pub fn from_draft(draft: ItemDraft) -> Self {
        Self {
            id: draft.id(),
            name: draft.name,
            links: draft.links,
            description: draft.description,
            comments: draft.comments,
            last_purchased: draft.last_purchased,
            in_cart: false,
            image_data: draft.image_data,
        }
    }

    /// Overwrite every authored field from `draft`, recomputing the id.
    ///
    /// The cart flag is not part of the authoring form and is kept.
    pub fn apply(&mut self, draft: ItemDraft) {
        self.id = draft.id();
        self.name = draft.name;
        self.links = draft.links;
        self.description = draft.description;
        self.comments = draft.comments;
        self.last_purchased = draft.last_purchased;
        self.image_data = draft.image_data;
    }
}

/// Sort items by `last_purchased`, most recent first.
///
/// The sort is stable, so items stamped by the same checkout keep their
/// relative order.
pub fn sort_by_recency(items: &mut [Item]) {
    items.sort_by(|a, b| b.last_purchased.cmp(&a.last_purchased));
}

/// Errors produced while validating an [`ItemForm`].
#[derive(Debug, thiserror::Error)]
pub enum ItemFormError {
    #[error("item name cannot be empty")]
    EmptyName,

    #[error("links must be a JSON array of strings: {0}")]
    Links(#[source] serde_json::Error),

    #[error("comments must be a JSON array of strings: {0}")]
    Comments(#[source] serde_json::Error),

    #[error(transparent)]
    LastPurchased(#[from] PurchaseDateError),
}

/// Raw item authoring form.
///
/// `links` and `comments` arrive JSON-encoded, exactly as the edit form
/// received them in [`ItemProfile::links_json`] / [`ItemProfile::comments_json`].
#[derive(Debug, Clone, Deserialize)]
pub struct ItemForm {
    #[serde(rename = "ItemName")]
    pub item_name: String,
    #[serde(rename = "Links", default)]
    pub links: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Comments", default)]
    pub comments: String,
    #[serde(rename = "LastPurchased")]
    pub last_purchased: String,
    #[serde(rename = "ImageDataURL", default)]
    pub image_data_url: String,
}

/// A validated item form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    pub name: String,
    pub links: Vec<String>,
    pub description: String,
    pub comments: Vec<String>,
    pub last_purchased: DateTime<Utc>,
    pub image_data: String,
}

impl ItemDraft {
    /// Validate a raw form.
    ///
    /// Blank `links`/`comments` fields are treated as empty arrays.
    ///
    /// # Errors
    ///
    /// Returns `ItemFormError` if the name is blank, if `links` or `comments`
    /// is not a JSON array of strings, or if the date is not `YYYY-MM-DD`.
    pub fn parse(form: ItemForm) -> Result<Self, ItemFormError> {
        if form.item_name.trim().is_empty() {
            return Err(ItemFormError::EmptyName);
        }

        let links = parse_string_array(&form.links).map_err(ItemFormError::Links)?;
        let comments = parse_string_array(&form.comments).map_err(ItemFormError::Comments)?;
        let last_purchased = parse_purchase_date(&form.last_purchased)?;

        Ok(Self {
            name: form.item_name,
            links,
            description: form.description,
            comments,
            last_purchased,
            image_data: form.image_data_url,
        })
    }

    /// The id an item built from this draft will have.
    #[must_use]
    pub fn id(&self) -> ItemId {
        ItemId::from_name(&self.name)
    }
}

fn parse_string_array(raw: &str) -> Result<Vec<String>, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw)
}

/// Everything a client needs to show (or edit) one item.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemProfile {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    /// `YYYY-MM-DD`
    pub last_purchased: String,
    pub comments: Vec<String>,
    pub links: Vec<String>,
    /// `comments` encoded for an edit form's hidden field.
    pub comments_json: String,
    /// `links` encoded for an edit form's hidden field.
    pub links_json: String,
    pub image: String,
    pub in_cart: bool,
}

impl ItemProfile {
    /// Build the profile view of `item`.
    ///
    /// # Errors
    ///
    /// Returns an error if the comment or link lists cannot be encoded.
    pub fn from_item(item: &Item) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: item.id.clone(),
            name: item.name.clone(),
            description: item.description.clone(),
            last_purchased: purchase_date_string(&item.last_purchased),
            comments: item.comments.clone(),
            links: item.links.clone(),
            comments_json: serde_json::to_string(&item.comments)?,
            links_json: serde_json::to_string(&item.links)?,
            image: item.image_data.clone(),
            in_cart: item.in_cart,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn form(name: &str) -> ItemForm {
        ItemForm {
            item_name: name.to_owned(),
            links: r#"["https://shop.example/oat-milk"]"#.to_owned(),
            description: "barista edition".to_owned(),
            comments: r#"["get the 1L carton"]"#.to_owned(),
            last_purchased: "2024-05-01".to_owned(),
            image_data_url: "data:image/png;base64,AAAA".to_owned(),
        }
    }

    #[test]
    fn test_parse_valid_form() {
        let draft = ItemDraft::parse(form("oat milk")).unwrap();
        assert_eq!(draft.id().as_str(), "oat-milk");
        assert_eq!(draft.links, vec!["https://shop.example/oat-milk"]);
        assert_eq!(draft.comments, vec!["get the 1L carton"]);
        assert_eq!(
            draft.last_purchased,
            Utc.with_ymd_and_hms(2024, 5, 1, 4, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_blank_arrays_are_empty() {
        let mut raw = form("rice");
        raw.links = String::new();
        raw.comments = "  ".to_owned();
        let draft = ItemDraft::parse(raw).unwrap();
        assert!(draft.links.is_empty());
        assert!(draft.comments.is_empty());
    }

    #[test]
    fn test_parse_rejects_blank_name() {
        assert!(matches!(
            ItemDraft::parse(form("   ")),
            Err(ItemFormError::EmptyName)
        ));
    }

    #[test]
    fn test_parse_rejects_malformed_arrays() {
        let mut raw = form("rice");
        raw.comments = "not json".to_owned();
        assert!(matches!(
            ItemDraft::parse(raw),
            Err(ItemFormError::Comments(_))
        ));

        let mut raw = form("rice");
        raw.links = r#"{"a": 1}"#.to_owned();
        assert!(matches!(ItemDraft::parse(raw), Err(ItemFormError::Links(_))));
    }

    #[test]
    fn test_parse_rejects_bad_date() {
        let mut raw = form("rice");
        raw.last_purchased = "yesterday".to_owned();
        assert!(matches!(
            ItemDraft::parse(raw),
            Err(ItemFormError::LastPurchased(_))
        ));
    }

    #[test]
    fn test_apply_keeps_cart_flag_and_renames() {
        let mut item = Item::from_draft(ItemDraft::parse(form("oat milk")).unwrap());
        item.in_cart = true;

        item.apply(ItemDraft::parse(form("soy milk")).unwrap());
        assert_eq!(item.id.as_str(), "soy-milk");
        assert_eq!(item.name, "soy milk");
        assert!(item.in_cart);
    }

    #[test]
    fn test_sort_by_recency_is_descending_and_stable() {
        let draft = ItemDraft::parse(form("a")).unwrap();
        let mut older = Item::from_draft(draft.clone());
        older.last_purchased = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let mut first = Item::from_draft(draft.clone());
        first.name = "first".to_owned();
        let mut second = Item::from_draft(draft);
        second.name = "second".to_owned();

        let mut items = vec![older, first, second];
        sort_by_recency(&mut items);
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["first", "second", "a"]);
    }

    #[test]
    fn test_comments_with_quotes_survive_profile_roundtrip() {
        let mut raw = form("tea");
        raw.comments = serde_json::to_string(&vec![
            r#"she said "the green one""#.to_owned(),
            "it's fine".to_owned(),
        ])
        .unwrap();
        let item = Item::from_draft(ItemDraft::parse(raw).unwrap());
        assert_eq!(item.comments[0], r#"she said "the green one""#);

        // Edit form resubmits the encoded list untouched
        let profile = ItemProfile::from_item(&item).unwrap();
        let mut resubmitted = form("tea");
        resubmitted.comments = profile.comments_json;
        let draft = ItemDraft::parse(resubmitted).unwrap();
        assert_eq!(draft.comments, item.comments);
    }

    #[test]
    fn test_profile_date_string() {
        let item = Item::from_draft(ItemDraft::parse(form("tea")).unwrap());
        let profile = ItemProfile::from_item(&item).unwrap();
        assert_eq!(profile.last_purchased, "2024-05-01");
        assert_eq!(profile.links_json, r#"["https://shop.example/oat-milk"]"#);
    }
}
