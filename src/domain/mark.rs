//! Per-user existence flags on shops: bookmarks and visits.
//!
//! A mark is a document at `users/{uid}/{collection}/{shopId}`. Its
//! presence *is* the flag; there is no boolean field. The document carries
//! a snapshot of the shop taken when the mark was set, which is never
//! refreshed afterwards.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::{Shop, ShopId, UserId};
use crate::error::MeshimapError;
use crate::store::{DocPath, Fields, Snapshot, parse_timestamp};

/// Top-level collection of user profiles; marks live beneath it.
pub const USERS_COLLECTION: &str = "users";

/// The two independent flag axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MarkKind {
    /// Saved for later.
    Bookmark,
    /// Been there; timestamped for the monthly ranking.
    Visited,
}

impl MarkKind {
    /// Sub-collection name under the user document.
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Bookmark => "bookmarks",
            Self::Visited => "visited",
        }
    }

    /// Field holding the store-assigned time the mark was set.
    #[must_use]
    pub const fn timestamp_field(self) -> &'static str {
        match self {
            Self::Bookmark => "createdAt",
            Self::Visited => "visitedAt",
        }
    }

    /// Path of the mark document for `(user, shop)`.
    ///
    /// # Errors
    ///
    /// Returns [`MeshimapError::InvalidRequest`] if either ID is blank or
    /// contains `/`.
    pub fn path(self, user_id: &UserId, shop_id: &ShopId) -> Result<DocPath, MeshimapError> {
        DocPath::new(&[
            USERS_COLLECTION,
            user_id.as_str(),
            self.collection(),
            shop_id.as_str(),
        ])
    }

    /// Path of the collection holding all of a user's marks of this kind.
    #[must_use]
    pub fn collection_path(self, user_id: &UserId) -> String {
        format!("{USERS_COLLECTION}/{user_id}/{}", self.collection())
    }

    /// Fields written when the mark is set. The timestamp field is left
    /// for the store to fill in.
    #[must_use]
    pub fn snapshot_fields(self, shop: &Shop) -> Fields {
        let record = &shop.record;
        let mut fields = Fields::new();
        match self {
            Self::Bookmark => {
                fields.insert("shopId".into(), Value::String(shop.id.to_string()));
                fields.insert("name".into(), Value::String(record.name.clone()));
                fields.insert("address".into(), Value::String(record.address.clone()));
                fields.insert("genre".into(), Value::String(record.genre.clone()));
                fields.insert("priceRange".into(), non_blank(&record.price_range));
                fields.insert("station".into(), non_blank(&record.station));
            }
            Self::Visited => {
                fields.insert("name".into(), Value::String(record.name.clone()));
                fields.insert("address".into(), Value::String(record.address.clone()));
                fields.insert("genre".into(), Value::String(record.genre.clone()));
            }
        }
        fields
    }
}

fn non_blank(value: &str) -> Value {
    if value.is_empty() {
        Value::Null
    } else {
        Value::String(value.to_string())
    }
}

impl fmt::Display for MarkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bookmark => "bookmark",
            Self::Visited => "visited",
        })
    }
}

impl FromStr for MarkKind {
    type Err = MeshimapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bookmark" | "bookmarks" => Ok(Self::Bookmark),
            "visited" | "visit" | "visits" => Ok(Self::Visited),
            other => Err(MeshimapError::InvalidRequest(format!(
                "unknown mark kind: {other}"
            ))),
        }
    }
}

/// A bookmark or visit as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Mark {
    /// Which flag this is.
    pub kind: MarkKind,
    /// Shop the mark refers to (the document ID).
    pub shop_id: ShopId,
    /// Shop name at the time the mark was set.
    pub name: String,
    /// Shop address at the time the mark was set.
    pub address: String,
    /// Shop genre at the time the mark was set.
    pub genre: String,
    /// Price band snapshot (bookmarks only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,
    /// Station snapshot (bookmarks only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station: Option<String>,
    /// Store-assigned time the mark was set.
    pub marked_at: Option<DateTime<Utc>>,
}

impl Mark {
    /// Reads a mark document of the given kind.
    #[must_use]
    pub fn from_snapshot(kind: MarkKind, snapshot: &Snapshot) -> Self {
        let text = |key: &str| {
            snapshot
                .fields
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        Self {
            kind,
            shop_id: ShopId::new(snapshot.path.id()),
            name: text("name").unwrap_or_default(),
            address: text("address").unwrap_or_default(),
            genre: text("genre").unwrap_or_default(),
            price_range: text("priceRange"),
            station: text("station"),
            marked_at: snapshot
                .fields
                .get(kind.timestamp_field())
                .and_then(parse_timestamp),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::ShopRecord;

    fn shop() -> Shop {
        Shop {
            id: ShopId::new("s1"),
            record: ShopRecord {
                name: "Cafe X".to_string(),
                address: "1-1 Shibuya".to_string(),
                genre: "cafe".to_string(),
                price_range: String::new(),
                station: "Shibuya".to_string(),
                location: None,
                business_hours: vec![],
                created_at: None,
            },
        }
    }

    #[test]
    fn paths_are_keyed_by_shop() {
        let Ok(path) = MarkKind::Visited.path(&UserId::new("u1"), &ShopId::new("s1")) else {
            panic!("valid path");
        };
        assert_eq!(path.as_str(), "users/u1/visited/s1");
        assert_eq!(
            MarkKind::Bookmark.collection_path(&UserId::new("u1")),
            "users/u1/bookmarks"
        );
    }

    #[test]
    fn empty_ids_do_not_form_a_path() {
        assert!(
            MarkKind::Bookmark
                .path(&UserId::new(""), &ShopId::new("s1"))
                .is_err()
        );
        assert!(
            MarkKind::Bookmark
                .path(&UserId::new("u1"), &ShopId::new(""))
                .is_err()
        );
    }

    #[test]
    fn bookmark_snapshot_nulls_blank_optionals() {
        let fields = MarkKind::Bookmark.snapshot_fields(&shop());
        assert_eq!(fields.get("shopId"), Some(&Value::String("s1".into())));
        assert_eq!(fields.get("priceRange"), Some(&Value::Null));
        assert_eq!(fields.get("station"), Some(&Value::String("Shibuya".into())));
        assert!(!fields.contains_key("createdAt"));
    }

    #[test]
    fn visited_snapshot_is_minimal() {
        let fields = MarkKind::Visited.snapshot_fields(&shop());
        let mut keys: Vec<&str> = fields.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["address", "genre", "name"]);
    }

    #[test]
    fn kind_parses_from_route_segment() {
        assert_eq!("bookmarks".parse::<MarkKind>().ok(), Some(MarkKind::Bookmark));
        assert_eq!("visited".parse::<MarkKind>().ok(), Some(MarkKind::Visited));
        assert!("likes".parse::<MarkKind>().is_err());
    }
}
