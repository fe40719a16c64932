//! Shop entity as stored in the `shops` collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ShopId;

/// Collection holding every shop document.
pub const SHOPS_COLLECTION: &str = "shops";

/// Collection and document ID of the singleton reference point.
pub const REFERENCE_POINT_COLLECTION: &str = "default";
/// Document ID of the singleton reference point.
pub const REFERENCE_POINT_ID: &str = "default";

/// Label applied to business hours submitted without one.
pub const DEFAULT_HOURS_LABEL: &str = "営業時間";

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    /// Degrees north.
    pub latitude: f64,
    /// Degrees east.
    pub longitude: f64,
}

/// One opening interval, e.g. `ランチ 1100–1500`.
///
/// Times are plain integers in `HHMM` form as entered on the admin form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BusinessHours {
    /// Free-text label ("ランチ", "ディナー", ...).
    pub label: String,
    /// Opening time, `HHMM`.
    pub open: i32,
    /// Closing time, `HHMM`.
    pub close: i32,
}

impl BusinessHours {
    /// Normalises raw form input: blank labels get [`DEFAULT_HOURS_LABEL`]
    /// and unparsable times become `0`.
    #[must_use]
    pub fn from_form(label: &str, open: &str, close: &str) -> Self {
        let label = label.trim();
        Self {
            label: if label.is_empty() {
                DEFAULT_HOURS_LABEL.to_string()
            } else {
                label.to_string()
            },
            open: parse_leading_int(open),
            close: parse_leading_int(close),
        }
    }
}

/// Parses the leading decimal digits of `raw`, returning `0` if there
/// are none. `"11:00"` therefore yields `11`, matching how the form's
/// numeric fields have always been read.
fn parse_leading_int(raw: &str) -> i32 {
    let raw = raw.trim();
    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits
        .get(..end)
        .and_then(|d| d.parse::<i32>().ok())
        .map_or(0, |v| v.saturating_mul(sign))
}

/// Stored fields of a shop document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShopRecord {
    /// Display name.
    pub name: String,
    /// Free-text postal address.
    pub address: String,
    /// Cuisine / category.
    #[serde(default)]
    pub genre: String,
    /// Price band as entered, e.g. `800-2000`.
    #[serde(default)]
    pub price_range: String,
    /// Nearest train station.
    #[serde(default)]
    pub station: String,
    /// Geocoded position.
    #[serde(rename = "LatLng", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    /// Opening intervals in display order.
    #[serde(default)]
    pub business_hours: Vec<BusinessHours>,
    /// Store-assigned creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A shop together with its document ID.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Shop {
    /// Document ID.
    pub id: ShopId,
    /// Stored fields.
    #[serde(flatten)]
    pub record: ShopRecord,
}

impl Shop {
    /// Returns `true` if this is the reference point document.
    #[must_use]
    pub fn is_reference_point(&self) -> bool {
        self.id.as_str() == REFERENCE_POINT_ID
    }
}
