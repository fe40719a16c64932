//! Shop DTOs: catalogue queries and the admin creation form.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::PaginationMeta;
use crate::domain::{BusinessHours, Shop};
use crate::service::NewShop;

/// Filters for `GET /shops`. At most one of `genre` and `station` may be
/// given; with neither the whole catalogue is listed.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ShopFilter {
    /// Exact genre match.
    pub genre: Option<String>,
    /// Exact nearest-station match.
    pub station: Option<String>,
}

/// A time field as typed into the form: text such as `"1100"` or a number.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum TimeInput {
    /// Already numeric.
    Number(i64),
    /// Raw text.
    Text(String),
}

impl TimeInput {
    fn as_text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

/// One business-hours row of the admin form.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BusinessHoursInput {
    /// Label; blank gets the default label.
    #[serde(default)]
    pub label: String,
    /// Opening time, `HHMM`.
    pub open: Option<TimeInput>,
    /// Closing time, `HHMM`.
    pub close: Option<TimeInput>,
}

/// Request body for `POST /shops`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateShopRequest {
    /// Shop name.
    pub name: String,
    /// Postal address, geocoded on submit.
    pub address: String,
    /// Cuisine / category.
    #[serde(default)]
    pub genre: String,
    /// Price band, e.g. `800-2000`.
    #[serde(default, alias = "priceRange")]
    pub price_range: String,
    /// Nearest station.
    #[serde(default)]
    pub station: String,
    /// Opening intervals.
    #[serde(default, alias = "businessHours")]
    pub business_hours: Vec<BusinessHoursInput>,
}

impl From<CreateShopRequest> for NewShop {
    fn from(req: CreateShopRequest) -> Self {
        let text = |t: &Option<TimeInput>| t.as_ref().map(TimeInput::as_text).unwrap_or_default();
        Self {
            name: req.name,
            address: req.address,
            genre: req.genre,
            price_range: req.price_range,
            station: req.station,
            business_hours: req
                .business_hours
                .iter()
                .map(|h| BusinessHours::from_form(&h.label, &text(&h.open), &text(&h.close)))
                .collect(),
        }
    }
}

/// Paginated list response for `GET /shops`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ShopListResponse {
    /// Shops on this page.
    pub data: Vec<Shop>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::shop::DEFAULT_HOURS_LABEL;

    #[test]
    fn form_accepts_text_and_numeric_times() {
        let Ok(req) = serde_json::from_str::<CreateShopRequest>(
            r#"{
                "name": "Cafe X",
                "address": "Shibuya",
                "priceRange": "800-2000",
                "business_hours": [
                    {"label": "", "open": "1100", "close": 1500},
                    {"label": "ディナー", "open": "abc"}
                ]
            }"#,
        ) else {
            panic!("request should parse");
        };
        let shop = NewShop::from(req);
        assert_eq!(shop.price_range, "800-2000");
        assert_eq!(
            shop.business_hours,
            vec![
                BusinessHours {
                    label: DEFAULT_HOURS_LABEL.to_string(),
                    open: 1100,
                    close: 1500,
                },
                BusinessHours {
                    label: "ディナー".to_string(),
                    open: 0,
                    close: 0,
                },
            ]
        );
    }
}
