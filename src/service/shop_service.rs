//! Shop service: catalogue queries and the admin creation form.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::domain::shop::{REFERENCE_POINT_COLLECTION, REFERENCE_POINT_ID, SHOPS_COLLECTION};
use crate::domain::{BusinessHours, EventBus, MarkEvent, Shop, ShopId, ShopRecord};
use crate::error::MeshimapError;
use crate::geocode::Geocoder;
use crate::store::{DocPath, DocumentStore, Snapshot, encode};

/// Admin form input for a new shop.
#[derive(Debug, Clone, Default)]
pub struct NewShop {
    /// Display name (required).
    pub name: String,
    /// Postal address (required; geocoded).
    pub address: String,
    /// Cuisine / category.
    pub genre: String,
    /// Price band.
    pub price_range: String,
    /// Nearest station.
    pub station: String,
    /// Opening intervals, already normalised.
    pub business_hours: Vec<BusinessHours>,
}

/// Reads shops and creates new ones.
#[derive(Debug)]
pub struct ShopService {
    store: Arc<dyn DocumentStore>,
    geocoder: Arc<dyn Geocoder>,
    event_bus: EventBus,
}

impl ShopService {
    /// Creates a new `ShopService`.
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        geocoder: Arc<dyn Geocoder>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            store,
            geocoder,
            event_bus,
        }
    }

    /// Geocodes the address and stores a new shop.
    ///
    /// Nothing is written unless the address resolves.
    ///
    /// # Errors
    ///
    /// Returns [`MeshimapError::InvalidRequest`] if name or address is
    /// blank, [`MeshimapError::AddressNotFound`] if the geocoder has no
    /// match, and [`MeshimapError::Geocoder`] / [`MeshimapError::Store`] on
    /// collaborator failure.
    pub async fn create_shop(&self, input: NewShop) -> Result<Shop, MeshimapError> {
        let name = input.name.trim();
        let address = input.address.trim();
        if name.is_empty() {
            return Err(MeshimapError::InvalidRequest("shop name is required".to_string()));
        }
        if address.is_empty() {
            return Err(MeshimapError::InvalidRequest(
                "shop address is required".to_string(),
            ));
        }

        let location = self
            .geocoder
            .locate(address)
            .await?
            .ok_or_else(|| MeshimapError::AddressNotFound(address.to_string()))?;

        let id = ShopId::generate();
        let record = ShopRecord {
            name: name.to_string(),
            address: address.to_string(),
            genre: input.genre.trim().to_string(),
            price_range: input.price_range.trim().to_string(),
            station: input.station.trim().to_string(),
            location: Some(location),
            business_hours: input.business_hours,
            created_at: None,
        };

        let path = DocPath::new(&[SHOPS_COLLECTION, id.as_str()])?;
        self.store
            .set(&path, encode(&record)?, &["createdAt"])
            .await?;

        let _ = self.event_bus.publish(MarkEvent::ShopCreated {
            shop_id: id.clone(),
            name: record.name.clone(),
            genre: record.genre.clone(),
            station: record.station.clone(),
            timestamp: Utc::now(),
        });
        tracing::info!(shop_id = %id, name = %record.name, "shop created");

        // Read back so the caller sees the store-assigned timestamp.
        match self.store.get(&path).await? {
            Some(doc) => shop_from(&doc),
            None => Ok(Shop { id, record }),
        }
    }

    /// Fetches one shop by ID.
    ///
    /// # Errors
    ///
    /// Returns [`MeshimapError::ShopNotFound`] if it does not exist.
    pub async fn get_shop(&self, shop_id: &ShopId) -> Result<Shop, MeshimapError> {
        if shop_id.is_empty() {
            return Err(MeshimapError::ShopNotFound(String::new()));
        }
        let path = DocPath::new(&[SHOPS_COLLECTION, shop_id.as_str()])?;
        match self.store.get(&path).await? {
            Some(doc) => shop_from(&doc),
            None => Err(MeshimapError::ShopNotFound(shop_id.to_string())),
        }
    }

    /// Resolves a shop a user may mark: any catalogue shop, or the
    /// reference point under its fixed ID.
    ///
    /// # Errors
    ///
    /// Returns [`MeshimapError::ShopNotFound`] if neither exists.
    pub async fn find_markable(&self, shop_id: &ShopId) -> Result<Shop, MeshimapError> {
        match self.get_shop(shop_id).await {
            Err(MeshimapError::ShopNotFound(_)) if shop_id.as_str() == REFERENCE_POINT_ID => self
                .reference_point()
                .await?
                .ok_or_else(|| MeshimapError::ShopNotFound(shop_id.to_string())),
            other => other,
        }
    }

    /// All shops of a genre.
    ///
    /// # Errors
    ///
    /// Returns [`MeshimapError::Store`] on store failure.
    pub async fn shops_by_genre(&self, genre: &str) -> Result<Vec<Shop>, MeshimapError> {
        self.shops_where("genre", genre).await
    }

    /// All shops near a station.
    ///
    /// # Errors
    ///
    /// Returns [`MeshimapError::Store`] on store failure.
    pub async fn shops_by_station(&self, station: &str) -> Result<Vec<Shop>, MeshimapError> {
        self.shops_where("station", station).await
    }

    /// Every shop in the catalogue.
    ///
    /// # Errors
    ///
    /// Returns [`MeshimapError::Store`] on store failure.
    pub async fn all_shops(&self) -> Result<Vec<Shop>, MeshimapError> {
        let docs = self.store.list(SHOPS_COLLECTION).await?;
        docs.iter().map(shop_from).collect()
    }

    /// The reference point shown on every map, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns [`MeshimapError::Store`] on store failure.
    pub async fn reference_point(&self) -> Result<Option<Shop>, MeshimapError> {
        let path = DocPath::new(&[REFERENCE_POINT_COLLECTION, REFERENCE_POINT_ID])?;
        self.store.get(&path).await?.as_ref().map(shop_from).transpose()
    }

    async fn shops_where(&self, field: &str, value: &str) -> Result<Vec<Shop>, MeshimapError> {
        let docs = self
            .store
            .query_eq(SHOPS_COLLECTION, field, &Value::String(value.to_string()))
            .await?;
        tracing::debug!(field, value, count = docs.len(), "shop query");
        docs.iter().map(shop_from).collect()
    }
}

fn shop_from(doc: &Snapshot) -> Result<Shop, MeshimapError> {
    Ok(Shop {
        id: ShopId::new(doc.path.id()),
        record: doc.decode()?,
    })
}
