//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use chrono::FixedOffset;

use crate::domain::EventBus;
use crate::geocode::Geocoder;
use crate::service::{MarkService, RankingService, ShopService, UserService};
use crate::store::DocumentStore;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Bookmark / visited flags.
    pub mark_service: Arc<MarkService>,
    /// Monthly leaderboard.
    pub ranking_service: Arc<RankingService>,
    /// Shop catalogue and admin form.
    pub shop_service: Arc<ShopService>,
    /// User profiles.
    pub user_service: Arc<UserService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}

impl AppState {
    /// Wires every service onto one store, geocoder and event bus.
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        geocoder: Arc<dyn Geocoder>,
        event_bus: EventBus,
        ranking_limit: usize,
        calendar: FixedOffset,
    ) -> Self {
        Self {
            mark_service: Arc::new(MarkService::new(Arc::clone(&store), event_bus.clone())),
            ranking_service: Arc::new(RankingService::new(
                Arc::clone(&store),
                ranking_limit,
                calendar,
            )),
            shop_service: Arc::new(ShopService::new(
                Arc::clone(&store),
                geocoder,
                event_bus.clone(),
            )),
            user_service: Arc::new(UserService::new(store)),
            event_bus,
        }
    }
}
