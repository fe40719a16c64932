//! Per-connection subscription manager.
//!
//! Tracks which shops a WebSocket client watches and filters events
//! server-side.

use std::collections::HashSet;

use crate::domain::ShopId;

/// Wildcard token subscribing to every shop.
pub const WILDCARD: &str = "*";

/// Manages the set of shop subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed shop IDs. Ignored while `subscribe_all` is set.
    shop_ids: HashSet<ShopId>,
    /// Whether the client subscribes to all shops.
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds shop IDs to the subscription set. [`WILDCARD`] enables
    /// everything; blank IDs are skipped. Returns the IDs actually added.
    pub fn subscribe(&mut self, ids: &[String]) -> Vec<ShopId> {
        let mut added = Vec::new();
        for raw in ids {
            if raw == WILDCARD {
                self.subscribe_all = true;
                continue;
            }
            let id = ShopId::new(raw.trim());
            if id.is_empty() {
                continue;
            }
            if self.shop_ids.insert(id.clone()) {
                added.push(id);
            }
        }
        added
    }

    /// Removes shop IDs from the subscription set. [`WILDCARD`] turns the
    /// wildcard off.
    pub fn unsubscribe(&mut self, ids: &[String]) -> Vec<ShopId> {
        let mut removed = Vec::new();
        for raw in ids {
            if raw == WILDCARD {
                self.subscribe_all = false;
                continue;
            }
            let id = ShopId::new(raw.trim());
            if self.shop_ids.remove(&id) {
                removed.push(id);
            }
        }
        removed
    }

    /// Returns `true` if the given shop matches the subscription filter.
    #[must_use]
    pub fn matches(&self, shop_id: &ShopId) -> bool {
        self.subscribe_all || self.shop_ids.contains(shop_id)
    }

    /// Returns the number of explicitly subscribed shops.
    #[must_use]
    pub fn count(&self) -> usize {
        self.shop_ids.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}
