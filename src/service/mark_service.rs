//! Mark service: bookmark / visited existence flags.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{EventBus, KeyedLocks, Mark, MarkEvent, MarkKind, Shop, ShopId, UserId};
use crate::error::MeshimapError;
use crate::store::DocumentStore;

/// Reads and flips per-user, per-shop flags.
///
/// Toggling is read-then-write against the store. Within one process,
/// toggles of the same `(kind, user, shop)` key are serialised so each
/// call flips the flag exactly once; toggles arriving through another
/// process sharing the store are not covered and can still interleave.
#[derive(Debug)]
pub struct MarkService {
    store: Arc<dyn DocumentStore>,
    event_bus: EventBus,
    locks: KeyedLocks<(MarkKind, UserId, ShopId)>,
}

impl MarkService {
    /// Creates a new `MarkService`.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, event_bus: EventBus) -> Self {
        Self {
            store,
            event_bus,
            locks: KeyedLocks::new(),
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Reports whether `user_id` has set the `kind` flag on `shop_id`.
    ///
    /// Blank IDs answer `false` without a store call; a missing record is
    /// the ordinary `false` case, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`MeshimapError::Store`] if the lookup itself fails.
    pub async fn exists(
        &self,
        kind: MarkKind,
        user_id: &UserId,
        shop_id: &ShopId,
    ) -> Result<bool, MeshimapError> {
        if user_id.is_empty() || shop_id.is_empty() {
            return Ok(false);
        }
        let path = kind.path(user_id, shop_id)?;
        Ok(self.store.get(&path).await?.is_some())
    }

    /// Flips the `kind` flag for `(user_id, shop)` and returns the new
    /// state: `true` if the record now exists.
    ///
    /// Setting writes a snapshot of `shop` with a store-assigned
    /// timestamp; later edits to the shop are not reflected in it.
    ///
    /// # Errors
    ///
    /// Returns [`MeshimapError::Unauthenticated`] for a blank user ID
    /// (before any store access), [`MeshimapError::InvalidRequest`] for a
    /// blank shop ID, or [`MeshimapError::Store`] on store failure.
    pub async fn toggle(
        &self,
        kind: MarkKind,
        user_id: &UserId,
        shop: &Shop,
    ) -> Result<bool, MeshimapError> {
        if user_id.is_empty() {
            return Err(MeshimapError::Unauthenticated);
        }
        let path = kind.path(user_id, &shop.id)?;

        let _guard = self
            .locks
            .lock((kind, user_id.clone(), shop.id.clone()))
            .await;

        let present = if self.store.get(&path).await?.is_some() {
            self.store.delete(&path).await?;
            false
        } else {
            self.store
                .set(&path, kind.snapshot_fields(shop), &[kind.timestamp_field()])
                .await?;
            true
        };

        let _ = self.event_bus.publish(MarkEvent::MarkToggled {
            kind,
            user_id: user_id.clone(),
            shop_id: shop.id.clone(),
            present,
            timestamp: Utc::now(),
        });

        tracing::info!(%kind, %user_id, shop_id = %shop.id, present, "mark toggled");
        Ok(present)
    }

    /// Lists every mark of `kind` the user has set, ordered by shop ID.
    ///
    /// # Errors
    ///
    /// Returns [`MeshimapError::Store`] on store failure.
    pub async fn list(&self, kind: MarkKind, user_id: &UserId) -> Result<Vec<Mark>, MeshimapError> {
        if user_id.is_empty() {
            return Ok(Vec::new());
        }
        let docs = self.store.list(&kind.collection_path(user_id)).await?;
        Ok(docs
            .iter()
            .map(|doc| Mark::from_snapshot(kind, doc))
            .collect())
    }

    /// Clears the flag unconditionally. Clearing an unset flag succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`MeshimapError::Unauthenticated`] for a blank user ID,
    /// [`MeshimapError::InvalidRequest`] for a blank shop ID, or
    /// [`MeshimapError::Store`] on store failure.
    pub async fn remove(
        &self,
        kind: MarkKind,
        user_id: &UserId,
        shop_id: &ShopId,
    ) -> Result<(), MeshimapError> {
        if user_id.is_empty() {
            return Err(MeshimapError::Unauthenticated);
        }
        let path = kind.path(user_id, shop_id)?;

        let _guard = self
            .locks
            .lock((kind, user_id.clone(), shop_id.clone()))
            .await;
        let existed = self.store.get(&path).await?.is_some();
        self.store.delete(&path).await?;

        if existed {
            let _ = self.event_bus.publish(MarkEvent::MarkToggled {
                kind,
                user_id: user_id.clone(),
                shop_id: shop_id.clone(),
                present: false,
                timestamp: Utc::now(),
            });
        }
        tracing::info!(%kind, %user_id, %shop_id, existed, "mark removed");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::ShopRecord;
    use crate::store::{DocPath, MemoryStore, encode};

    fn shop(id: &str, name: &str) -> Shop {
        Shop {
            id: ShopId::new(id),
            record: ShopRecord {
                name: name.to_string(),
                address: "2-1 Dogenzaka".to_string(),
                genre: "cafe".to_string(),
                price_range: "800-2000".to_string(),
                station: "Shibuya".to_string(),
                location: None,
                business_hours: vec![],
                created_at: None,
            },
        }
    }

    fn make_service() -> (Arc<MemoryStore>, MarkService) {
        let store = Arc::new(MemoryStore::new());
        let dyn_store: Arc<dyn DocumentStore> = Arc::clone(&store) as Arc<dyn DocumentStore>;
        (store, MarkService::new(dyn_store, EventBus::new(64)))
    }

    #[tokio::test]
    async fn toggle_parity() {
        let (_, service) = make_service();
        let user = UserId::new("u1");
        let cafe = shop("s1", "Cafe X");

        for n in 1..=5 {
            let Ok(state) = service.toggle(MarkKind::Bookmark, &user, &cafe).await else {
                panic!("toggle failed");
            };
            let odd = n % 2 == 1;
            assert_eq!(state, odd);
            let Ok(exists) = service.exists(MarkKind::Bookmark, &user, &cafe.id).await else {
                panic!("exists failed");
            };
            assert_eq!(exists, odd);
        }
    }

    #[tokio::test]
    async fn axes_are_independent() {
        let (_, service) = make_service();
        let user = UserId::new("u1");
        let cafe = shop("s1", "Cafe X");

        let _ = service.toggle(MarkKind::Visited, &user, &cafe).await;
        assert!(matches!(
            service.exists(MarkKind::Visited, &user, &cafe.id).await,
            Ok(true)
        ));
        assert!(matches!(
            service.exists(MarkKind::Bookmark, &user, &cafe.id).await,
            Ok(false)
        ));
    }

    #[tokio::test]
    async fn blank_ids_never_exist() {
        let (_, service) = make_service();
        assert!(matches!(
            service
                .exists(MarkKind::Bookmark, &UserId::new(""), &ShopId::new("s1"))
                .await,
            Ok(false)
        ));
        assert!(matches!(
            service
                .exists(MarkKind::Bookmark, &UserId::new("u1"), &ShopId::new(""))
                .await,
            Ok(false)
        ));
    }

    #[tokio::test]
    async fn unauthenticated_toggle_touches_nothing() {
        let (store, service) = make_service();
        let result = service
            .toggle(MarkKind::Bookmark, &UserId::new(""), &shop("s1", "Cafe X"))
            .await;
        assert!(matches!(result, Err(MeshimapError::Unauthenticated)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn snapshot_does_not_follow_shop_edits() {
        let (store, service) = make_service();
        let user = UserId::new("u1");
        let cafe = shop("s1", "Cafe X");

        let _ = service.toggle(MarkKind::Bookmark, &user, &cafe).await;

        // Rename the source shop.
        let renamed = shop("s1", "Cafe Y");
        let Ok(path) = DocPath::new(&["shops", "s1"]) else {
            panic!("valid path");
        };
        let Ok(fields) = encode(&renamed.record) else {
            panic!("encode failed");
        };
        let _ = store.set(&path, fields, &[]).await;

        let Ok(marks) = service.list(MarkKind::Bookmark, &user).await else {
            panic!("list failed");
        };
        assert_eq!(marks.len(), 1);
        assert_eq!(marks.first().map(|m| m.name.as_str()), Some("Cafe X"));
    }

    #[tokio::test]
    async fn visit_gets_store_timestamp() {
        let (_, service) = make_service();
        let user = UserId::new("u1");
        let _ = service
            .toggle(MarkKind::Visited, &user, &shop("s1", "Cafe X"))
            .await;

        let Ok(marks) = service.list(MarkKind::Visited, &user).await else {
            panic!("list failed");
        };
        assert!(marks.first().and_then(|m| m.marked_at).is_some());
    }

    #[tokio::test]
    async fn concurrent_toggles_each_flip_once() {
        let (_, service) = make_service();
        let service = Arc::new(service);
        let user = UserId::new("u1");
        let cafe = shop("s1", "Cafe X");

        let a = {
            let (service, user, cafe) = (Arc::clone(&service), user.clone(), cafe.clone());
            tokio::spawn(async move { service.toggle(MarkKind::Bookmark, &user, &cafe).await })
        };
        let b = {
            let (service, user, cafe) = (Arc::clone(&service), user.clone(), cafe.clone());
            tokio::spawn(async move { service.toggle(MarkKind::Bookmark, &user, &cafe).await })
        };

        let (Ok(Ok(ra)), Ok(Ok(rb))) = (a.await, b.await) else {
            panic!("toggle task failed");
        };
        assert_ne!(ra, rb);
        assert!(matches!(
            service.exists(MarkKind::Bookmark, &user, &cafe.id).await,
            Ok(false)
        ));
    }

    #[tokio::test]
    async fn toggle_publishes_event() {
        let (_, service) = make_service();
        let mut rx = service.event_bus().subscribe();
        let user = UserId::new("u1");

        let _ = service
            .toggle(MarkKind::Visited, &user, &shop("s9", "Soba"))
            .await;

        let Ok(MarkEvent::MarkToggled {
            shop_id, present, ..
        }) = rx.recv().await
        else {
            panic!("expected toggle event");
        };
        assert_eq!(shop_id.as_str(), "s9");
        assert!(present);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let (_, service) = make_service();
        let user = UserId::new("u1");
        let cafe = shop("s1", "Cafe X");

        let _ = service.toggle(MarkKind::Bookmark, &user, &cafe).await;
        assert!(service.remove(MarkKind::Bookmark, &user, &cafe.id).await.is_ok());
        assert!(service.remove(MarkKind::Bookmark, &user, &cafe.id).await.is_ok());
        assert!(matches!(
            service.exists(MarkKind::Bookmark, &user, &cafe.id).await,
            Ok(false)
        ));
    }
}
