//! Domain layer: identifiers, entities, ranking rules and the event system.
//!
//! This module contains the server-side model: shops, user profiles, the
//! bookmark / visited marks, the monthly ranking computation, the event
//! bus for broadcasting state changes, and per-key locking for toggles.

pub mod event;
pub mod event_bus;
pub mod ids;
pub mod keyed_locks;
pub mod mark;
pub mod ranking;
pub mod shop;
pub mod user;

pub use event::MarkEvent;
pub use event_bus::EventBus;
pub use ids::{ShopId, UserId};
pub use keyed_locks::KeyedLocks;
pub use mark::{Mark, MarkKind};
pub use ranking::{MonthWindow, RankingEntry};
pub use shop::{BusinessHours, GeoPoint, Shop, ShopRecord};
pub use user::UserProfile;
