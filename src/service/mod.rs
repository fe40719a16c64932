//! Service layer: business logic orchestration.
//!
//! Each service owns a handle to the [`crate::store::DocumentStore`] and
//! turns one user action into the store calls behind it. Toggles and shop
//! creation also emit events through the [`crate::domain::EventBus`].

pub mod mark_service;
pub mod ranking_service;
pub mod shop_service;
pub mod user_service;

pub use mark_service::MarkService;
pub use ranking_service::RankingService;
pub use shop_service::{NewShop, ShopService};
pub use user_service::{AuthIdentity, UserService};
