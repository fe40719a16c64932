//! Domain events reflecting state changes.
//!
//! Every successful toggle and shop creation emits a [`MarkEvent`] through
//! the [`super::EventBus`], where WebSocket subscribers pick it up to
//! refresh the state they display.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{MarkKind, ShopId, UserId};

/// Domain event emitted after every state mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum MarkEvent {
    /// A bookmark or visit flag was flipped.
    MarkToggled {
        /// Bookmark or visited.
        kind: MarkKind,
        /// User who toggled.
        user_id: UserId,
        /// Shop whose flag changed.
        shop_id: ShopId,
        /// New state: `true` if the record now exists.
        present: bool,
        /// When the toggle completed. Views drop updates older than the
        /// last one they applied.
        timestamp: DateTime<Utc>,
    },

    /// A shop was added through the admin form.
    ShopCreated {
        /// New shop.
        shop_id: ShopId,
        /// Its name.
        name: String,
        /// Its genre.
        genre: String,
        /// Its nearest station.
        station: String,
        /// Creation time.
        timestamp: DateTime<Utc>,
    },
}

impl MarkEvent {
    /// Returns the shop this event concerns.
    #[must_use]
    pub fn shop_id(&self) -> &ShopId {
        match self {
            Self::MarkToggled { shop_id, .. } | Self::ShopCreated { shop_id, .. } => shop_id,
        }
    }

    /// Returns the event type discriminator string.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::MarkToggled { .. } => "mark_toggled",
            Self::ShopCreated { .. } => "shop_created",
        }
    }
}
