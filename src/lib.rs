//! # meshimap
//!
//! Backend for a restaurant map: a shop catalogue with geocoded
//! addresses, per-user bookmark and visited flags, and a monthly ranking
//! of users by shops visited.
//!
//! Everything is persisted through a small document-store abstraction
//! (collections of JSON documents addressed by slash-separated paths),
//! backed either by memory or by a PostgreSQL JSONB table.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── Shop / Mark / User / Ranking services (service/)
//!     ├── EventBus, KeyedLocks (domain/)
//!     │
//!     ├── Geocoder (geocode)
//!     │
//!     └── DocumentStore (store/): memory or PostgreSQL
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod geocode;
pub mod service;
pub mod store;
pub mod ws;
