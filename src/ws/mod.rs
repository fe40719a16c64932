//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The endpoint at `/ws` pushes mark and shop events so open views can
//! refresh bookmark and visit state without polling.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
