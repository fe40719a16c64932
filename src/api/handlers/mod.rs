//! REST endpoint handlers organized by resource.

pub mod marks;
pub mod ranking;
pub mod shops;
pub mod system;
pub mod users;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(shops::routes())
        .merge(users::routes())
        .merge(marks::routes())
        .merge(ranking::routes())
}
