//! Ranking DTOs.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{MonthWindow, RankingEntry};

/// Response body for `GET /ranking/monthly`.
///
/// `entries` is empty both when nobody visited anything this month and
/// when the ranking could not be computed.
#[derive(Debug, Serialize, ToSchema)]
pub struct RankingResponse {
    /// The month the ranking covers.
    pub window: MonthWindow,
    /// Ranked users, best first.
    pub entries: Vec<RankingEntry>,
}
