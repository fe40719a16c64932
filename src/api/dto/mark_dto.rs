//! Bookmark / visited DTOs.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Mark, MarkKind, ShopId};

/// Current state of one flag, returned by the exists and toggle endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct MarkStateResponse {
    /// Which flag.
    pub kind: MarkKind,
    /// Shop the flag belongs to.
    pub shop_id: ShopId,
    /// `true` if the record exists.
    pub present: bool,
}

/// All marks of one kind for the signed-in user.
#[derive(Debug, Serialize, ToSchema)]
pub struct MarkListResponse {
    /// Which flag.
    pub kind: MarkKind,
    /// The marks, ordered by shop ID.
    pub data: Vec<Mark>,
}
