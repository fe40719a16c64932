//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Largest page a client may request.
const MAX_PER_PAGE: u32 = 500;

/// Optional pagination query parameters for list endpoints.
///
/// Without `per_page` the whole list is returned as a single page.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1; ignored without `per_page`.
    #[serde(default)]
    pub page: Option<u32>,
    /// Items per page (max 500). Omit to get every item.
    #[serde(default)]
    pub per_page: Option<u32>,
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items.
    pub total: u32,
    /// Total number of pages.
    pub total_pages: u32,
}

impl PaginationParams {
    /// Cuts one page out of `items` and describes it. Returns everything
    /// when no page size was requested.
    #[must_use]
    pub fn paginate<T>(&self, items: Vec<T>) -> (Vec<T>, PaginationMeta) {
        let total = u32::try_from(items.len()).unwrap_or(u32::MAX);
        let Some(per_page) = self.per_page else {
            return (
                items,
                PaginationMeta {
                    page: 1,
                    per_page: total,
                    total,
                    total_pages: u32::from(total > 0),
                },
            );
        };

        let per_page = per_page.clamp(1, MAX_PER_PAGE);
        let page = self.page.unwrap_or(1).max(1);
        let total_pages = total.div_ceil(per_page);
        let start = (page.saturating_sub(1) as usize).saturating_mul(per_page as usize);
        let data = items
            .into_iter()
            .skip(start)
            .take(per_page as usize)
            .collect();
        (
            data,
            PaginationMeta {
                page,
                per_page,
                total,
                total_pages,
            },
        )
    }
}
