//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use crate::api::dto::{
    BusinessHoursInput, CreateShopRequest, IdentityRequest, MarkListResponse, MarkStateResponse,
    PaginationMeta, RankingResponse, ShopListResponse, SignInResponse, TimeInput,
    UpdateProfileRequest,
};
use crate::api::handlers::{marks, ranking, shops, system, users};
use crate::domain::{
    BusinessHours, GeoPoint, Mark, MarkKind, MonthWindow, RankingEntry, Shop, ShopId, ShopRecord,
    UserId, UserProfile,
};
use crate::error::{ErrorBody, ErrorResponse};

/// Generated OpenAPI document, served at `/api-docs/openapi.json`.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "meshimap",
        description = "Restaurant map backend: shop catalogue, bookmarks, visits and the monthly visit ranking."
    ),
    paths(
        system::health_handler,
        shops::list_shops,
        shops::create_shop,
        shops::get_shop,
        shops::reference_point,
        marks::list_marks,
        marks::mark_state,
        marks::toggle_mark,
        marks::remove_mark,
        users::register,
        users::sign_in,
        users::get_profile,
        users::update_profile,
        ranking::monthly_ranking,
    ),
    components(schemas(
        system::HealthResponse,
        ErrorResponse,
        ErrorBody,
        ShopId,
        UserId,
        GeoPoint,
        BusinessHours,
        ShopRecord,
        Shop,
        MarkKind,
        Mark,
        UserProfile,
        MonthWindow,
        RankingEntry,
        PaginationMeta,
        ShopListResponse,
        TimeInput,
        BusinessHoursInput,
        CreateShopRequest,
        MarkStateResponse,
        MarkListResponse,
        IdentityRequest,
        SignInResponse,
        UpdateProfileRequest,
        RankingResponse,
    )),
    tags(
        (name = "System", description = "Health"),
        (name = "Shops", description = "Shop catalogue and admin form"),
        (name = "Marks", description = "Bookmarks and visits"),
        (name = "Users", description = "Profiles"),
        (name = "Ranking", description = "Monthly visit ranking"),
    )
)]
pub struct ApiDoc;
