//! Shop handlers: catalogue queries, admin form, reference point.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{CreateShopRequest, PaginationParams, ShopFilter, ShopListResponse};
use crate::app_state::AppState;
use crate::domain::{Shop, ShopId};
use crate::error::{ErrorResponse, MeshimapError};

/// `GET /shops`: List shops by genre or by station.
///
/// # Errors
///
/// Returns [`MeshimapError::InvalidRequest`] if both filters are given.
#[utoipa::path(
    get,
    path = "/api/v1/shops",
    tag = "Shops",
    summary = "List shops",
    description = "Lists shops with the given genre or nearest station, or every shop when no filter is given. \
                   Every match is returned unless `per_page` is set.",
    params(ShopFilter, PaginationParams),
    responses(
        (status = 200, description = "Shop list", body = ShopListResponse),
        (status = 400, description = "Both filters given", body = ErrorResponse),
    )
)]
pub async fn list_shops(
    State(state): State<AppState>,
    Query(filter): Query<ShopFilter>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, MeshimapError> {
    let shops = match (filter.genre.as_deref(), filter.station.as_deref()) {
        (Some(_), Some(_)) => {
            return Err(MeshimapError::InvalidRequest(
                "filter by genre or by station, not both".to_string(),
            ));
        }
        (Some(genre), None) => state.shop_service.shops_by_genre(genre).await?,
        (None, Some(station)) => state.shop_service.shops_by_station(station).await?,
        (None, None) => state.shop_service.all_shops().await?,
    };

    let (data, pagination) = params.paginate(shops);
    Ok(Json(ShopListResponse { data, pagination }))
}

/// `POST /shops`: Admin form: geocode the address and add a shop.
///
/// # Errors
///
/// Returns [`MeshimapError::AddressNotFound`] if the address cannot be
/// located; nothing is stored in that case.
#[utoipa::path(
    post,
    path = "/api/v1/shops",
    tag = "Shops",
    summary = "Create a shop",
    description = "Geocodes the address and stores the shop with its business hours.",
    request_body = CreateShopRequest,
    responses(
        (status = 201, description = "Shop created", body = Shop),
        (status = 400, description = "Missing name or address", body = ErrorResponse),
        (status = 422, description = "Address could not be located", body = ErrorResponse),
        (status = 502, description = "Geocoder or store failure", body = ErrorResponse),
    )
)]
pub async fn create_shop(
    State(state): State<AppState>,
    Json(req): Json<CreateShopRequest>,
) -> Result<impl IntoResponse, MeshimapError> {
    let shop = state.shop_service.create_shop(req.into()).await?;
    Ok((StatusCode::CREATED, Json(shop)))
}

/// `GET /shops/{id}`: Get one shop.
///
/// # Errors
///
/// Returns [`MeshimapError::ShopNotFound`] if the shop does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/shops/{id}",
    tag = "Shops",
    summary = "Get a shop",
    params(
        ("id" = String, Path, description = "Shop ID"),
    ),
    responses(
        (status = 200, description = "Shop details", body = Shop),
        (status = 404, description = "Shop not found", body = ErrorResponse),
    )
)]
pub async fn get_shop(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, MeshimapError> {
    let shop = state.shop_service.get_shop(&ShopId::new(id)).await?;
    Ok(Json(shop))
}

/// `GET /reference-point`: The distinguished shop shown on every map.
///
/// # Errors
///
/// Returns [`MeshimapError::ShopNotFound`] if none is configured.
#[utoipa::path(
    get,
    path = "/api/v1/reference-point",
    tag = "Shops",
    summary = "Get the reference point",
    responses(
        (status = 200, description = "Reference point", body = Shop),
        (status = 404, description = "No reference point configured", body = ErrorResponse),
    )
)]
pub async fn reference_point(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, MeshimapError> {
    let shop = state
        .shop_service
        .reference_point()
        .await?
        .ok_or_else(|| MeshimapError::ShopNotFound("reference point".to_string()))?;
    Ok(Json(shop))
}

/// Shop routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/shops", get(list_shops).post(create_shop))
        .route("/shops/{id}", get(get_shop))
        .route("/reference-point", get(reference_point))
}
