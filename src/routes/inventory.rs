use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::inventory::{MovementList, ProductList, StockAdjustRequest, StockAdjustment},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::{
        extract::{ApiJson, ApiPath, ApiQuery},
        params::Pagination,
    },
    services::{inventory_service, store_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/low-stock", get(list_low_stock))
        .route("/{product_id}/stock/adjust", post(adjust_stock))
        .route("/{product_id}/movements", get(list_movements))
}

#[utoipa::path(
    get,
    path = "/stores/{store_id}/products/low-stock",
    params(("store_id" = Uuid, Path, description = "Store ID"), Pagination),
    responses(
        (status = 200, description = "Active products at or below a threshold", body = ApiResponse<ProductList>),
        (status = 403, description = "Not a member of this store"),
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn list_low_stock(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(store_id): ApiPath<Uuid>,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let access = store_service::store_access(&state, &user, store_id).await?;
    let products = inventory_service::list_low_stock(&state, access.store.id, pagination).await?;
    Ok(Json(ApiResponse::success("Low stock products", products)))
}

#[utoipa::path(
    post,
    path = "/stores/{store_id}/products/{product_id}/stock/adjust",
    params(
        ("store_id" = Uuid, Path, description = "Store ID"),
        ("product_id" = Uuid, Path, description = "Product ID"),
    ),
    request_body = StockAdjustRequest,
    responses(
        (status = 200, description = "Stock adjusted", body = ApiResponse<StockAdjustment>),
        (status = 400, description = "Zero delta, missing reason or negative result"),
        (status = 403, description = "Only store owners can adjust stock"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn adjust_stock(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath((store_id, product_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(payload): ApiJson<StockAdjustRequest>,
) -> AppResult<Json<ApiResponse<StockAdjustment>>> {
    let access = store_service::store_access(&state, &user, store_id).await?;
    let adjustment = inventory_service::adjust_stock(&state, &access, product_id, payload).await?;
    Ok(Json(ApiResponse::success("Stock adjusted", adjustment)))
}

#[utoipa::path(
    get,
    path = "/stores/{store_id}/products/{product_id}/movements",
    params(
        ("store_id" = Uuid, Path, description = "Store ID"),
        ("product_id" = Uuid, Path, description = "Product ID"),
        Pagination,
    ),
    responses(
        (status = 200, description = "Stock movements, newest first", body = ApiResponse<MovementList>),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn list_movements(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath((store_id, product_id)): ApiPath<(Uuid, Uuid)>,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> AppResult<Json<ApiResponse<MovementList>>> {
    let access = store_service::store_access(&state, &user, store_id).await?;
    let movements =
        inventory_service::list_movements(&state, access.store.id, product_id, pagination).await?;
    Ok(Json(ApiResponse::success("Stock movements", movements)))
}
