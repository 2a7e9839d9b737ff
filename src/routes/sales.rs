use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    dto::{
        cart::{CartValidation, ValidateCartRequest},
        sales::{CreateSaleRequest, DailySummary, SaleList},
    },
    entity::sea_orm_active_enums::PaymentStatus,
    error::AppResult,
    middleware::auth::AuthUser,
    models::SaleWithItems,
    response::ApiResponse,
    routes::{
        extract::{ApiJson, ApiPath, ApiQuery},
        params::{DailySummaryQuery, SaleListQuery},
    },
    services::{cart_service, refund_service, sale_engine, sale_service, store_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sales).post(create_sale))
        .route("/cart/validate", post(validate_cart))
        .route("/summary/daily", get(daily_summary))
        .route("/{sale_id}", get(get_sale))
        .route("/{sale_id}/receipt", get(download_receipt))
        .route("/{sale_id}/refund", post(refund_sale))
}

#[utoipa::path(
    post,
    path = "/stores/{store_id}/sales/cart/validate",
    params(("store_id" = Uuid, Path, description = "Store ID")),
    request_body = ValidateCartRequest,
    responses(
        (status = 200, description = "Priced cart with per-line stock problems", body = ApiResponse<CartValidation>),
        (status = 400, description = "Empty cart or invalid discount"),
        (status = 403, description = "Not a member of this store"),
        (status = 404, description = "Store not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Sales"
)]
pub async fn validate_cart(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(store_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ValidateCartRequest>,
) -> AppResult<Json<ApiResponse<CartValidation>>> {
    let access = store_service::store_access(&state, &user, store_id).await?;
    let validation = cart_service::validate_cart(&state, access.store.id, payload).await?;
    let message = if validation.valid {
        "Cart is valid"
    } else {
        "Cart has errors"
    };
    Ok(Json(ApiResponse::success(message, validation)))
}

#[utoipa::path(
    post,
    path = "/stores/{store_id}/sales",
    params(("store_id" = Uuid, Path, description = "Store ID")),
    request_body = CreateSaleRequest,
    responses(
        (status = 201, description = "Cash sale completed or card sale pending", body = ApiResponse<SaleWithItems>),
        (status = 400, description = "Validation, inactive product, invalid payment method or insufficient payment"),
        (status = 404, description = "Product or store not found"),
        (status = 409, description = "Insufficient stock"),
    ),
    security(("bearer_auth" = [])),
    tag = "Sales"
)]
pub async fn create_sale(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(store_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<CreateSaleRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<SaleWithItems>>)> {
    let access = store_service::store_access(&state, &user, store_id).await?;
    let sale = sale_engine::process_sale(&state, access.store.id, access.user_id, payload).await?;
    let message = match sale.sale.payment_status {
        PaymentStatus::Pending => "Sale created, awaiting payment confirmation",
        _ => "Sale completed successfully",
    };
    Ok((StatusCode::CREATED, Json(ApiResponse::success(message, sale))))
}

#[utoipa::path(
    get,
    path = "/stores/{store_id}/sales",
    params(("store_id" = Uuid, Path, description = "Store ID"), SaleListQuery),
    responses(
        (status = 200, description = "Sales, newest first by default", body = ApiResponse<SaleList>),
        (status = 403, description = "Not a member of this store"),
    ),
    security(("bearer_auth" = [])),
    tag = "Sales"
)]
pub async fn list_sales(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(store_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<SaleListQuery>,
) -> AppResult<Json<ApiResponse<SaleList>>> {
    let access = store_service::store_access(&state, &user, store_id).await?;
    let sales = sale_service::list_sales(&state, access.store.id, query).await?;
    Ok(Json(ApiResponse::success("Sales", sales)))
}

#[utoipa::path(
    get,
    path = "/stores/{store_id}/sales/summary/daily",
    params(("store_id" = Uuid, Path, description = "Store ID"), DailySummaryQuery),
    responses(
        (status = 200, description = "Completed-sale totals for one UTC day", body = ApiResponse<DailySummary>),
        (status = 403, description = "Not a member of this store"),
    ),
    security(("bearer_auth" = [])),
    tag = "Sales"
)]
pub async fn daily_summary(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(store_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<DailySummaryQuery>,
) -> AppResult<Json<ApiResponse<DailySummary>>> {
    let access = store_service::store_access(&state, &user, store_id).await?;
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let summary = sale_service::daily_summary(&state, access.store.id, date).await?;
    Ok(Json(ApiResponse::success("Daily summary", summary)))
}

#[utoipa::path(
    get,
    path = "/stores/{store_id}/sales/{sale_id}",
    params(
        ("store_id" = Uuid, Path, description = "Store ID"),
        ("sale_id" = Uuid, Path, description = "Sale ID"),
    ),
    responses(
        (status = 200, description = "Sale with its items", body = ApiResponse<SaleWithItems>),
        (status = 404, description = "Sale not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Sales"
)]
pub async fn get_sale(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath((store_id, sale_id)): ApiPath<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<SaleWithItems>>> {
    let access = store_service::store_access(&state, &user, store_id).await?;
    let sale = sale_service::get_sale(&state, access.store.id, sale_id).await?;
    Ok(Json(ApiResponse::success("Sale found", sale)))
}

#[utoipa::path(
    get,
    path = "/stores/{store_id}/sales/{sale_id}/receipt",
    params(
        ("store_id" = Uuid, Path, description = "Store ID"),
        ("sale_id" = Uuid, Path, description = "Sale ID"),
    ),
    responses(
        (status = 200, description = "Receipt document", content_type = "text/plain", body = String),
        (status = 404, description = "Sale not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Sales"
)]
pub async fn download_receipt(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath((store_id, sale_id)): ApiPath<(Uuid, Uuid)>,
) -> AppResult<Response> {
    let access = store_service::store_access(&state, &user, store_id).await?;
    let sale = sale_service::get_sale(&state, access.store.id, sale_id).await?;
    let body = state.receipts.render(&access.store, &sale)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        state.receipts.file_name(&sale.sale.receipt_number)
    );
    Ok((
        [
            (header::CONTENT_TYPE, state.receipts.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

#[utoipa::path(
    post,
    path = "/stores/{store_id}/sales/{sale_id}/refund",
    params(
        ("store_id" = Uuid, Path, description = "Store ID"),
        ("sale_id" = Uuid, Path, description = "Sale ID"),
    ),
    responses(
        (status = 200, description = "Sale refunded and stock returned", body = ApiResponse<SaleWithItems>),
        (status = 403, description = "Only store owners can refund"),
        (status = 404, description = "Sale not found"),
        (status = 409, description = "Sale is not completed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Sales"
)]
pub async fn refund_sale(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath((store_id, sale_id)): ApiPath<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<SaleWithItems>>> {
    let access = store_service::store_access(&state, &user, store_id).await?;
    let sale = refund_service::refund(&state, &access, sale_id).await?;
    Ok(Json(ApiResponse::success("Sale refunded successfully", sale)))
}
