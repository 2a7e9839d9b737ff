use axum::{Json, Router, extract::State, routing::post};
use uuid::Uuid;

use crate::{
    dto::payments::{
        ConfirmPaymentRequest, ConfirmedPayment, CreateIntentRequest, PaymentIntentResponse,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::extract::{ApiJson, ApiPath},
    services::{payment_service, store_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/intents", post(create_intent))
        .route("/confirm", post(confirm_payment))
}

#[utoipa::path(
    post,
    path = "/stores/{store_id}/payments/intents",
    params(("store_id" = Uuid, Path, description = "Store ID")),
    request_body = CreateIntentRequest,
    responses(
        (status = 200, description = "Intent created for the sale total", body = ApiResponse<PaymentIntentResponse>),
        (status = 404, description = "Sale not found"),
        (status = 409, description = "Sale is not pending"),
        (status = 502, description = "Gateway error"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn create_intent(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(store_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<CreateIntentRequest>,
) -> AppResult<Json<ApiResponse<PaymentIntentResponse>>> {
    let access = store_service::store_access(&state, &user, store_id).await?;
    let intent = payment_service::create_intent(&state, &access.store, payload).await?;
    Ok(Json(ApiResponse::success("Payment intent created", intent)))
}

#[utoipa::path(
    post,
    path = "/stores/{store_id}/payments/confirm",
    params(("store_id" = Uuid, Path, description = "Store ID")),
    request_body = ConfirmPaymentRequest,
    responses(
        (status = 200, description = "Gateway confirmed the charge and the sale is completed", body = ApiResponse<ConfirmedPayment>),
        (status = 400, description = "Intent does not belong to the sale"),
        (status = 402, description = "Gateway did not report success"),
        (status = 409, description = "Sale is not pending or stock is gone"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn confirm_payment(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(store_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ConfirmPaymentRequest>,
) -> AppResult<Json<ApiResponse<ConfirmedPayment>>> {
    let access = store_service::store_access(&state, &user, store_id).await?;
    let confirmed = payment_service::confirm_payment(&state, access.store.id, payload).await?;
    Ok(Json(ApiResponse::success("Payment confirmed", confirmed)))
}
