//! Card sales are only finalized on the gateway's own `succeeded` status.

use std::collections::BTreeMap;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    dto::payments::{
        ConfirmPaymentRequest, ConfirmedPayment, CreateIntentRequest, PaymentIntentResponse,
    },
    entity::{
        Sales,
        sales::Column as SaleCol,
        sea_orm_active_enums::{PaymentMethod, PaymentStatus},
    },
    error::{AppError, AppResult},
    models::Store,
    pricing,
    services::{
        payment_gateway::IntentStatus,
        sale_engine::{self, ensure_transition},
        sale_service::find_sale,
    },
    state::AppState,
};

pub async fn create_intent(
    state: &AppState,
    store: &Store,
    req: CreateIntentRequest,
) -> AppResult<PaymentIntentResponse> {
    let sale = find_sale(&state.orm, store.id, req.sale_id)
        .await?
        .ok_or(AppError::SaleNotFound)?;

    if sale.payment_method != PaymentMethod::Card {
        return Err(AppError::Validation(
            "payment intents are only created for card sales".into(),
        ));
    }
    ensure_transition(sale.payment_status, PaymentStatus::Completed)?;

    let amount_cents = pricing::to_minor_units(sale.total)?;
    let mut metadata = BTreeMap::new();
    metadata.insert("sale_id".to_string(), sale.id.to_string());
    metadata.insert("store_id".to_string(), store.id.to_string());
    metadata.insert("receipt_number".to_string(), sale.receipt_number.clone());

    let intent = state
        .gateway
        .create_intent(amount_cents, &store.currency, &metadata)
        .await?;

    let now: DateTimeWithTimeZone = Utc::now().into();
    let updated = Sales::update_many()
        .col_expr(SaleCol::PaymentIntentId, Expr::value(Some(intent.intent_id.clone())))
        .col_expr(SaleCol::UpdatedAt, Expr::value(now))
        .filter(
            Condition::all()
                .add(SaleCol::Id.eq(sale.id))
                .add(SaleCol::StoreId.eq(store.id))
                .add(SaleCol::PaymentStatus.eq(PaymentStatus::Pending)),
        )
        .exec(&state.orm)
        .await?;
    if updated.rows_affected == 0 {
        return Err(AppError::Conflict(
            "sale is no longer pending".into(),
        ));
    }

    tracing::info!(
        sale_id = %sale.id,
        store_id = %store.id,
        payment_intent_id = %intent.intent_id,
        amount_cents,
        "payment intent created"
    );

    Ok(PaymentIntentResponse {
        sale_id: sale.id,
        payment_intent_id: intent.intent_id,
        client_secret: intent.client_secret,
        amount_cents,
        currency: store.currency.to_lowercase(),
    })
}

pub async fn confirm_payment(
    state: &AppState,
    store_id: Uuid,
    req: ConfirmPaymentRequest,
) -> AppResult<ConfirmedPayment> {
    let sale = find_sale(&state.orm, store_id, req.sale_id)
        .await?
        .ok_or(AppError::SaleNotFound)?;
    ensure_transition(sale.payment_status, PaymentStatus::Completed)?;

    match sale.payment_intent_id.as_deref() {
        Some(bound) if bound == req.payment_intent_id => {}
        Some(_) => {
            return Err(AppError::Validation(
                "payment intent does not belong to this sale".into(),
            ));
        }
        None => {
            return Err(AppError::Validation(
                "no payment intent has been created for this sale".into(),
            ));
        }
    }

    let status = state.gateway.get_status(&req.payment_intent_id).await?;
    tracing::debug!(
        sale_id = %sale.id,
        payment_intent_id = %req.payment_intent_id,
        intent_status = status.as_str(),
        "payment intent verified"
    );

    match status {
        IntentStatus::Succeeded => {
            let confirmed = sale_engine::confirm_pending_sale(state, store_id, sale.id).await?;
            Ok(ConfirmedPayment {
                receipt_number: confirmed.sale.receipt_number.clone(),
                sale: confirmed,
            })
        }
        IntentStatus::Failed => {
            sale_engine::fail_pending_sale(state, store_id, sale.id, "payment intent failed")
                .await?;
            Err(AppError::PaymentNotSucceeded(status.as_str().to_string()))
        }
        IntentStatus::Pending => Err(AppError::PaymentNotSucceeded(status.as_str().to_string())),
    }
}
