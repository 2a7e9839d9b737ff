use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::SaleWithItems;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateIntentRequest {
    pub sale_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentIntentResponse {
    pub sale_id: Uuid,
    pub payment_intent_id: String,
    pub client_secret: String,
    pub amount_cents: i64,
    pub currency: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ConfirmPaymentRequest {
    pub sale_id: Uuid,
    pub payment_intent_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConfirmedPayment {
    pub receipt_number: String,
    pub sale: SaleWithItems,
}
