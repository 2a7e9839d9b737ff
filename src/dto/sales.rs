use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dto::cart::CartLineRequest,
    models::Sale,
    response::Meta,
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateSaleRequest {
    pub items: Vec<CartLineRequest>,
    /// `cash` or `card`; anything else is rejected with `INVALID_PAYMENT_METHOD`.
    pub payment_method: String,
    pub payment_received: Option<Decimal>,
    #[serde(default)]
    pub discount: Decimal,
    pub notes: Option<String>,
    /// Client token; resubmitting the same key returns the original sale.
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaleList {
    pub items: Vec<Sale>,
    pub meta: Meta,
}

#[derive(Debug, Default, Serialize, ToSchema)]
pub struct PaymentMethodSummary {
    pub count: i64,
    pub total: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total_sales: i64,
    pub total_revenue: Decimal,
    pub average_sale: Decimal,
    pub cash: PaymentMethodSummary,
    pub card: PaymentMethodSummary,
    pub refunded_count: i64,
    pub generated_at: DateTime<Utc>,
}
