use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::sea_orm_active_enums::StockType;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CartLineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
    #[serde(default)]
    pub stock_type: StockType,
    #[serde(default)]
    pub discount: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidateCartRequest {
    pub items: Vec<CartLineRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLine {
    pub product_id: Uuid,
    pub name: String,
    pub barcode: Option<String>,
    pub sku: Option<String>,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub stock_type: StockType,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub available_stock: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Cart {
    pub items: Vec<CartLine>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub tax_rate: Decimal,
    pub total: Decimal,
    pub item_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CartErrorType {
    ProductNotFound,
    ProductInactive,
    InsufficientStock,
    InvalidQuantity,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartValidationError {
    pub product_id: Uuid,
    pub product_name: String,
    pub error_type: CartErrorType,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_quantity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_quantity: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartValidation {
    pub cart: Cart,
    pub valid: bool,
    pub errors: Vec<CartValidationError>,
}
