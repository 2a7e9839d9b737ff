use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    entity::sea_orm_active_enums::StockType,
    models::{Product, StockMovement},
    response::Meta,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct StockAdjustRequest {
    pub stock_type: StockType,
    pub delta: i32,
    pub reason: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StockAdjustment {
    pub product: Product,
    pub stock_type: StockType,
    pub quantity_after: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MovementList {
    pub items: Vec<StockMovement>,
    pub meta: Meta,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<Product>,
    pub meta: Meta,
}
