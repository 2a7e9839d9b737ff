use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    products, sale_items, sales,
    sea_orm_active_enums::{MovementType, PaymentMethod, PaymentStatus, StockType, StoreRole},
    stock_movements, stores,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Store {
    pub id: Uuid,
    pub name: String,
    pub currency: String,
    pub tax_rate: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// The caller's view of a store: the store itself plus their membership role.
#[derive(Debug, Clone)]
pub struct StoreAccess {
    pub store: Store,
    pub user_id: Uuid,
    pub role: StoreRole,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub store_id: Uuid,
    pub name: String,
    pub barcode: Option<String>,
    pub sku: Option<String>,
    pub price: Decimal,
    pub cost: Decimal,
    pub stock_venta: i32,
    pub min_stock_venta: i32,
    pub stock_deposito: i32,
    pub min_stock_deposito: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Sale {
    pub id: Uuid,
    pub store_id: Uuid,
    pub user_id: Uuid,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub tax_rate: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub receipt_number: String,
    pub payment_received: Option<Decimal>,
    pub change_returned: Option<Decimal>,
    pub payment_intent_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SaleItem {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_sku: Option<String>,
    pub product_barcode: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub stock_type: StockType,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SaleWithItems {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StockMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub store_id: Uuid,
    pub movement_type: MovementType,
    pub stock_type: StockType,
    pub quantity_change: i32,
    pub quantity_before: i32,
    pub quantity_after: i32,
    pub reason: String,
    pub performed_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<stores::Model> for Store {
    fn from(model: stores::Model) -> Self {
        Store {
            id: model.id,
            name: model.name,
            currency: model.currency,
            tax_rate: model.tax_rate,
            is_active: model.is_active,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Product {
            id: model.id,
            store_id: model.store_id,
            name: model.name,
            barcode: model.barcode,
            sku: model.sku,
            price: model.price,
            cost: model.cost,
            stock_venta: model.stock_venta,
            min_stock_venta: model.min_stock_venta,
            stock_deposito: model.stock_deposito,
            min_stock_deposito: model.min_stock_deposito,
            is_active: model.is_active,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<sales::Model> for Sale {
    fn from(model: sales::Model) -> Self {
        Sale {
            id: model.id,
            store_id: model.store_id,
            user_id: model.user_id,
            subtotal: model.subtotal,
            tax: model.tax,
            tax_rate: model.tax_rate,
            discount: model.discount,
            total: model.total,
            payment_method: model.payment_method,
            payment_status: model.payment_status,
            receipt_number: model.receipt_number,
            payment_received: model.payment_received,
            change_returned: model.change_returned,
            payment_intent_id: model.payment_intent_id,
            notes: model.notes,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
            completed_at: model.completed_at.map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

impl From<sale_items::Model> for SaleItem {
    fn from(model: sale_items::Model) -> Self {
        SaleItem {
            id: model.id,
            sale_id: model.sale_id,
            product_id: model.product_id,
            product_name: model.product_name,
            product_sku: model.product_sku,
            product_barcode: model.product_barcode,
            quantity: model.quantity,
            unit_price: model.unit_price,
            subtotal: model.subtotal,
            discount: model.discount,
            total: model.total,
            stock_type: model.stock_type,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<stock_movements::Model> for StockMovement {
    fn from(model: stock_movements::Model) -> Self {
        StockMovement {
            id: model.id,
            product_id: model.product_id,
            store_id: model.store_id,
            movement_type: model.movement_type,
            stock_type: model.stock_type,
            quantity_change: model.quantity_change,
            quantity_before: model.quantity_before,
            quantity_after: model.quantity_after,
            reason: model.reason,
            performed_by: model.performed_by,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl SaleWithItems {
    pub fn from_entities(sale: sales::Model, items: Vec<sale_items::Model>) -> Self {
        SaleWithItems {
            sale: sale.into(),
            items: items.into_iter().map(SaleItem::from).collect(),
        }
    }
}
