use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    dto::cart::{
        Cart, CartErrorType, CartLine, CartValidation, CartValidationError, ValidateCartRequest,
    },
    entity::sea_orm_active_enums::StockType,
    error::{AppError, AppResult},
    pricing::{self, PricingLine},
    services::{stock_ledger, store_service},
    state::AppState,
};

/// Price a cart and check it against current stock without locking or writing anything.
///
/// Per-product problems are collected into `errors` instead of failing the
/// request; lines whose product could be loaded are still priced.
pub async fn validate_cart(
    state: &AppState,
    store_id: Uuid,
    req: ValidateCartRequest,
) -> AppResult<CartValidation> {
    if req.items.is_empty() {
        return Err(AppError::Validation("Cart is empty".into()));
    }

    let store = store_service::find_store(&state.orm, store_id).await?;
    let tax_rate = store_service::tax_rate(&store)?;

    let mut requested: BTreeMap<(Uuid, StockType), i32> = BTreeMap::new();
    for line in req.items.iter().filter(|l| l.quantity > 0) {
        let entry = requested.entry((line.product_id, line.stock_type)).or_insert(0);
        *entry = entry.saturating_add(line.quantity);
    }

    let mut errors: Vec<CartValidationError> = Vec::new();
    let mut reported: HashSet<(Uuid, StockType)> = HashSet::new();
    let mut lines: Vec<CartLine> = Vec::new();
    let mut priced: Vec<PricingLine> = Vec::new();

    for line in &req.items {
        if line.quantity <= 0 {
            errors.push(CartValidationError {
                product_id: line.product_id,
                product_name: String::new(),
                error_type: CartErrorType::InvalidQuantity,
                message: "Quantity must be greater than 0".into(),
                requested_quantity: Some(line.quantity),
                available_quantity: None,
            });
            continue;
        }

        let Some(product) = stock_ledger::find_product(&state.orm, line.product_id, store_id).await?
        else {
            errors.push(CartValidationError {
                product_id: line.product_id,
                product_name: String::new(),
                error_type: CartErrorType::ProductNotFound,
                message: format!("Product {} not found", line.product_id),
                requested_quantity: Some(line.quantity),
                available_quantity: None,
            });
            continue;
        };

        if !product.is_active {
            errors.push(CartValidationError {
                product_id: product.id,
                product_name: product.name.clone(),
                error_type: CartErrorType::ProductInactive,
                message: format!("Product {} is not active", product.name),
                requested_quantity: Some(line.quantity),
                available_quantity: None,
            });
            continue;
        }

        let key = (product.id, line.stock_type);
        let total_requested = requested.get(&key).copied().unwrap_or(line.quantity);
        let available = product.stock(line.stock_type);
        if total_requested > available && reported.insert(key) {
            errors.push(CartValidationError {
                product_id: product.id,
                product_name: product.name.clone(),
                error_type: CartErrorType::InsufficientStock,
                message: format!(
                    "Insufficient stock for {}. Available: {available}, Requested: {total_requested}",
                    product.name
                ),
                requested_quantity: Some(total_requested),
                available_quantity: Some(available),
            });
        }

        let pricing_line = PricingLine::new(product.price, line.quantity, line.discount);
        pricing_line.validate()?;
        let amounts = pricing::line_amounts(&pricing_line);
        priced.push(pricing_line);
        lines.push(CartLine {
            product_id: product.id,
            name: product.name,
            barcode: product.barcode,
            sku: product.sku,
            unit_price: product.price,
            quantity: line.quantity,
            stock_type: line.stock_type,
            subtotal: amounts.subtotal,
            discount: amounts.discount,
            total: amounts.total,
            available_stock: available,
        });
    }

    let totals = if priced.is_empty() {
        pricing::Totals {
            subtotal: Decimal::ZERO,
            tax: Decimal::ZERO,
            discount: Decimal::ZERO,
            total: Decimal::ZERO,
        }
    } else {
        pricing::compute_cart(&priced, tax_rate)?
    };
    let item_count = lines.iter().map(|l| i64::from(l.quantity)).sum();

    Ok(CartValidation {
        valid: errors.is_empty(),
        errors,
        cart: Cart {
            items: lines,
            subtotal: totals.subtotal,
            tax: totals.tax,
            tax_rate: tax_rate.as_percent(),
            total: totals.total,
            item_count,
        },
    })
}
