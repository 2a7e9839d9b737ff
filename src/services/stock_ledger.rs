use chrono::Utc;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseTransaction, EntityTrait,
    QueryFilter, QuerySelect, Set,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::prelude::DateTimeWithTimeZone;
use uuid::Uuid;

use crate::{
    entity::{
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
        sea_orm_active_enums::{MovementType, StockType},
        stock_movements::ActiveModel as MovementActive,
    },
    error::{AppError, AppResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    Insufficient { available: i32, requested: i32 },
}

pub fn check(product: &ProductModel, quantity: i32, stock_type: StockType) -> Availability {
    let available = product.stock(stock_type);
    if quantity <= available {
        Availability::Available
    } else {
        Availability::Insufficient {
            available,
            requested: quantity,
        }
    }
}

pub fn insufficient(
    product: &ProductModel,
    stock_type: StockType,
    available: i32,
    requested: i32,
) -> AppError {
    AppError::InsufficientStock {
        product_id: product.id,
        product_name: product.name.clone(),
        stock_type,
        available,
        requested,
    }
}

pub async fn find_product<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    store_id: Uuid,
) -> AppResult<Option<ProductModel>> {
    let product = Products::find()
        .filter(
            Condition::all()
                .add(ProdCol::Id.eq(product_id))
                .add(ProdCol::StoreId.eq(store_id)),
        )
        .one(conn)
        .await?;
    Ok(product)
}

async fn lock_product(
    txn: &DatabaseTransaction,
    product_id: Uuid,
    store_id: Uuid,
) -> AppResult<ProductModel> {
    Products::find()
        .filter(
            Condition::all()
                .add(ProdCol::Id.eq(product_id))
                .add(ProdCol::StoreId.eq(store_id)),
        )
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or(AppError::ProductNotFound(product_id))
}

// Callers must reserve in ascending product id order.
pub async fn reserve_and_check(
    txn: &DatabaseTransaction,
    product_id: Uuid,
    store_id: Uuid,
    quantity: i32,
    stock_type: StockType,
) -> AppResult<(ProductModel, Availability)> {
    let product = lock_product(txn, product_id, store_id).await?;
    let availability = check(&product, quantity, stock_type);
    Ok((product, availability))
}

/// Decrement a pool for a sale. Going below zero here means a reservation was bypassed.
pub async fn debit(
    txn: &DatabaseTransaction,
    product_id: Uuid,
    store_id: Uuid,
    quantity: i32,
    stock_type: StockType,
    reason: &str,
    performed_by: Uuid,
) -> AppResult<i32> {
    if quantity <= 0 {
        return Err(AppError::Validation("debit quantity must be positive".into()));
    }
    apply(
        txn,
        product_id,
        store_id,
        -quantity,
        stock_type,
        MovementType::Sale,
        reason,
        performed_by,
    )
    .await
}

/// Inverse of [`debit`]; no upper bound is enforced.
pub async fn credit(
    txn: &DatabaseTransaction,
    product_id: Uuid,
    store_id: Uuid,
    quantity: i32,
    stock_type: StockType,
    reason: &str,
    performed_by: Uuid,
) -> AppResult<i32> {
    if quantity <= 0 {
        return Err(AppError::Validation("credit quantity must be positive".into()));
    }
    apply(
        txn,
        product_id,
        store_id,
        quantity,
        stock_type,
        MovementType::Refund,
        reason,
        performed_by,
    )
    .await
}

/// Manual correction by a store owner, in either direction.
pub async fn adjust(
    txn: &DatabaseTransaction,
    product_id: Uuid,
    store_id: Uuid,
    delta: i32,
    stock_type: StockType,
    reason: &str,
    performed_by: Uuid,
) -> AppResult<i32> {
    if delta == 0 {
        return Err(AppError::Validation("delta must not be 0".into()));
    }
    apply(
        txn,
        product_id,
        store_id,
        delta,
        stock_type,
        MovementType::Adjustment,
        reason,
        performed_by,
    )
    .await
}

#[allow(clippy::too_many_arguments)]
async fn apply(
    txn: &DatabaseTransaction,
    product_id: Uuid,
    store_id: Uuid,
    delta: i32,
    stock_type: StockType,
    movement_type: MovementType,
    reason: &str,
    performed_by: Uuid,
) -> AppResult<i32> {
    let product = lock_product(txn, product_id, store_id).await?;
    let before = product.stock(stock_type);
    let after = before
        .checked_add(delta)
        .ok_or_else(|| AppError::Validation("stock quantity out of range".into()))?;

    if after < 0 {
        return Err(match movement_type {
            MovementType::Adjustment => AppError::Validation(format!(
                "stock cannot be negative: {} has {before}, adjustment {delta}",
                product.name
            )),
            _ => {
                tracing::error!(
                    product_id = %product_id,
                    before,
                    delta,
                    "stock would go negative after reservation"
                );
                AppError::NegativeStock {
                    product_id,
                    before,
                    requested: -delta,
                }
            }
        });
    }

    let now: DateTimeWithTimeZone = Utc::now().into();
    Products::update_many()
        .col_expr(stock_column(stock_type), Expr::value(after))
        .col_expr(ProdCol::UpdatedAt, Expr::value(now))
        .filter(
            Condition::all()
                .add(ProdCol::Id.eq(product_id))
                .add(ProdCol::StoreId.eq(store_id)),
        )
        .exec(txn)
        .await?;

    MovementActive {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        store_id: Set(store_id),
        movement_type: Set(movement_type),
        stock_type: Set(stock_type),
        quantity_change: Set(delta),
        quantity_before: Set(before),
        quantity_after: Set(after),
        reason: Set(reason.to_string()),
        performed_by: Set(performed_by),
        created_at: NotSet,
    }
    .insert(txn)
    .await?;

    Ok(after)
}

fn stock_column(stock_type: StockType) -> ProdCol {
    match stock_type {
        StockType::Venta => ProdCol::StockVenta,
        StockType::Deposito => ProdCol::StockDeposito,
    }
}
