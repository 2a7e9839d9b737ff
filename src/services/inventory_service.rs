use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    audit,
    dto::inventory::{MovementList, ProductList, StockAdjustRequest, StockAdjustment},
    entity::{
        Products, StockMovements,
        products::Column as ProdCol,
        stock_movements::Column as MovementCol,
    },
    error::{AppError, AppResult},
    middleware::auth::ensure_owner,
    models::{Product, StockMovement, StoreAccess},
    response::Meta,
    routes::params::Pagination,
    services::stock_ledger,
    state::AppState,
};

/// Owner-only manual correction of one stock pool.
pub async fn adjust_stock(
    state: &AppState,
    access: &StoreAccess,
    product_id: Uuid,
    req: StockAdjustRequest,
) -> AppResult<StockAdjustment> {
    ensure_owner(access, "adjust stock")?;
    let reason = req.reason.trim();
    if reason.is_empty() {
        return Err(AppError::Validation("reason is required".into()));
    }

    let store_id = access.store.id;
    let txn = state.orm.begin().await?;
    let quantity_after = stock_ledger::adjust(
        &txn,
        product_id,
        store_id,
        req.delta,
        req.stock_type,
        reason,
        access.user_id,
    )
    .await?;
    let product = stock_ledger::find_product(&txn, product_id, store_id)
        .await?
        .ok_or(AppError::ProductNotFound(product_id))?;
    txn.commit().await?;

    tracing::info!(
        product_id = %product_id,
        store_id = %store_id,
        stock_type = ?req.stock_type,
        delta = req.delta,
        quantity_after,
        "stock adjusted"
    );
    audit::record(
        &state.pool,
        access.user_id,
        store_id,
        "stock_adjusted",
        "products",
        json!({
            "product_id": product_id,
            "stock_type": req.stock_type,
            "delta": req.delta,
            "quantity_after": quantity_after,
            "reason": reason,
        }),
    )
    .await;

    Ok(StockAdjustment {
        product: product.into(),
        stock_type: req.stock_type,
        quantity_after,
    })
}

/// Movement history for one product, newest first.
pub async fn list_movements(
    state: &AppState,
    store_id: Uuid,
    product_id: Uuid,
    pagination: Pagination,
) -> AppResult<MovementList> {
    if stock_ledger::find_product(&state.orm, product_id, store_id)
        .await?
        .is_none()
    {
        return Err(AppError::ProductNotFound(product_id));
    }

    let (page, per_page, offset) = pagination.normalize()?;
    let finder = StockMovements::find()
        .filter(
            Condition::all()
                .add(MovementCol::StoreId.eq(store_id))
                .add(MovementCol::ProductId.eq(product_id)),
        )
        .order_by_desc(MovementCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(StockMovement::from)
        .collect();

    Ok(MovementList {
        items,
        meta: Meta::new(page, per_page, total),
    })
}

/// Active products where either pool is at or below its threshold.
pub async fn list_low_stock(
    state: &AppState,
    store_id: Uuid,
    pagination: Pagination,
) -> AppResult<ProductList> {
    let (page, per_page, offset) = pagination.normalize()?;

    let finder = Products::find()
        .filter(
            Condition::all()
                .add(ProdCol::StoreId.eq(store_id))
                .add(ProdCol::IsActive.eq(true))
                .add(
                    Condition::any()
                        .add(Expr::col(ProdCol::StockVenta).lte(Expr::col(ProdCol::MinStockVenta)))
                        .add(
                            Expr::col(ProdCol::StockDeposito)
                                .lte(Expr::col(ProdCol::MinStockDeposito)),
                        ),
                ),
        )
        .order_by_asc(ProdCol::StockVenta)
        .order_by_asc(ProdCol::Name);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    Ok(ProductList {
        items,
        meta: Meta::new(page, per_page, total),
    })
}
