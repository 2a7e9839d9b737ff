use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QuerySelect, Set, SqlErr, TransactionTrait,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    audit,
    dto::{cart::CartLineRequest, sales::CreateSaleRequest},
    entity::{
        Sales,
        products::Model as ProductModel,
        sale_items::{ActiveModel as SaleItemActive, Model as SaleItemModel},
        sales::{ActiveModel as SaleActive, Column as SaleCol, Model as SaleModel},
        sea_orm_active_enums::{PaymentMethod, PaymentStatus, StockType},
    },
    error::{AppError, AppResult},
    models::{Sale, SaleWithItems},
    pricing::{self, PricingLine},
    services::{
        receipt_number,
        sale_service::{find_by_idempotency_key, load_items},
        stock_ledger::{self, Availability},
        store_service,
    },
    state::AppState,
};

const IDEMPOTENCY_CONSTRAINT: &str = "sales_store_idempotency_key_key";
const RECEIPT_CONSTRAINT: &str = "sales_store_receipt_number_key";
const MAX_IDEMPOTENCY_KEY_LEN: usize = 255;

pub fn parse_payment_method(raw: &str) -> AppResult<PaymentMethod> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "cash" => Ok(PaymentMethod::Cash),
        "card" => Ok(PaymentMethod::Card),
        other => Err(AppError::InvalidPaymentMethod(other.to_string())),
    }
}

/// Reject any status change outside `pending -> completed | failed` and `completed -> refunded`.
pub fn ensure_transition(from: PaymentStatus, to: PaymentStatus) -> AppResult<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(AppError::InvalidStateTransition { from, to })
    }
}

/// Sum requested quantities per `(product, pool)`. The map's ordering is the lock order.
pub fn stock_requirements<I>(lines: I) -> AppResult<BTreeMap<(Uuid, StockType), i32>>
where
    I: IntoIterator<Item = (Uuid, StockType, i32)>,
{
    let mut required: BTreeMap<(Uuid, StockType), i32> = BTreeMap::new();
    for (product_id, stock_type, quantity) in lines {
        if quantity <= 0 {
            return Err(AppError::Validation(format!(
                "quantity for product {product_id} must be greater than 0"
            )));
        }
        let entry = required.entry((product_id, stock_type)).or_insert(0);
        *entry = entry
            .checked_add(quantity)
            .ok_or_else(|| AppError::Validation("quantity out of range".into()))?;
    }
    Ok(required)
}

/// Cash sales complete and debit stock here; card sales stay `pending` until confirmed.
pub async fn process_sale(
    state: &AppState,
    store_id: Uuid,
    user_id: Uuid,
    req: CreateSaleRequest,
) -> AppResult<SaleWithItems> {
    if req.items.is_empty() {
        return Err(AppError::Validation("Cart is empty".into()));
    }
    let payment_method = parse_payment_method(&req.payment_method)?;
    let idempotency_key = normalize_key(req.idempotency_key.as_deref())?;
    pricing::ensure_money("discount", req.discount)?;
    if let Some(received) = req.payment_received {
        pricing::ensure_money("payment_received", received)?;
    }

    if let Some(key) = idempotency_key.as_deref() {
        if let Some(existing) = find_by_idempotency_key(&state.orm, store_id, key).await? {
            tracing::info!(sale_id = %existing.sale.id, store_id = %store_id, "idempotent replay");
            return Ok(existing);
        }
    }

    let created = create_sale(
        state,
        store_id,
        user_id,
        payment_method,
        idempotency_key.clone(),
        &req,
    )
    .await;

    let sale = match created {
        Ok(sale) => sale,
        Err(err) => {
            // A concurrent submission with the same key may have won the race.
            if let Some(key) = idempotency_key.as_deref() {
                if let Some(existing) = find_by_idempotency_key(&state.orm, store_id, key).await? {
                    tracing::info!(
                        sale_id = %existing.sale.id,
                        store_id = %store_id,
                        "idempotent replay after conflict"
                    );
                    return Ok(existing);
                }
            }
            return Err(err);
        }
    };

    tracing::info!(
        sale_id = %sale.sale.id,
        store_id = %store_id,
        receipt_number = %sale.sale.receipt_number,
        status = %sale.sale.payment_status,
        "sale created"
    );
    audit::record(
        &state.pool,
        user_id,
        store_id,
        "sale_created",
        "sales",
        json!({
            "sale_id": sale.sale.id,
            "receipt_number": sale.sale.receipt_number,
            "payment_method": sale.sale.payment_method,
            "status": sale.sale.payment_status,
            "total": sale.sale.total,
        }),
    )
    .await;

    Ok(sale)
}

async fn create_sale(
    state: &AppState,
    store_id: Uuid,
    user_id: Uuid,
    payment_method: PaymentMethod,
    idempotency_key: Option<String>,
    req: &CreateSaleRequest,
) -> AppResult<SaleWithItems> {
    let txn = state.orm.begin().await?;

    let store = store_service::find_store(&txn, store_id).await?;
    let tax_rate = store_service::tax_rate(&store)?;

    let required = stock_requirements(
        req.items
            .iter()
            .map(|line| (line.product_id, line.stock_type, line.quantity)),
    )?;

    let deferred = payment_method.requires_confirmation();
    let products = check_products(&txn, store_id, &required, !deferred).await?;

    let lines = req
        .items
        .iter()
        .map(|line| pricing_line(line, &products))
        .collect::<AppResult<Vec<_>>>()?;
    let totals = pricing::compute(&lines, tax_rate, req.discount)?;
    if deferred && totals.total <= Decimal::ZERO {
        return Err(AppError::Validation(
            "card sales need a total above zero".into(),
        ));
    }

    let (payment_received, change_returned) = match payment_method {
        PaymentMethod::Cash => match req.payment_received {
            Some(received) => {
                if received < Decimal::ZERO {
                    return Err(AppError::Validation(
                        "payment_received cannot be negative".into(),
                    ));
                }
                let change = pricing::change_due(totals.total, received)?;
                (Some(pricing::round_money(received)), Some(change))
            }
            None => (None, None),
        },
        PaymentMethod::Card => (None, None),
    };

    let receipt = receipt_number::next(&txn, store_id).await?;

    let now = Utc::now();
    let (status, completed_at) = if deferred {
        (PaymentStatus::Pending, None)
    } else {
        (PaymentStatus::Completed, Some(now.into()))
    };

    let sale = SaleActive {
        id: Set(Uuid::new_v4()),
        store_id: Set(store_id),
        user_id: Set(user_id),
        subtotal: Set(totals.subtotal),
        tax: Set(totals.tax),
        tax_rate: Set(tax_rate.as_percent()),
        discount: Set(totals.discount),
        total: Set(totals.total),
        payment_method: Set(payment_method),
        payment_status: Set(status),
        receipt_number: Set(receipt.clone()),
        payment_received: Set(payment_received),
        change_returned: Set(change_returned),
        payment_intent_id: Set(None),
        idempotency_key: Set(idempotency_key),
        notes: Set(req
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)),
        created_at: NotSet,
        updated_at: NotSet,
        completed_at: Set(completed_at),
    }
    .insert(&txn)
    .await
    .map_err(map_insert_error)?;

    let mut items: Vec<SaleItemModel> = Vec::with_capacity(req.items.len());
    for (position, (line, priced)) in req.items.iter().zip(lines.iter()).enumerate() {
        let product = product_for(&products, line.product_id)?;
        let amounts = pricing::line_amounts(priced);
        let item = SaleItemActive {
            id: Set(Uuid::new_v4()),
            sale_id: Set(sale.id),
            product_id: Set(product.id),
            product_name: Set(product.name.clone()),
            product_sku: Set(product.sku.clone()),
            product_barcode: Set(product.barcode.clone()),
            quantity: Set(line.quantity),
            unit_price: Set(priced.unit_price),
            subtotal: Set(amounts.subtotal),
            discount: Set(amounts.discount),
            total: Set(amounts.total),
            stock_type: Set(line.stock_type),
            position: Set(position as i32),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items.push(item);
    }

    if !deferred {
        debit_items(&txn, store_id, &items, &receipt, user_id).await?;
    }

    txn.commit().await?;

    Ok(SaleWithItems::from_entities(sale, items))
}

/// If stock is gone by now the sale is committed as `failed` and the stock error returned.
pub async fn confirm_pending_sale(
    state: &AppState,
    store_id: Uuid,
    sale_id: Uuid,
) -> AppResult<SaleWithItems> {
    let txn = state.orm.begin().await?;

    let sale = lock_sale(&txn, store_id, sale_id).await?;
    ensure_transition(sale.payment_status, PaymentStatus::Completed)?;
    let items = load_items(&txn, sale.id).await?;

    let required = stock_requirements(
        items
            .iter()
            .map(|item| (item.product_id, item.stock_type, item.quantity)),
    )?;

    match check_products(&txn, store_id, &required, true).await {
        Ok(_) => {}
        Err(err @ (AppError::InsufficientStock { .. } | AppError::ProductInactive(_))) => {
            let failed = set_status(&txn, sale, PaymentStatus::Failed).await?;
            txn.commit().await?;

            tracing::info!(
                sale_id = %failed.id,
                store_id = %store_id,
                receipt_number = %failed.receipt_number,
                status = %failed.payment_status,
                error = %err,
                "pending sale could not be fulfilled"
            );
            audit::record(
                &state.pool,
                failed.user_id,
                store_id,
                "sale_failed",
                "sales",
                json!({ "sale_id": failed.id, "reason": err.to_string() }),
            )
            .await;
            return Err(err);
        }
        Err(err) => return Err(err),
    }

    debit_items(&txn, store_id, &items, &sale.receipt_number, sale.user_id).await?;
    let sale = set_status(&txn, sale, PaymentStatus::Completed).await?;

    txn.commit().await?;

    tracing::info!(
        sale_id = %sale.id,
        store_id = %store_id,
        receipt_number = %sale.receipt_number,
        status = %sale.payment_status,
        "pending sale completed"
    );
    audit::record(
        &state.pool,
        sale.user_id,
        store_id,
        "sale_completed",
        "sales",
        json!({ "sale_id": sale.id, "receipt_number": sale.receipt_number }),
    )
    .await;

    Ok(SaleWithItems::from_entities(sale, items))
}

pub async fn fail_pending_sale(
    state: &AppState,
    store_id: Uuid,
    sale_id: Uuid,
    reason: &str,
) -> AppResult<Sale> {
    let txn = state.orm.begin().await?;
    let sale = lock_sale(&txn, store_id, sale_id).await?;
    ensure_transition(sale.payment_status, PaymentStatus::Failed)?;
    let sale = set_status(&txn, sale, PaymentStatus::Failed).await?;
    txn.commit().await?;

    tracing::info!(
        sale_id = %sale.id,
        store_id = %store_id,
        receipt_number = %sale.receipt_number,
        status = %sale.payment_status,
        reason,
        "pending sale failed"
    );
    audit::record(
        &state.pool,
        sale.user_id,
        store_id,
        "sale_failed",
        "sales",
        json!({ "sale_id": sale.id, "reason": reason }),
    )
    .await;

    Ok(sale.into())
}

/// Return every item's quantity to the pool it came from and mark the sale `refunded`.
pub async fn refund_sale(
    state: &AppState,
    store_id: Uuid,
    sale_id: Uuid,
    user_id: Uuid,
) -> AppResult<SaleWithItems> {
    let txn = state.orm.begin().await?;

    let sale = lock_sale(&txn, store_id, sale_id).await?;
    ensure_transition(sale.payment_status, PaymentStatus::Refunded)?;
    let items = load_items(&txn, sale.id).await?;

    let mut ordered: Vec<&SaleItemModel> = items.iter().collect();
    ordered.sort_by_key(|item| (item.product_id, item.stock_type));

    let reason = format!("Refund {}", sale.receipt_number);
    for item in ordered {
        stock_ledger::credit(
            &txn,
            item.product_id,
            store_id,
            item.quantity,
            item.stock_type,
            &reason,
            user_id,
        )
        .await?;
    }

    let sale = set_status(&txn, sale, PaymentStatus::Refunded).await?;
    txn.commit().await?;

    tracing::info!(
        sale_id = %sale.id,
        store_id = %store_id,
        receipt_number = %sale.receipt_number,
        status = %sale.payment_status,
        "sale refunded"
    );
    audit::record(
        &state.pool,
        user_id,
        store_id,
        "sale_refunded",
        "sales",
        json!({ "sale_id": sale.id, "receipt_number": sale.receipt_number }),
    )
    .await;

    Ok(SaleWithItems::from_entities(sale, items))
}

async fn check_products(
    txn: &DatabaseTransaction,
    store_id: Uuid,
    required: &BTreeMap<(Uuid, StockType), i32>,
    lock: bool,
) -> AppResult<HashMap<Uuid, ProductModel>> {
    let mut products: HashMap<Uuid, ProductModel> = HashMap::new();

    for (&(product_id, stock_type), &quantity) in required {
        let (product, availability) = if lock {
            stock_ledger::reserve_and_check(txn, product_id, store_id, quantity, stock_type)
                .await?
        } else {
            let product = stock_ledger::find_product(txn, product_id, store_id)
                .await?
                .ok_or(AppError::ProductNotFound(product_id))?;
            let availability = stock_ledger::check(&product, quantity, stock_type);
            (product, availability)
        };

        if !product.is_active {
            return Err(AppError::ProductInactive(product.name));
        }
        if let Availability::Insufficient {
            available,
            requested,
        } = availability
        {
            return Err(stock_ledger::insufficient(
                &product, stock_type, available, requested,
            ));
        }
        products.insert(product_id, product);
    }

    Ok(products)
}

fn product_for(products: &HashMap<Uuid, ProductModel>, product_id: Uuid) -> AppResult<&ProductModel> {
    products
        .get(&product_id)
        .ok_or(AppError::ProductNotFound(product_id))
}

/// Unit price is always the product's current price.
fn pricing_line(line: &CartLineRequest, products: &HashMap<Uuid, ProductModel>) -> AppResult<PricingLine> {
    let product = product_for(products, line.product_id)?;
    Ok(PricingLine::new(product.price, line.quantity, line.discount))
}

async fn debit_items(
    txn: &DatabaseTransaction,
    store_id: Uuid,
    items: &[SaleItemModel],
    receipt_number: &str,
    performed_by: Uuid,
) -> AppResult<()> {
    let reason = format!("Sale {receipt_number}");
    for item in items {
        stock_ledger::debit(
            txn,
            item.product_id,
            store_id,
            item.quantity,
            item.stock_type,
            &reason,
            performed_by,
        )
        .await?;
    }
    Ok(())
}

async fn lock_sale(txn: &DatabaseTransaction, store_id: Uuid, sale_id: Uuid) -> AppResult<SaleModel> {
    Sales::find()
        .filter(
            Condition::all()
                .add(SaleCol::Id.eq(sale_id))
                .add(SaleCol::StoreId.eq(store_id)),
        )
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or(AppError::SaleNotFound)
}

async fn set_status(
    txn: &DatabaseTransaction,
    sale: SaleModel,
    status: PaymentStatus,
) -> AppResult<SaleModel> {
    let now = Utc::now();
    let mut active: SaleActive = sale.into();
    active.payment_status = Set(status);
    active.updated_at = Set(now.into());
    if status == PaymentStatus::Completed {
        active.completed_at = Set(Some(now.into()));
    }
    Ok(active.update(txn).await?)
}

fn normalize_key(raw: Option<&str>) -> AppResult<Option<String>> {
    let Some(key) = raw.map(str::trim).filter(|k| !k.is_empty()) else {
        return Ok(None);
    };
    if key.len() > MAX_IDEMPOTENCY_KEY_LEN {
        return Err(AppError::Validation(format!(
            "idempotency_key must be at most {MAX_IDEMPOTENCY_KEY_LEN} characters"
        )));
    }
    Ok(Some(key.to_string()))
}

fn map_insert_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) if message.contains(RECEIPT_CONSTRAINT) => {
            AppError::Conflict("receipt number already assigned, retry the sale".into())
        }
        Some(SqlErr::UniqueConstraintViolation(message))
            if message.contains(IDEMPOTENCY_CONSTRAINT) =>
        {
            AppError::Conflict("a sale with this idempotency key already exists".into())
        }
        _ => AppError::OrmError(err),
    }
}
