use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use crate::{
    dto::sales::{DailySummary, PaymentMethodSummary, SaleList},
    entity::{
        SaleItems, Sales,
        sale_items::{Column as SaleItemCol, Model as SaleItemModel},
        sales::{Column as SaleCol, Model as SaleModel},
    },
    error::{AppError, AppResult},
    models::{Sale, SaleWithItems},
    pricing::round_money,
    response::Meta,
    routes::params::{SaleListQuery, SortOrder},
    state::AppState,
};

pub async fn list_sales(
    state: &AppState,
    store_id: Uuid,
    query: SaleListQuery,
) -> AppResult<SaleList> {
    let (page, per_page, offset) = query.pagination()?;

    let mut condition = Condition::all().add(SaleCol::StoreId.eq(store_id));
    if let Some(user_id) = query.user_id {
        condition = condition.add(SaleCol::UserId.eq(user_id));
    }
    if let Some(method) = query.payment_method {
        condition = condition.add(SaleCol::PaymentMethod.eq(method));
    }
    if let Some(status) = query.payment_status {
        condition = condition.add(SaleCol::PaymentStatus.eq(status));
    }
    if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
        if start > end {
            return Err(AppError::Validation(
                "start_date must not be after end_date".into(),
            ));
        }
    }
    if let Some(start) = query.start_date {
        condition = condition.add(SaleCol::CreatedAt.gte(day_start(start)));
    }
    if let Some(end) = query.end_date {
        condition = condition.add(SaleCol::CreatedAt.lt(day_end(end)?));
    }

    let mut finder = Sales::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(SaleCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(SaleCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Sale::from)
        .collect();

    Ok(SaleList {
        items,
        meta: Meta::new(page, per_page, total),
    })
}

pub async fn get_sale(state: &AppState, store_id: Uuid, sale_id: Uuid) -> AppResult<SaleWithItems> {
    let sale = find_sale(&state.orm, store_id, sale_id)
        .await?
        .ok_or(AppError::SaleNotFound)?;
    let items = load_items(&state.orm, sale.id).await?;
    Ok(SaleWithItems::from_entities(sale, items))
}

pub async fn find_sale<C: ConnectionTrait>(
    conn: &C,
    store_id: Uuid,
    sale_id: Uuid,
) -> AppResult<Option<SaleModel>> {
    let sale = Sales::find()
        .filter(
            Condition::all()
                .add(SaleCol::Id.eq(sale_id))
                .add(SaleCol::StoreId.eq(store_id)),
        )
        .one(conn)
        .await?;
    Ok(sale)
}

/// Items in the order they were submitted.
pub async fn load_items<C: ConnectionTrait>(conn: &C, sale_id: Uuid) -> AppResult<Vec<SaleItemModel>> {
    let items = SaleItems::find()
        .filter(SaleItemCol::SaleId.eq(sale_id))
        .order_by_asc(SaleItemCol::Position)
        .all(conn)
        .await?;
    Ok(items)
}

pub async fn find_by_idempotency_key<C: ConnectionTrait>(
    conn: &C,
    store_id: Uuid,
    key: &str,
) -> AppResult<Option<SaleWithItems>> {
    let sale = Sales::find()
        .filter(
            Condition::all()
                .add(SaleCol::StoreId.eq(store_id))
                .add(SaleCol::IdempotencyKey.eq(key)),
        )
        .one(conn)
        .await?;

    match sale {
        Some(sale) => {
            let items = load_items(conn, sale.id).await?;
            Ok(Some(SaleWithItems::from_entities(sale, items)))
        }
        None => Ok(None),
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DailyTotalsRow {
    completed_count: i64,
    completed_total: Decimal,
    cash_count: i64,
    cash_total: Decimal,
    card_count: i64,
    card_total: Decimal,
    refunded_count: i64,
}

/// Completed-sale totals for one UTC day.
pub async fn daily_summary(
    state: &AppState,
    store_id: Uuid,
    date: NaiveDate,
) -> AppResult<DailySummary> {
    let from = day_start(date);
    let to = day_end(date)?;

    let row = sqlx::query_as::<_, DailyTotalsRow>(
        r#"
        SELECT
            COUNT(*) FILTER (WHERE payment_status = 'completed') AS completed_count,
            COALESCE(SUM(total) FILTER (WHERE payment_status = 'completed'), 0) AS completed_total,
            COUNT(*) FILTER (WHERE payment_status = 'completed' AND payment_method = 'cash') AS cash_count,
            COALESCE(SUM(total) FILTER (WHERE payment_status = 'completed' AND payment_method = 'cash'), 0) AS cash_total,
            COUNT(*) FILTER (WHERE payment_status = 'completed' AND payment_method = 'card') AS card_count,
            COALESCE(SUM(total) FILTER (WHERE payment_status = 'completed' AND payment_method = 'card'), 0) AS card_total,
            COUNT(*) FILTER (WHERE payment_status = 'refunded') AS refunded_count
        FROM sales
        WHERE store_id = $1 AND created_at >= $2 AND created_at < $3
        "#,
    )
    .bind(store_id)
    .bind(from)
    .bind(to)
    .fetch_one(&state.pool)
    .await?;

    let average_sale = if row.completed_count > 0 {
        round_money(row.completed_total / Decimal::from(row.completed_count))
    } else {
        Decimal::ZERO
    };

    Ok(DailySummary {
        date,
        total_sales: row.completed_count,
        total_revenue: round_money(row.completed_total),
        average_sale,
        cash: PaymentMethodSummary {
            count: row.cash_count,
            total: round_money(row.cash_total),
        },
        card: PaymentMethodSummary {
            count: row.card_count,
            total: round_money(row.card_total),
        },
        refunded_count: row.refunded_count,
        generated_at: Utc::now(),
    })
}

fn day_start(date: NaiveDate) -> chrono::DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

fn day_end(date: NaiveDate) -> AppResult<chrono::DateTime<Utc>> {
    let next = date
        .succ_opt()
        .ok_or_else(|| AppError::Validation(format!("date {date} is out of range")))?;
    Ok(day_start(next))
}
