mod common;

use axum_pos_api::{
    dto::{
        cart::{CartErrorType, ValidateCartRequest},
        inventory::StockAdjustRequest,
    },
    entity::{
        Sales,
        products::ActiveModel as ProductActive,
        sales::Column as SaleCol,
        sea_orm_active_enums::{MovementType, PaymentStatus, StockType},
    },
    error::AppError,
    routes::params::{Pagination, SaleListQuery},
    services::{
        cart_service, inventory_service, receipt_number::parse_receipt_number, refund_service,
        sale_engine, sale_service,
    },
};
use chrono::{Datelike, Utc};
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};

use common::{card_sale, cash_sale, create_product, create_shop, line, movements, reload, setup};

#[tokio::test]
async fn cart_validates_with_store_tax() -> anyhow::Result<()> {
    let Some(ctx) = setup().await? else {
        return Ok(());
    };
    let shop = create_shop(&ctx.state, dec!(16)).await?;
    let mug = create_product(&ctx.state, shop.store.id, "Mug", dec!(10.00), 5, 0).await?;

    let validation = cart_service::validate_cart(
        &ctx.state,
        shop.store.id,
        ValidateCartRequest {
            items: vec![line(mug.id, 3)],
        },
    )
    .await?;

    assert!(validation.valid);
    assert!(validation.errors.is_empty());
    assert_eq!(validation.cart.subtotal, dec!(30.00));
    assert_eq!(validation.cart.tax, dec!(4.80));
    assert_eq!(validation.cart.total, dec!(34.80));
    assert_eq!(validation.cart.item_count, 3);
    assert_eq!(validation.cart.items[0].available_stock, 5);

    // Dry run: nothing moved.
    assert_eq!(reload(&ctx.state, mug.id).await?.stock_venta, 5);
    assert!(movements(&ctx.state, mug.id).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn cart_reports_insufficient_stock() -> anyhow::Result<()> {
    let Some(ctx) = setup().await? else {
        return Ok(());
    };
    let shop = create_shop(&ctx.state, dec!(16)).await?;
    let mug = create_product(&ctx.state, shop.store.id, "Mug", dec!(10.00), 5, 0).await?;

    let validation = cart_service::validate_cart(
        &ctx.state,
        shop.store.id,
        ValidateCartRequest {
            items: vec![line(mug.id, 6)],
        },
    )
    .await?;

    assert!(!validation.valid);
    assert_eq!(validation.errors.len(), 1);
    let error = &validation.errors[0];
    assert_eq!(error.error_type, CartErrorType::InsufficientStock);
    assert_eq!(error.available_quantity, Some(5));
    assert_eq!(error.requested_quantity, Some(6));
    Ok(())
}

#[tokio::test]
async fn cart_reports_unknown_and_inactive_products() -> anyhow::Result<()> {
    let Some(ctx) = setup().await? else {
        return Ok(());
    };
    let shop = create_shop(&ctx.state, dec!(0)).await?;
    let retired = create_product(&ctx.state, shop.store.id, "Retired", dec!(2.00), 5, 0).await?;
    let mut active: ProductActive = retired.clone().into();
    active.is_active = Set(false);
    active.update(&ctx.state.orm).await?;

    let validation = cart_service::validate_cart(
        &ctx.state,
        shop.store.id,
        ValidateCartRequest {
            items: vec![line(uuid::Uuid::new_v4(), 1), line(retired.id, 1)],
        },
    )
    .await?;

    assert!(!validation.valid);
    let kinds: Vec<_> = validation.errors.iter().map(|e| e.error_type).collect();
    assert_eq!(
        kinds,
        vec![CartErrorType::ProductNotFound, CartErrorType::ProductInactive]
    );
    Ok(())
}

#[tokio::test]
async fn cash_sale_completes_and_debits_immediately() -> anyhow::Result<()> {
    let Some(ctx) = setup().await? else {
        return Ok(());
    };
    let shop = create_shop(&ctx.state, dec!(16)).await?;
    let mug = create_product(&ctx.state, shop.store.id, "Mug", dec!(10.00), 5, 0).await?;

    let sale = sale_engine::process_sale(
        &ctx.state,
        shop.store.id,
        shop.cashier,
        cash_sale(vec![line(mug.id, 3)], Some(dec!(40.00))),
    )
    .await?;

    assert_eq!(sale.sale.payment_status, PaymentStatus::Completed);
    assert_eq!(sale.sale.total, dec!(34.80));
    assert_eq!(sale.sale.tax_rate, dec!(16));
    assert_eq!(sale.sale.payment_received, Some(dec!(40.00)));
    assert_eq!(sale.sale.change_returned, Some(dec!(5.20)));
    assert!(sale.sale.completed_at.is_some());
    assert_eq!(sale.items.len(), 1);
    assert_eq!(sale.items[0].product_name, "Mug");
    assert_eq!(sale.items[0].stock_type, StockType::Venta);

    let (year, _) = parse_receipt_number(&sale.sale.receipt_number).expect("receipt format");
    assert_eq!(year, Utc::now().year());

    assert_eq!(reload(&ctx.state, mug.id).await?.stock_venta, 2);
    let moves = movements(&ctx.state, mug.id).await?;
    assert_eq!(moves.len(), 1);
    assert_eq!(moves[0].movement_type, MovementType::Sale);
    assert_eq!(moves[0].quantity_change, -3);
    assert_eq!(moves[0].quantity_before, 5);
    assert_eq!(moves[0].quantity_after, 2);
    assert_eq!(moves[0].reason, format!("Sale {}", sale.sale.receipt_number));
    assert_eq!(moves[0].performed_by, shop.cashier);
    Ok(())
}

#[tokio::test]
async fn card_sale_stays_pending_until_confirmed() -> anyhow::Result<()> {
    let Some(ctx) = setup().await? else {
        return Ok(());
    };
    let shop = create_shop(&ctx.state, dec!(16)).await?;
    let mug = create_product(&ctx.state, shop.store.id, "Mug", dec!(10.00), 5, 0).await?;

    let pending = sale_engine::process_sale(
        &ctx.state,
        shop.store.id,
        shop.cashier,
        card_sale(vec![line(mug.id, 3)]),
    )
    .await?;
    assert_eq!(pending.sale.payment_status, PaymentStatus::Pending);
    assert_eq!(pending.sale.payment_received, None);
    assert_eq!(pending.sale.change_returned, None);
    assert!(pending.sale.completed_at.is_none());
    assert_eq!(reload(&ctx.state, mug.id).await?.stock_venta, 5);
    assert!(movements(&ctx.state, mug.id).await?.is_empty());

    let confirmed =
        sale_engine::confirm_pending_sale(&ctx.state, shop.store.id, pending.sale.id).await?;
    assert_eq!(confirmed.sale.payment_status, PaymentStatus::Completed);
    assert_eq!(confirmed.sale.receipt_number, pending.sale.receipt_number);
    assert!(confirmed.sale.completed_at.is_some());
    assert_eq!(reload(&ctx.state, mug.id).await?.stock_venta, 2);
    Ok(())
}

#[tokio::test]
async fn refund_restores_stock_once() -> anyhow::Result<()> {
    let Some(ctx) = setup().await? else {
        return Ok(());
    };
    let shop = create_shop(&ctx.state, dec!(16)).await?;
    let mug = create_product(&ctx.state, shop.store.id, "Mug", dec!(10.00), 5, 0).await?;
    let owner = common::access(&ctx.state, shop.store.id, shop.owner).await?;

    let sale = sale_engine::process_sale(
        &ctx.state,
        shop.store.id,
        shop.cashier,
        cash_sale(vec![line(mug.id, 3)], Some(dec!(40.00))),
    )
    .await?;

    let refunded = refund_service::refund(&ctx.state, &owner, sale.sale.id).await?;
    assert_eq!(refunded.sale.payment_status, PaymentStatus::Refunded);
    assert_eq!(reload(&ctx.state, mug.id).await?.stock_venta, 5);

    let refund_moves: Vec<_> = movements(&ctx.state, mug.id)
        .await?
        .into_iter()
        .filter(|m| m.movement_type == MovementType::Refund)
        .collect();
    assert_eq!(refund_moves.len(), 1);
    assert_eq!(refund_moves[0].quantity_change, 3);
    assert_eq!(refund_moves[0].performed_by, shop.owner);

    let err = refund_service::refund(&ctx.state, &owner, sale.sale.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidStateTransition { .. }));
    assert_eq!(err.code(), "REFUND_FAILED");
    assert_eq!(reload(&ctx.state, mug.id).await?.stock_venta, 5);
    assert_eq!(movements(&ctx.state, mug.id).await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn only_owners_refund() -> anyhow::Result<()> {
    let Some(ctx) = setup().await? else {
        return Ok(());
    };
    let shop = create_shop(&ctx.state, dec!(0)).await?;
    let mug = create_product(&ctx.state, shop.store.id, "Mug", dec!(10.00), 5, 0).await?;
    let cashier = common::access(&ctx.state, shop.store.id, shop.cashier).await?;

    let sale = sale_engine::process_sale(
        &ctx.state,
        shop.store.id,
        shop.cashier,
        cash_sale(vec![line(mug.id, 1)], None),
    )
    .await?;

    let err = refund_service::refund(&ctx.state, &cashier, sale.sale.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let current = sale_service::get_sale(&ctx.state, shop.store.id, sale.sale.id).await?;
    assert_eq!(current.sale.payment_status, PaymentStatus::Completed);
    assert_eq!(reload(&ctx.state, mug.id).await?.stock_venta, 4);
    Ok(())
}

#[tokio::test]
async fn refund_requires_a_completed_sale() -> anyhow::Result<()> {
    let Some(ctx) = setup().await? else {
        return Ok(());
    };
    let shop = create_shop(&ctx.state, dec!(0)).await?;
    let mug = create_product(&ctx.state, shop.store.id, "Mug", dec!(10.00), 5, 0).await?;
    let owner = common::access(&ctx.state, shop.store.id, shop.owner).await?;

    let pending = sale_engine::process_sale(
        &ctx.state,
        shop.store.id,
        shop.cashier,
        card_sale(vec![line(mug.id, 2)]),
    )
    .await?;
    let err = refund_service::refund(&ctx.state, &owner, pending.sale.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidStateTransition { .. }));

    sale_engine::fail_pending_sale(&ctx.state, shop.store.id, pending.sale.id, "test").await?;
    let err = refund_service::refund(&ctx.state, &owner, pending.sale.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidStateTransition { .. }));

    assert_eq!(reload(&ctx.state, mug.id).await?.stock_venta, 5);
    assert!(movements(&ctx.state, mug.id).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn failed_sales_commit_nothing() -> anyhow::Result<()> {
    let Some(ctx) = setup().await? else {
        return Ok(());
    };
    let shop = create_shop(&ctx.state, dec!(16)).await?;
    let mug = create_product(&ctx.state, shop.store.id, "Mug", dec!(10.00), 5, 0).await?;
    let pen = create_product(&ctx.state, shop.store.id, "Pen", dec!(1.00), 1, 0).await?;

    let short = sale_engine::process_sale(
        &ctx.state,
        shop.store.id,
        shop.cashier,
        cash_sale(vec![line(mug.id, 3)], Some(dec!(30.00))),
    )
    .await
    .unwrap_err();
    assert!(matches!(short, AppError::InsufficientPayment { .. }));

    let oversold = sale_engine::process_sale(
        &ctx.state,
        shop.store.id,
        shop.cashier,
        cash_sale(vec![line(mug.id, 2), line(pen.id, 2)], None),
    )
    .await
    .unwrap_err();
    match oversold {
        AppError::InsufficientStock {
            product_name,
            available,
            requested,
            ..
        } => {
            assert_eq!(product_name, "Pen");
            assert_eq!(available, 1);
            assert_eq!(requested, 2);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    let empty = sale_engine::process_sale(&ctx.state, shop.store.id, shop.cashier, cash_sale(vec![], None))
        .await
        .unwrap_err();
    assert!(matches!(empty, AppError::Validation(_)));

    let mut bad_method = cash_sale(vec![line(mug.id, 1)], None);
    bad_method.payment_method = "cheque".into();
    let err = sale_engine::process_sale(&ctx.state, shop.store.id, shop.cashier, bad_method)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidPaymentMethod(_)));

    let missing = sale_engine::process_sale(
        &ctx.state,
        shop.store.id,
        shop.cashier,
        cash_sale(vec![line(uuid::Uuid::new_v4(), 1)], None),
    )
    .await
    .unwrap_err();
    assert!(matches!(missing, AppError::ProductNotFound(_)));

    assert_eq!(reload(&ctx.state, mug.id).await?.stock_venta, 5);
    assert_eq!(reload(&ctx.state, pen.id).await?.stock_venta, 1);
    let sales = Sales::find()
        .filter(SaleCol::StoreId.eq(shop.store.id))
        .count(&ctx.state.orm)
        .await?;
    assert_eq!(sales, 0);
    Ok(())
}

#[tokio::test]
async fn inactive_products_cannot_be_sold() -> anyhow::Result<()> {
    let Some(ctx) = setup().await? else {
        return Ok(());
    };
    let shop = create_shop(&ctx.state, dec!(0)).await?;
    let mug = create_product(&ctx.state, shop.store.id, "Mug", dec!(10.00), 5, 0).await?;
    let mut retired: ProductActive = mug.clone().into();
    retired.is_active = Set(false);
    retired.update(&ctx.state.orm).await?;

    let err = sale_engine::process_sale(
        &ctx.state,
        shop.store.id,
        shop.cashier,
        cash_sale(vec![line(mug.id, 1)], None),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::ProductInactive(_)));
    Ok(())
}

#[tokio::test]
async fn stock_is_conserved_across_sale_and_refund() -> anyhow::Result<()> {
    let Some(ctx) = setup().await? else {
        return Ok(());
    };
    let shop = create_shop(&ctx.state, dec!(8.25)).await?;
    let owner = common::access(&ctx.state, shop.store.id, shop.owner).await?;
    let beans = create_product(&ctx.state, shop.store.id, "Beans", dec!(18.50), 40, 120).await?;
    let filters = create_product(&ctx.state, shop.store.id, "Filters", dec!(3.99), 10, 0).await?;

    let mut warehouse_line = line(beans.id, 7);
    warehouse_line.stock_type = StockType::Deposito;
    let mut discounted = line(filters.id, 3);
    discounted.discount = dec!(1.00);

    let mut req = cash_sale(
        vec![line(beans.id, 2), warehouse_line, discounted, line(beans.id, 1)],
        None,
    );
    req.discount = dec!(5.00);
    let sale = sale_engine::process_sale(&ctx.state, shop.store.id, shop.cashier, req).await?;

    assert_eq!(
        sale.sale.total,
        sale.sale.subtotal + sale.sale.tax - sale.sale.discount
    );
    let positions: Vec<_> = sale.items.iter().map(|i| i.product_name.as_str()).collect();
    assert_eq!(positions, vec!["Beans", "Beans", "Filters", "Beans"]);

    let after = reload(&ctx.state, beans.id).await?;
    assert_eq!(after.stock_venta, 37);
    assert_eq!(after.stock_deposito, 113);
    assert_eq!(reload(&ctx.state, filters.id).await?.stock_venta, 7);

    let debited: i32 = movements(&ctx.state, beans.id)
        .await?
        .iter()
        .map(|m| -m.quantity_change)
        .sum();
    assert_eq!(debited, 10);

    refund_service::refund(&ctx.state, &owner, sale.sale.id).await?;
    let restored = reload(&ctx.state, beans.id).await?;
    assert_eq!(restored.stock_venta, 40);
    assert_eq!(restored.stock_deposito, 120);
    assert_eq!(reload(&ctx.state, filters.id).await?.stock_venta, 10);

    for moves in [
        movements(&ctx.state, beans.id).await?,
        movements(&ctx.state, filters.id).await?,
    ] {
        let net: i32 = moves.iter().map(|m| m.quantity_change).sum();
        assert_eq!(net, 0);
        for m in &moves {
            assert_eq!(m.quantity_after, m.quantity_before + m.quantity_change);
        }
    }
    Ok(())
}

#[tokio::test]
async fn receipt_numbers_increase_per_store() -> anyhow::Result<()> {
    let Some(ctx) = setup().await? else {
        return Ok(());
    };
    let shop = create_shop(&ctx.state, dec!(0)).await?;
    let other = create_shop(&ctx.state, dec!(0)).await?;
    let mug = create_product(&ctx.state, shop.store.id, "Mug", dec!(10.00), 50, 0).await?;
    let cup = create_product(&ctx.state, other.store.id, "Cup", dec!(10.00), 50, 0).await?;

    let mut seqs = Vec::new();
    for _ in 0..3 {
        let sale = sale_engine::process_sale(
            &ctx.state,
            shop.store.id,
            shop.cashier,
            cash_sale(vec![line(mug.id, 1)], None),
        )
        .await?;
        seqs.push(parse_receipt_number(&sale.sale.receipt_number).unwrap().1);
    }
    assert_eq!(seqs, vec![1, 2, 3]);

    let first_elsewhere = sale_engine::process_sale(
        &ctx.state,
        other.store.id,
        other.cashier,
        cash_sale(vec![line(cup.id, 1)], None),
    )
    .await?;
    assert_eq!(
        parse_receipt_number(&first_elsewhere.sale.receipt_number).unwrap().1,
        1
    );
    Ok(())
}

#[tokio::test]
async fn idempotency_key_replays_the_original_sale() -> anyhow::Result<()> {
    let Some(ctx) = setup().await? else {
        return Ok(());
    };
    let shop = create_shop(&ctx.state, dec!(16)).await?;
    let mug = create_product(&ctx.state, shop.store.id, "Mug", dec!(10.00), 5, 0).await?;

    let mut req = cash_sale(vec![line(mug.id, 2)], Some(dec!(50)));
    req.idempotency_key = Some("till-3-0001".into());

    let first =
        sale_engine::process_sale(&ctx.state, shop.store.id, shop.cashier, req.clone()).await?;
    let second = sale_engine::process_sale(&ctx.state, shop.store.id, shop.cashier, req).await?;

    assert_eq!(first.sale.id, second.sale.id);
    assert_eq!(first.sale.receipt_number, second.sale.receipt_number);
    assert_eq!(reload(&ctx.state, mug.id).await?.stock_venta, 3);
    assert_eq!(movements(&ctx.state, mug.id).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn list_filters_and_daily_summary() -> anyhow::Result<()> {
    let Some(ctx) = setup().await? else {
        return Ok(());
    };
    let shop = create_shop(&ctx.state, dec!(0)).await?;
    let owner = common::access(&ctx.state, shop.store.id, shop.owner).await?;
    let mug = create_product(&ctx.state, shop.store.id, "Mug", dec!(10.00), 50, 0).await?;

    let cash = sale_engine::process_sale(
        &ctx.state,
        shop.store.id,
        shop.cashier,
        cash_sale(vec![line(mug.id, 1)], None),
    )
    .await?;
    sale_engine::process_sale(
        &ctx.state,
        shop.store.id,
        shop.owner,
        cash_sale(vec![line(mug.id, 2)], None),
    )
    .await?;
    let card = sale_engine::process_sale(
        &ctx.state,
        shop.store.id,
        shop.cashier,
        card_sale(vec![line(mug.id, 3)]),
    )
    .await?;
    sale_engine::confirm_pending_sale(&ctx.state, shop.store.id, card.sale.id).await?;
    refund_service::refund(&ctx.state, &owner, cash.sale.id).await?;

    let by_cashier = sale_service::list_sales(
        &ctx.state,
        shop.store.id,
        SaleListQuery {
            user_id: Some(shop.cashier),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(by_cashier.meta.total, 2);

    let refunded = sale_service::list_sales(
        &ctx.state,
        shop.store.id,
        SaleListQuery {
            payment_status: Some(PaymentStatus::Refunded),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(refunded.items.len(), 1);
    assert_eq!(refunded.items[0].id, cash.sale.id);

    let paged = sale_service::list_sales(
        &ctx.state,
        shop.store.id,
        SaleListQuery {
            page: Some(2),
            per_page: Some(2),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(paged.meta.total, 3);
    assert_eq!(paged.meta.total_pages, 2);
    assert_eq!(paged.items.len(), 1);

    let summary = sale_service::daily_summary(&ctx.state, shop.store.id, Utc::now().date_naive()).await?;
    assert_eq!(summary.total_sales, 2);
    assert_eq!(summary.total_revenue, dec!(50.00));
    assert_eq!(summary.average_sale, dec!(25.00));
    assert_eq!(summary.cash.count, 1);
    assert_eq!(summary.cash.total, dec!(20.00));
    assert_eq!(summary.card.count, 1);
    assert_eq!(summary.card.total, dec!(30.00));
    assert_eq!(summary.refunded_count, 1);
    Ok(())
}

#[tokio::test]
async fn owner_adjusts_stock_and_sees_history() -> anyhow::Result<()> {
    let Some(ctx) = setup().await? else {
        return Ok(());
    };
    let shop = create_shop(&ctx.state, dec!(0)).await?;
    let owner = common::access(&ctx.state, shop.store.id, shop.owner).await?;
    let cashier = common::access(&ctx.state, shop.store.id, shop.cashier).await?;
    let mug = create_product(&ctx.state, shop.store.id, "Mug", dec!(10.00), 2, 0).await?;

    let low = inventory_service::list_low_stock(&ctx.state, shop.store.id, Pagination::default()).await?;
    assert!(low.items.iter().any(|p| p.id == mug.id));

    let adjusted = inventory_service::adjust_stock(
        &ctx.state,
        &owner,
        mug.id,
        StockAdjustRequest {
            stock_type: StockType::Deposito,
            delta: 24,
            reason: "delivery".into(),
        },
    )
    .await?;
    assert_eq!(adjusted.quantity_after, 24);
    assert_eq!(adjusted.product.stock_deposito, 24);

    let denied = inventory_service::adjust_stock(
        &ctx.state,
        &cashier,
        mug.id,
        StockAdjustRequest {
            stock_type: StockType::Venta,
            delta: 1,
            reason: "found one".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(denied, AppError::Forbidden(_)));

    let negative = inventory_service::adjust_stock(
        &ctx.state,
        &owner,
        mug.id,
        StockAdjustRequest {
            stock_type: StockType::Venta,
            delta: -3,
            reason: "breakage".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(negative, AppError::Validation(_)));

    let zero = inventory_service::adjust_stock(
        &ctx.state,
        &owner,
        mug.id,
        StockAdjustRequest {
            stock_type: StockType::Venta,
            delta: 0,
            reason: "noop".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(zero, AppError::Validation(_)));

    let history =
        inventory_service::list_movements(&ctx.state, shop.store.id, mug.id, Pagination::default())
            .await?;
    assert_eq!(history.meta.total, 1);
    assert_eq!(history.items[0].movement_type, MovementType::Adjustment);
    assert_eq!(history.items[0].quantity_change, 24);
    assert_eq!(history.items[0].reason, "delivery");

    let after = reload(&ctx.state, mug.id).await?;
    assert_eq!(after.stock_venta, 2);
    assert_eq!(after.stock_deposito, 24);
    Ok(())
}

#[tokio::test]
async fn oversized_amounts_are_rejected_before_anything_is_stored() -> anyhow::Result<()> {
    let Some(ctx) = setup().await? else {
        return Ok(());
    };
    let shop = create_shop(&ctx.state, dec!(16)).await?;
    let mug = create_product(&ctx.state, shop.store.id, "Mug", dec!(10.00), 5, 0).await?;
    let safe = create_product(&ctx.state, shop.store.id, "Safe", dec!(9999999999.99), 200, 0)
        .await?;

    let err = sale_engine::process_sale(
        &ctx.state,
        shop.store.id,
        shop.cashier,
        cash_sale(vec![line(mug.id, 3)], Some(dec!(1000000000000))),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = sale_engine::process_sale(
        &ctx.state,
        shop.store.id,
        shop.cashier,
        cash_sale(vec![line(safe.id, 100)], None),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(err.code(), "VALIDATION_ERROR");

    let stored = Sales::find()
        .filter(SaleCol::StoreId.eq(shop.store.id))
        .count(&ctx.state.orm)
        .await?;
    assert_eq!(stored, 0);
    assert_eq!(reload(&ctx.state, mug.id).await?.stock_venta, 5);
    assert_eq!(reload(&ctx.state, safe.id).await?.stock_venta, 200);
    Ok(())
}
