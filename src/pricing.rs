//! Cart pricing and tax.
//!
//! Everything here is pure: line items and a store tax rate in, rounded money
//! out. Persisted sales use [`compute`], which accumulates unrounded line
//! amounts and rounds each stored field once. The cart-validation response uses
//! [`compute_cart`], which rounds every line before aggregating so the client
//! sees line totals that add up exactly.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Largest amount a `NUMERIC(12,2)` money column holds.
pub const MAX_MONEY: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

/// Reject amounts the money columns cannot store.
pub fn ensure_money(field: &str, value: Decimal) -> AppResult<()> {
    if value.abs() > MAX_MONEY {
        return Err(AppError::Validation(format!(
            "{field} exceeds the maximum amount of {MAX_MONEY}"
        )));
    }
    Ok(())
}

/// Round to cents, half away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// A store tax rate expressed as a whole-number percent (16 means 16%).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxRate(Decimal);

impl TaxRate {
    pub fn percent(value: Decimal) -> AppResult<Self> {
        if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
            return Err(AppError::Validation(format!(
                "tax_rate must be a percent between 0 and 100, got {value}"
            )));
        }
        Ok(TaxRate(value))
    }

    pub fn zero() -> Self {
        TaxRate(Decimal::ZERO)
    }

    pub fn as_percent(self) -> Decimal {
        self.0
    }

    fn fraction(self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingLine {
    pub unit_price: Decimal,
    pub quantity: i32,
    pub discount: Decimal,
}

impl PricingLine {
    pub fn new(unit_price: Decimal, quantity: i32, discount: Decimal) -> Self {
        Self {
            unit_price,
            quantity,
            discount,
        }
    }

    fn gross(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.quantity <= 0 {
            return Err(AppError::Validation("quantity must be greater than 0".into()));
        }
        if self.unit_price <= Decimal::ZERO {
            return Err(AppError::Validation("unit_price must be greater than 0".into()));
        }
        if self.discount < Decimal::ZERO {
            return Err(AppError::Validation("item discount cannot be negative".into()));
        }
        ensure_money("unit_price", self.unit_price)?;
        ensure_money("line subtotal", self.gross())?;
        if self.discount > self.gross() {
            return Err(AppError::Validation(
                "item discount cannot exceed the line subtotal".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct LineAmounts {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

/// Rounded amounts for a single line, as stored on a sale item.
pub fn line_amounts(line: &PricingLine) -> LineAmounts {
    let subtotal = round_money(line.gross());
    let discount = round_money(line.discount);
    LineAmounts {
        subtotal,
        discount,
        total: subtotal - discount,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

/// Totals for a persisted sale: sum first, round each field once.
pub fn compute(
    lines: &[PricingLine],
    tax_rate: TaxRate,
    order_discount: Decimal,
) -> AppResult<Totals> {
    for line in lines {
        line.validate()?;
    }
    let subtotal: Decimal = lines.iter().map(|l| l.gross() - l.discount).sum();
    finish(subtotal, tax_rate, order_discount)
}

/// Totals for the cart-validation response: lines are rounded before aggregation.
pub fn compute_cart(lines: &[PricingLine], tax_rate: TaxRate) -> AppResult<Totals> {
    for line in lines {
        line.validate()?;
    }
    let subtotal: Decimal = lines.iter().map(|l| line_amounts(l).total).sum();
    finish(subtotal, tax_rate, Decimal::ZERO)
}

fn finish(subtotal: Decimal, tax_rate: TaxRate, order_discount: Decimal) -> AppResult<Totals> {
    if order_discount < Decimal::ZERO {
        return Err(AppError::Validation("discount cannot be negative".into()));
    }

    let tax = round_money(subtotal * tax_rate.fraction());
    let subtotal = round_money(subtotal);
    let discount = round_money(order_discount);
    let total = subtotal + tax - discount;

    ensure_money("subtotal", subtotal)?;
    ensure_money("tax", tax)?;
    ensure_money("discount", discount)?;
    ensure_money("total", total)?;
    if total < Decimal::ZERO {
        return Err(AppError::Validation(
            "discount cannot exceed subtotal plus tax".into(),
        ));
    }

    Ok(Totals {
        subtotal,
        tax,
        discount,
        total,
    })
}

/// Change owed for a cash payment, or `InsufficientPayment` when short.
pub fn change_due(total: Decimal, payment_received: Decimal) -> AppResult<Decimal> {
    let received = round_money(payment_received);
    ensure_money("payment_received", received)?;
    let change = received - total;
    if change < Decimal::ZERO {
        return Err(AppError::InsufficientPayment { total, received });
    }
    Ok(change)
}

/// Gateway amounts are integer minor units (cents).
pub fn to_minor_units(amount: Decimal) -> AppResult<i64> {
    let cents = round_money(amount) * Decimal::ONE_HUNDRED;
    i64::try_from(cents.trunc())
        .map_err(|_| AppError::Validation(format!("amount {amount} is out of range")))
}
