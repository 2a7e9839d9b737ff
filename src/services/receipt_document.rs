use std::fmt::Write;

use crate::{
    entity::sea_orm_active_enums::{PaymentMethod, StockType},
    error::{AppError, AppResult},
    models::{SaleWithItems, Store},
};

/// Turns a persisted sale into a downloadable document.
pub trait ReceiptRenderer: Send + Sync {
    fn content_type(&self) -> &'static str;

    fn file_name(&self, receipt_number: &str) -> String;

    fn render(&self, store: &Store, sale: &SaleWithItems) -> AppResult<Vec<u8>>;
}

const WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextReceipt;

impl ReceiptRenderer for PlainTextReceipt {
    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn file_name(&self, receipt_number: &str) -> String {
        format!("receipt-{receipt_number}.txt")
    }

    fn render(&self, store: &Store, sale: &SaleWithItems) -> AppResult<Vec<u8>> {
        let mut out = String::new();
        write_receipt(&mut out, store, sale)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("receipt rendering failed: {e}")))?;
        Ok(out.into_bytes())
    }
}

fn write_receipt(out: &mut String, store: &Store, sale: &SaleWithItems) -> std::fmt::Result {
    let rule = "-".repeat(WIDTH);
    let header = &sale.sale;

    writeln!(out, "{:^width$}", store.name, width = WIDTH)?;
    writeln!(out, "{rule}")?;
    writeln!(out, "Receipt: {}", header.receipt_number)?;
    writeln!(out, "Date:    {}", header.created_at.format("%Y-%m-%d %H:%M UTC"))?;
    writeln!(out, "Status:  {}", header.payment_status)?;
    writeln!(out, "{rule}")?;

    for item in &sale.items {
        let pool = match item.stock_type {
            StockType::Venta => "",
            StockType::Deposito => " [deposito]",
        };
        writeln!(out, "{}{pool}", item.product_name)?;
        line(out, &format!("  {} x {}", item.quantity, item.unit_price), &item.subtotal.to_string())?;
        if !item.discount.is_zero() {
            line(out, "  discount", &format!("-{}", item.discount))?;
        }
    }

    writeln!(out, "{rule}")?;
    line(out, "Subtotal", &header.subtotal.to_string())?;
    line(out, &format!("Tax ({}%)", header.tax_rate.normalize()), &header.tax.to_string())?;
    if !header.discount.is_zero() {
        line(out, "Discount", &format!("-{}", header.discount))?;
    }
    line(out, "TOTAL", &header.total.to_string())?;
    writeln!(out, "{rule}")?;

    match header.payment_method {
        PaymentMethod::Cash => {
            line(out, "Paid (cash)", &opt(header.payment_received))?;
            line(out, "Change", &opt(header.change_returned))?;
        }
        PaymentMethod::Card => line(out, "Paid (card)", &header.total.to_string())?,
    }
    if let Some(notes) = header.notes.as_deref() {
        writeln!(out, "Notes: {notes}")?;
    }
    writeln!(out)?;
    writeln!(out, "{:^width$}", "Thank you!", width = WIDTH)?;
    Ok(())
}

fn line(out: &mut String, label: &str, amount: &str) -> std::fmt::Result {
    let pad = WIDTH.saturating_sub(label.chars().count());
    writeln!(out, "{label}{amount:>pad$}")
}

fn opt(value: Option<rust_decimal::Decimal>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}
