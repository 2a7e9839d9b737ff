use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    entity::sea_orm_active_enums::{PaymentStatus, StockType},
    response::{ApiResponse, ErrorBody},
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Product {0} not found")]
    ProductNotFound(Uuid),

    #[error("Product {0} is not active")]
    ProductInactive(String),

    #[error("Insufficient stock for {product_name}. Available: {available}, Requested: {requested}")]
    InsufficientStock {
        product_id: Uuid,
        product_name: String,
        stock_type: StockType,
        available: i32,
        requested: i32,
    },

    #[error("Insufficient payment. Total: {total}, Received: {received}")]
    InsufficientPayment { total: Decimal, received: Decimal },

    #[error("Invalid payment method: {0}")]
    InvalidPaymentMethod(String),

    #[error("Payment not successful. Status: {0}")]
    PaymentNotSucceeded(String),

    #[error("Sale not found")]
    SaleNotFound,

    #[error("Store not found")]
    StoreNotFound,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Cannot move sale from {from} to {to}")]
    InvalidStateTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },

    /// A debit would have driven a pool below zero after the availability check passed.
    #[error("Stock for product {product_id} would go negative ({before} - {requested})")]
    NegativeStock {
        product_id: Uuid,
        before: i32,
        requested: i32,
    },

    #[error("Payment gateway error: {0}")]
    Gateway(String),

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::ProductInactive(_)
            | AppError::InsufficientPayment { .. }
            | AppError::InvalidPaymentMethod(_) => StatusCode::BAD_REQUEST,
            AppError::ProductNotFound(_)
            | AppError::SaleNotFound
            | AppError::StoreNotFound => StatusCode::NOT_FOUND,
            AppError::InsufficientStock { .. }
            | AppError::InvalidStateTransition { .. }
            | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PaymentNotSucceeded(_) => StatusCode::PAYMENT_REQUIRED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Gateway(_) => StatusCode::BAD_GATEWAY,
            AppError::NegativeStock { .. }
            | AppError::DbError(_)
            | AppError::OrmError(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            AppError::ProductInactive(_) => "PRODUCT_INACTIVE",
            AppError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            AppError::InsufficientPayment { .. } => "INSUFFICIENT_PAYMENT",
            AppError::InvalidPaymentMethod(_) => "INVALID_PAYMENT_METHOD",
            AppError::PaymentNotSucceeded(_) => "PAYMENT_NOT_SUCCEEDED",
            AppError::SaleNotFound => "SALE_NOT_FOUND",
            AppError::StoreNotFound => "STORE_NOT_FOUND",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Conflict(_) => "CONFLICT",
            AppError::InvalidStateTransition { to, .. } => match to {
                PaymentStatus::Refunded => "REFUND_FAILED",
                _ => "INVALID_STATE_TRANSITION",
            },
            AppError::Gateway(_) => "PAYMENT_GATEWAY_ERROR",
            AppError::NegativeStock { .. }
            | AppError::DbError(_)
            | AppError::OrmError(_)
            | AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::InsufficientStock {
                product_id,
                product_name,
                stock_type,
                available,
                requested,
            } => Some(json!({
                "product_id": product_id,
                "product_name": product_name,
                "stock_type": stock_type,
                "available_quantity": available,
                "requested_quantity": requested,
            })),
            AppError::InsufficientPayment { total, received } => Some(json!({
                "total": total,
                "payment_received": received,
            })),
            AppError::InvalidStateTransition { from, to } => Some(json!({
                "from": from,
                "to": to,
            })),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }

        let body = ApiResponse::failure(ErrorBody {
            code: self.code().to_string(),
            message: self.to_string(),
            details: self.details(),
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
