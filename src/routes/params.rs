use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    entity::sea_orm_active_enums::{PaymentMethod, PaymentStatus},
    error::{AppError, AppResult},
};

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> AppResult<(i64, i64, i64)> {
        normalize(self.page, self.per_page)
    }
}

/// Returns `(page, per_page, offset)`.
fn normalize(page: Option<i64>, per_page: Option<i64>) -> AppResult<(i64, i64, i64)> {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1)
        .checked_mul(per_page)
        .ok_or_else(|| AppError::Validation(format!("page {page} is out of range")))?;
    Ok((page, per_page, offset))
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Filters for `GET /stores/{store_id}/sales`. Dates are inclusive UTC days.
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SaleListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub user_id: Option<Uuid>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: Option<PaymentStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub sort_order: Option<SortOrder>,
}

impl SaleListQuery {
    pub fn pagination(&self) -> AppResult<(i64, i64, i64)> {
        normalize(self.page, self.per_page)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DailySummaryQuery {
    /// Defaults to today (UTC).
    pub date: Option<NaiveDate>,
}
