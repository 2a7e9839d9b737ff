use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::auth::ensure_owner,
    models::{SaleWithItems, StoreAccess},
    services::sale_engine,
    state::AppState,
};

/// Only store owners may refund; everything else is the engine's `refund_sale`.
pub async fn refund(state: &AppState, access: &StoreAccess, sale_id: Uuid) -> AppResult<SaleWithItems> {
    ensure_owner(access, "refund sales")?;
    sale_engine::refund_sale(state, access.store.id, sale_id, access.user_id).await
}
