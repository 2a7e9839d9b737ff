use sea_orm::{ConnectionTrait, EntityTrait};
use uuid::Uuid;

use crate::{
    entity::{Stores, StoreUsers, stores::Model as StoreModel},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::StoreAccess,
    pricing::TaxRate,
    state::AppState,
};

/// Resolve the store and the caller's membership role in it.
pub async fn store_access(state: &AppState, user: &AuthUser, store_id: Uuid) -> AppResult<StoreAccess> {
    let store = find_store(&state.orm, store_id).await?;

    let membership = StoreUsers::find_by_id((store_id, user.user_id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Forbidden("no access to this store".into()))?;

    Ok(StoreAccess {
        store: store.into(),
        user_id: user.user_id,
        role: membership.role,
    })
}

pub async fn find_store<C: ConnectionTrait>(conn: &C, store_id: Uuid) -> AppResult<StoreModel> {
    let store = Stores::find_by_id(store_id)
        .one(conn)
        .await?
        .ok_or(AppError::StoreNotFound)?;
    if !store.is_active {
        return Err(AppError::StoreNotFound);
    }
    Ok(store)
}

/// Read the store's current tax rate, rejecting values outside the percent convention.
pub fn tax_rate(store: &StoreModel) -> AppResult<TaxRate> {
    TaxRate::percent(store.tax_rate)
}
