use axum::Router;

use crate::state::AppState;

pub mod doc;
pub mod extract;
pub mod health;
pub mod inventory;
pub mod params;
pub mod payments;
pub mod sales;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/stores/{store_id}/sales", sales::router())
        .nest("/stores/{store_id}/payments", payments::router())
        .nest("/stores/{store_id}/products", inventory::router())
}
