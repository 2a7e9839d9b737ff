use std::sync::Arc;

use crate::{
    db::{DbPool, OrmConn},
    services::{payment_gateway::PaymentGateway, receipt_document::ReceiptRenderer},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub gateway: Arc<dyn PaymentGateway>,
    pub receipts: Arc<dyn ReceiptRenderer>,
    pub jwt_secret: Arc<str>,
}
