pub mod cart_service;
pub mod inventory_service;
pub mod payment_gateway;
pub mod payment_service;
pub mod receipt_document;
pub mod receipt_number;
pub mod refund_service;
pub mod sale_engine;
pub mod sale_service;
pub mod stock_ledger;
pub mod store_service;
