pub mod audit_logs;
pub mod products;
pub mod sale_items;
pub mod sales;
pub mod sea_orm_active_enums;
pub mod stock_movements;
pub mod store_users;
pub mod stores;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use products::Entity as Products;
pub use sale_items::Entity as SaleItems;
pub use sales::Entity as Sales;
pub use stock_movements::Entity as StockMovements;
pub use store_users::Entity as StoreUsers;
pub use stores::Entity as Stores;
pub use users::Entity as Users;
