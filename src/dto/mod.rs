pub mod cart;
pub mod inventory;
pub mod payments;
pub mod sales;
