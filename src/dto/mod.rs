pub mod auth;
pub mod receipts;
