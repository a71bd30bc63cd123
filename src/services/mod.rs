pub mod auth_service;
pub mod receipt_service;
