pub mod payments;
pub mod products;
pub mod receipt_items;
pub mod receipts;
pub mod users;

pub use payments::Entity as Payments;
pub use products::Entity as Products;
pub use receipt_items::Entity as ReceiptItems;
pub use receipts::Entity as Receipts;
pub use users::Entity as Users;
