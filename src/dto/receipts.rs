use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{PaymentKind, Receipt};

#[derive(Debug, Deserialize, ToSchema)]
pub struct LineItemInput {
    pub name: String,
    pub price: Decimal,
    pub quantity: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentInput {
    pub kind: PaymentKind,
    pub amount: Decimal,
}

/// Create-receipt body: line items in the order they should appear on the
/// slip, plus the single payment.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReceiptRequest {
    pub products: Vec<LineItemInput>,
    pub payment: PaymentInput,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReceiptList {
    pub items: Vec<Receipt>,
}

/// Wire shape of the unauthenticated text lookup.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReceiptText {
    pub receipt_in_text_format: String,
}
