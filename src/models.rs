use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

/// Public user view; the password hash never leaves the database layer.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub fullname: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentKind {
    Cash,
    Cashless,
}

impl PaymentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentKind::Cash => "cash",
            PaymentKind::Cashless => "cashless",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(PaymentKind::Cash),
            "cashless" => Some(PaymentKind::Cashless),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Payment {
    pub id: Uuid,
    pub kind: PaymentKind,
    pub amount: Decimal,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
}

/// One receipt line: a product reference plus quantity, unit price and the
/// derived `total = quantity * price`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LineItem {
    pub id: Uuid,
    pub product: Product,
    pub quantity: Decimal,
    pub price: Decimal,
    pub total: Decimal,
}

/// Immutable purchase record. `items` keeps submission order, which is also
/// the order the text slip prints them in.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Receipt {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub payment: Payment,
    pub total: Decimal,
    pub rest: Decimal,
    pub items: Vec<LineItem>,
}
