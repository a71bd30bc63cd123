//! Fixed-width text rendering of a receipt.
//!
//! The 32-column layout is a compatibility contract for consumers printing to
//! fixed-width output such as thermal printers; column widths and line order
//! must not change.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::models::PaymentKind;

const WIDTH: usize = 32;
const THANK_YOU: &str = "Thank you for your purchase!";

#[derive(Debug)]
pub struct SlipLine {
    pub product: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub total: Decimal,
}

#[derive(Debug)]
pub struct Slip {
    pub fullname: String,
    pub lines: Vec<SlipLine>,
    pub total: Decimal,
    pub payment_kind: PaymentKind,
    pub paid: Decimal,
    pub rest: Decimal,
    pub date: DateTime<Utc>,
}

impl Slip {
    pub fn render(&self) -> String {
        let separator = "=".repeat(WIDTH);
        let mut out = String::new();
        out.push_str(&format!("{:^32}\n", self.fullname));
        out.push_str(&separator);
        out.push('\n');
        for line in &self.lines {
            out.push_str(&format!(
                "{:<32}\n",
                format!("{}x{}", line.price, line.quantity)
            ));
            out.push_str(&format!(
                "{:<16}{:>16}\n",
                line.product,
                line.total.to_string()
            ));
            out.push_str(&separator);
            out.push('\n');
        }
        out.push_str(&format!("{:<16} {:<16}\n", "Sum", self.total.to_string()));
        out.push_str(&format!(
            "{:<16} {:<16}\n",
            self.payment_kind.as_str(),
            self.paid.to_string()
        ));
        out.push_str(&format!("{:<16} {:<16}\n", "Rest", self.rest.to_string()));
        out.push_str(&separator);
        out.push('\n');
        out.push_str(&format!(
            "{:^32}\n",
            self.date.format("%m/%d/%Y %H-%M-%S").to_string()
        ));
        out.push_str(&format!("{:^32}\n", THANK_YOU));
        out
    }
}
