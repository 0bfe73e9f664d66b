use serde::{Deserialize, Serialize};

use hospix_core::ValueObject;

use crate::line_item::LineItem;

/// Invoice-level figures derived from the current lines. Never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    pub total_amount: i64,
    pub total_discount: i64,
    pub total_final_amount: i64,
    pub total_paid: i64,
    pub overall_remaining: i64,
}

impl ValueObject for InvoiceTotals {}

impl InvoiceTotals {
    pub fn from_items(items: &[LineItem]) -> Self {
        let mut totals = items.iter().fold(Self::default(), |mut acc, item| {
            acc.total_amount = acc.total_amount.saturating_add(item.amount());
            acc.total_discount = acc.total_discount.saturating_add(item.discount());
            acc.total_final_amount = acc.total_final_amount.saturating_add(item.final_amount());
            acc.total_paid = acc.total_paid.saturating_add(item.paid());
            acc
        });
        totals.overall_remaining = totals.total_final_amount.saturating_sub(totals.total_paid).max(0);
        totals
    }
}
