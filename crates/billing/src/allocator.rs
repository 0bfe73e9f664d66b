//! Overall payment allocation.
//!
//! Unlike the discount distributor this is sequential, not proportional: the
//! paid amount fills lines in position order and only spills into the next
//! line once the current one is fully paid.

use crate::coerce::to_int_with_max;
use crate::line_item::LineItem;

/// Fill `finals` in order with `requested`; excess beyond `Σfinals` is dropped.
pub fn fill_in_order(finals: &[i64], requested: i64) -> Vec<i64> {
    let mut left = requested.max(0);
    finals
        .iter()
        .map(|&f| {
            let pay_now = f.max(0).min(left);
            left -= pay_now;
            pay_now
        })
        .collect()
}

/// Reset every line's paid amount and allocate `requested` in position order.
pub fn allocate_paid(items: &[LineItem], requested: i64) -> Vec<LineItem> {
    let finals: Vec<i64> = items.iter().map(|i| i.amount() - i.discount()).collect();
    let paid = fill_in_order(&finals, requested);
    with_paid(items, &paid)
}

/// Coerce raw overall-paid text and allocate it.
pub fn allocate_overall_paid(items: &[LineItem], raw: &str, max_amount: i64) -> Vec<LineItem> {
    allocate_paid(items, to_int_with_max(raw, max_amount))
}

pub(crate) fn with_paid(items: &[LineItem], paid: &[i64]) -> Vec<LineItem> {
    items
        .iter()
        .zip(paid.iter().copied().chain(core::iter::repeat(0)))
        .map(|(item, p)| {
            let mut next = item.clone();
            // Re-derives final_amount from amount/discount before paying.
            next.set_discount(item.discount());
            next.set_paid(p);
            next
        })
        .collect()
}
