//! Overall discount distribution (largest-remainder apportionment).
//!
//! An overall discount `D` over lines with amounts `a_1..a_N` (total `T`) gives
//! every line the floor of its exact share `a_i * D / T`, then hands the
//! leftover units to the largest fractional remainders (ties: lowest position
//! first). Shares are compared as integer remainders `(a_i * D) mod T` over
//! the common denominator, so no floating point is involved.

use crate::coerce::to_int_with_max;
use crate::line_item::LineItem;

/// Split `requested` across `amounts` so that the shares sum to
/// `min(requested, Σamounts)` and no share exceeds its amount.
///
/// Returns all zeros when the total or the request is zero.
pub fn apportion(amounts: &[i64], requested: i64) -> Vec<i64> {
    let capacities: Vec<i64> = amounts.iter().map(|a| (*a).max(0)).collect();
    let total: i128 = capacities.iter().map(|a| i128::from(*a)).sum();
    let requested = i128::from(requested.max(0));

    if total == 0 || requested == 0 {
        return vec![0; capacities.len()];
    }

    let target = requested.min(total);

    let mut shares: Vec<i128> = Vec::with_capacity(capacities.len());
    let mut remainders: Vec<i128> = Vec::with_capacity(capacities.len());
    for &a in &capacities {
        let exact = i128::from(a) * target;
        shares.push(exact / total);
        remainders.push(exact % total);
    }

    let assigned: i128 = shares.iter().sum();
    let mut leftover = target - assigned;

    let mut ranked: Vec<usize> = (0..capacities.len()).collect();
    ranked.sort_by(|&i, &j| remainders[j].cmp(&remainders[i]).then(i.cmp(&j)));

    for &i in &ranked {
        if leftover == 0 {
            break;
        }
        if shares[i] < i128::from(capacities[i]) {
            shares[i] += 1;
            leftover -= 1;
        }
    }

    // Only reachable when the ranked pass ran out of rows with spare room.
    if leftover > 0 {
        tracing::debug!(
            leftover = leftover as i64,
            "discount leftover swept in position order"
        );
        for (share, &cap) in shares.iter_mut().zip(&capacities) {
            if leftover == 0 {
                break;
            }
            let take = (i128::from(cap) - *share).min(leftover);
            *share += take;
            leftover -= take;
        }
    }

    shares
        .into_iter()
        .zip(&capacities)
        .map(|(share, &cap)| i64::try_from(share).map_or(cap, |s| s.min(cap)))
        .collect()
}

/// Redistribute an already-coerced overall discount across every line.
///
/// Each line's final amount is re-derived and its paid amount re-capped.
pub fn distribute_discount(items: &[LineItem], requested: i64) -> Vec<LineItem> {
    let amounts: Vec<i64> = items.iter().map(LineItem::amount).collect();
    let discounts = apportion(&amounts, requested);
    with_discounts(items, &discounts)
}

/// Coerce raw overall-discount text and redistribute it.
pub fn distribute_overall_discount(items: &[LineItem], raw: &str, max_amount: i64) -> Vec<LineItem> {
    distribute_discount(items, to_int_with_max(raw, max_amount))
}

/// Apply per-line discounts (as produced by [`apportion`]) to `items`.
pub(crate) fn with_discounts(items: &[LineItem], discounts: &[i64]) -> Vec<LineItem> {
    items
        .iter()
        .zip(discounts.iter().copied().chain(core::iter::repeat(0)))
        .map(|(item, discount)| {
            let mut next = item.clone();
            next.set_discount(discount);
            next
        })
        .collect()
}
