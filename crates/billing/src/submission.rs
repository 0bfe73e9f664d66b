//! Finalized payload handed to the persistence collaborator.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use hospix_core::TestId;

use crate::error::{BillingError, BillingResult};
use crate::line_item::LineItem;
use crate::totals::InvoiceTotals;

/// One persisted line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionLine {
    pub test: TestId,
    pub test_price: i64,
    pub discount_amount: i64,
    pub advance_amount: i64,
    pub remaining_amount: i64,
    pub sample_date: Option<NaiveDate>,
    pub report_date: Option<NaiveDate>,
    pub notes: String,
}

impl From<&LineItem> for SubmissionLine {
    fn from(item: &LineItem) -> Self {
        Self {
            test: item.test_id(),
            test_price: item.amount(),
            discount_amount: item.discount(),
            advance_amount: item.paid(),
            remaining_amount: item.remaining(),
            sample_date: item.sample_date(),
            report_date: item.report_date(),
            notes: item.notes().to_string(),
        }
    }
}

/// Full submission: lines plus invoice-level totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub lines: Vec<SubmissionLine>,
    pub total_amount: i64,
    pub advance_amount: i64,
    pub remaining_amount: i64,
    /// Store version the payload was built from.
    pub version: u64,
}

/// Build the submission payload. An empty order blocks submission.
pub fn build_submission(items: &[LineItem], version: u64) -> BillingResult<Submission> {
    if items.is_empty() {
        return Err(BillingError::EmptyOrder);
    }
    let totals = InvoiceTotals::from_items(items);
    Ok(Submission {
        lines: items.iter().map(SubmissionLine::from).collect(),
        total_amount: totals.total_amount,
        advance_amount: totals.total_paid,
        remaining_amount: totals.overall_remaining,
        version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::allocate_paid;
    use crate::distributor::distribute_discount;
    use crate::line_item::test_support::lines;

    #[test]
    fn empty_order_is_rejected() {
        assert_eq!(build_submission(&[], 0), Err(BillingError::EmptyOrder));
    }

    #[test]
    fn payload_mirrors_lines_and_totals() {
        let items = distribute_discount(&lines(&[300, 200]), 50);
        let items = allocate_paid(&items, 300);
        let submission = build_submission(&items, 7).unwrap();

        assert_eq!(submission.lines.len(), 2);
        assert_eq!(submission.lines[0].test, items[0].test_id());
        assert_eq!(submission.lines[0].test_price, 300);
        assert_eq!(submission.lines[0].discount_amount, 30);
        assert_eq!(submission.lines[0].advance_amount, 270);
        assert_eq!(submission.lines[0].remaining_amount, 0);
        assert_eq!(submission.lines[1].advance_amount, 30);
        assert_eq!(submission.lines[1].remaining_amount, 150);
        assert_eq!(submission.total_amount, 500);
        assert_eq!(submission.advance_amount, 300);
        assert_eq!(submission.remaining_amount, 150);
        assert_eq!(submission.version, 7);
    }

    #[test]
    fn wire_names_match_persistence_contract() {
        let submission = build_submission(&lines(&[120]), 1).unwrap();
        let json = serde_json::to_value(&submission).unwrap();
        let line = &json["lines"][0];
        for key in [
            "test",
            "testPrice",
            "discountAmount",
            "advanceAmount",
            "remainingAmount",
            "sampleDate",
            "reportDate",
            "notes",
        ] {
            assert!(line.get(key).is_some(), "missing line key {key}");
        }
        assert_eq!(json["totalAmount"], 120);
        assert_eq!(json["advanceAmount"], 0);
        assert_eq!(json["remainingAmount"], 120);
    }
}
