//! Black-box order-entry flows through the public session API.

use chrono::NaiveDate;
use hospix_billing::{
    BillingConfig, BillingError, CatalogTest, EditWarning, ExistingLine, LineItem, OrderEntry,
    RowField,
};
use hospix_core::TestId;

fn init_tracing() {
    hospix_observability::init();
}

fn catalog(name: &str, price: i64) -> CatalogTest {
    CatalogTest {
        id: TestId::new(),
        name: name.to_string(),
        price,
    }
}

fn entry_with(amounts: &[i64]) -> OrderEntry {
    init_tracing();
    let mut entry = OrderEntry::new(BillingConfig::default());
    for (i, &price) in amounts.iter().enumerate() {
        entry.add_test(catalog(&format!("Test {i}"), price)).unwrap();
    }
    entry
}

fn column(entry: &OrderEntry, f: fn(&LineItem) -> i64) -> Vec<i64> {
    entry.items().iter().map(f).collect()
}

#[test]
fn proportional_overall_discount() {
    let mut entry = entry_with(&[1000, 2000, 3000]);
    entry.type_overall_discount("300");
    entry.commit_overall_discount().unwrap();
    assert_eq!(column(&entry, LineItem::discount), vec![50, 100, 150]);
}

#[test]
fn tied_leftover_goes_to_first_line() {
    let mut entry = entry_with(&[100, 100, 100]);
    entry.type_overall_discount("100");
    entry.commit_overall_discount().unwrap();
    assert_eq!(column(&entry, LineItem::discount), vec![34, 33, 33]);
    assert_eq!(entry.totals().total_discount, 100);
}

#[test]
fn zero_overall_discount_clears_row_discount() {
    let mut entry = entry_with(&[500]);
    entry.edit_row(0, RowField::Discount, "200").unwrap();
    assert_eq!(entry.items()[0].discount(), 200);

    entry.type_overall_discount("0");
    entry.commit_overall_discount().unwrap();
    assert_eq!(entry.items()[0].discount(), 0);
    assert_eq!(entry.items()[0].final_amount(), 500);
}

#[test]
fn sequential_overall_payment() {
    let mut entry = entry_with(&[300, 150]);
    entry.type_overall_paid("250");
    entry.commit_overall_paid().unwrap();
    assert_eq!(column(&entry, LineItem::paid), vec![250, 0]);
    assert_eq!(column(&entry, LineItem::remaining), vec![50, 150]);
    assert_eq!(entry.totals().overall_remaining, 200);
}

#[test]
fn removing_a_line_renumbers_positions() {
    let mut entry = entry_with(&[100, 200, 300]);
    entry.remove_line(0).unwrap();
    let positions: Vec<u32> = entry.items().iter().map(LineItem::position).collect();
    assert_eq!(positions, vec![1, 2]);
    assert_eq!(entry.totals().total_amount, 500);
}

#[test]
fn report_date_must_not_precede_sample_date() {
    let mut entry = entry_with(&[100]);
    let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
    entry
        .edit_row_on(0, RowField::SampleDate, "2026-10-18", today)
        .unwrap();

    let err = entry
        .edit_row_on(0, RowField::ReportDate, "2026-10-17", today)
        .unwrap_err();
    assert!(matches!(
        err,
        BillingError::EditRejected(EditWarning::ReportDateBeforeSample { .. })
    ));
    assert_eq!(entry.items()[0].report_date(), None);

    entry
        .edit_row_on(0, RowField::ReportDate, "2026-10-20", today)
        .unwrap();
    assert_eq!(
        entry.items()[0].report_date(),
        NaiveDate::from_ymd_opt(2026, 10, 20)
    );
}

#[test]
fn edit_mode_round_trip_to_submission() {
    init_tracing();
    let mut entry = OrderEntry::new(BillingConfig::default());
    let stored: Vec<ExistingLine> = serde_json::from_value(serde_json::json!([
        {
            "test": TestId::new(),
            "testName": "Serum creatinine",
            "testPrice": 400,
            "discountAmount": 40,
            "advanceAmount": 200,
            "remainingAmount": 160,
            "sampleDate": "2026-10-16",
            "reportDate": null,
            "notes": ""
        },
        {
            "test": TestId::new(),
            "testPrice": 600
        }
    ]))
    .unwrap();
    entry.load_existing(stored).unwrap();

    entry.type_overall_paid("1000");
    entry.commit_overall_paid().unwrap();
    assert_eq!(column(&entry, LineItem::paid), vec![360, 600]);

    let submission = entry.submission().unwrap();
    assert_eq!(submission.total_amount, 1000);
    assert_eq!(submission.advance_amount, 960);
    assert_eq!(submission.remaining_amount, 0);

    let json = serde_json::to_value(&submission).unwrap();
    assert_eq!(json["lines"][0]["discountAmount"], 40);
    assert_eq!(json["lines"][0]["sampleDate"], "2026-10-16");
    assert_eq!(json["lines"][1]["remainingAmount"], 0);

    entry.complete_submission().unwrap();
    assert_eq!(entry.submission(), Err(BillingError::EmptyOrder));
}

#[test]
fn overall_edits_interleave_with_row_edits() {
    let mut entry = entry_with(&[1000, 2000, 3000]);
    entry.type_overall_paid("6000");
    entry.commit_overall_paid().unwrap();
    assert_eq!(entry.totals().overall_remaining, 0);

    // Discount after payment shrinks finals; paid is re-capped per row.
    entry.type_overall_discount("600");
    entry.commit_overall_discount().unwrap();
    assert_eq!(column(&entry, LineItem::paid), vec![900, 1800, 2700]);
    assert_eq!(entry.totals().total_paid, 5400);

    entry.edit_row(1, RowField::Amount, "1000").unwrap();
    let row = &entry.items()[1];
    assert_eq!(row.discount(), 200);
    assert_eq!(row.final_amount(), 800);
    assert_eq!(row.paid(), 800);

    for row in entry.items() {
        assert!(row.is_consistent(entry.config().max_amount));
    }
}
