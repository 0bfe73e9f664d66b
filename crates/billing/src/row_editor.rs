//! Single-field edits of one line, re-deriving the dependent money fields.

use core::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::coerce::{MAX_AMOUNT, to_int_with_max};
use crate::error::EditWarning;
use crate::line_item::LineItem;

/// Editable field of a line, named as the order form names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RowField {
    Amount,
    Discount,
    Paid,
    SampleDate,
    ReportDate,
    TestName,
    Notes,
}

impl RowField {
    pub fn as_str(self) -> &'static str {
        match self {
            RowField::Amount => "amount",
            RowField::Discount => "discount",
            RowField::Paid => "paid",
            RowField::SampleDate => "sampleDate",
            RowField::ReportDate => "reportDate",
            RowField::TestName => "testName",
            RowField::Notes => "notes",
        }
    }
}

impl core::fmt::Display for RowField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RowField {
    type Err = EditWarning;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "amount" => Ok(RowField::Amount),
            "discount" => Ok(RowField::Discount),
            "paid" => Ok(RowField::Paid),
            "sampleDate" => Ok(RowField::SampleDate),
            "reportDate" => Ok(RowField::ReportDate),
            "testName" => Ok(RowField::TestName),
            "notes" => Ok(RowField::Notes),
            other => Err(EditWarning::UnknownField {
                name: other.to_string(),
            }),
        }
    }
}

/// Inputs an edit depends on besides the row itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditContext {
    /// Lower bound for sample dates.
    pub today: NaiveDate,
    pub max_amount: i64,
}

impl EditContext {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            max_amount: MAX_AMOUNT,
        }
    }
}

/// Outcome of [`edit_row`]: the (possibly unchanged) list plus any warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowEdit {
    pub items: Vec<LineItem>,
    pub warning: Option<EditWarning>,
}

impl RowEdit {
    pub fn is_rejected(&self) -> bool {
        self.warning.is_some()
    }
}

/// Apply one field edit to the line at `index`, returning a new list.
///
/// Only that line changes. Rejected edits return the list unchanged with a
/// warning; this never panics.
pub fn edit_row(
    items: &[LineItem],
    index: usize,
    field: RowField,
    raw: &str,
    ctx: EditContext,
) -> RowEdit {
    let Some(current) = items.get(index) else {
        return RowEdit {
            items: items.to_vec(),
            warning: Some(EditWarning::RowOutOfRange {
                index,
                len: items.len(),
            }),
        };
    };

    match edit_line(current, field, raw, ctx) {
        Ok(updated) => {
            let mut next = items.to_vec();
            next[index] = updated;
            RowEdit {
                items: next,
                warning: None,
            }
        }
        Err(warning) => RowEdit {
            items: items.to_vec(),
            warning: Some(warning),
        },
    }
}

/// Apply one field edit to a single line.
pub fn edit_line(
    item: &LineItem,
    field: RowField,
    raw: &str,
    ctx: EditContext,
) -> Result<LineItem, EditWarning> {
    let mut next = item.clone();
    match field {
        RowField::Amount => next.set_amount(to_int_with_max(raw, ctx.max_amount)),
        RowField::Discount => next.set_discount(to_int_with_max(raw, ctx.max_amount)),
        RowField::Paid => next.set_paid(to_int_with_max(raw, ctx.max_amount)),
        RowField::SampleDate => {
            let date = parse_date(raw)?;
            if let Some(date) = date.filter(|d| *d < ctx.today) {
                return Err(EditWarning::SampleDateInPast {
                    date,
                    today: ctx.today,
                });
            }
            next.set_sample_date(date);
        }
        RowField::ReportDate => {
            let date = parse_date(raw)?;
            let earliest = item.sample_date().unwrap_or(ctx.today);
            if let Some(date) = date.filter(|d| *d < earliest) {
                return Err(EditWarning::ReportDateBeforeSample { date, earliest });
            }
            next.set_report_date(date);
        }
        RowField::TestName => next.set_test_name(raw.to_string()),
        RowField::Notes => next.set_notes(raw.to_string()),
    }
    Ok(next)
}

/// Blank clears the date; anything else must be `YYYY-MM-DD`.
fn parse_date(raw: &str) -> Result<Option<NaiveDate>, EditWarning> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| EditWarning::InvalidDate {
            raw: raw.to_string(),
        })
}
