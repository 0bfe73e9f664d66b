use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use hospix_core::DomainError;

/// Why a row edit was rejected. The row is left untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EditWarning {
    #[error("sample date {date} is earlier than today ({today})")]
    SampleDateInPast { date: NaiveDate, today: NaiveDate },

    #[error("report date {date} is earlier than {earliest}")]
    ReportDateBeforeSample { date: NaiveDate, earliest: NaiveDate },

    #[error("'{raw}' is not a date (expected YYYY-MM-DD)")]
    InvalidDate { raw: String },

    #[error("no line at index {index} (order has {len})")]
    RowOutOfRange { index: usize, len: usize },

    #[error("unknown line field '{name}'")]
    UnknownField { name: String },
}

/// Errors surfaced by lab order command handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BillingError {
    /// A row edit was rejected; prior state is retained.
    #[error("edit rejected: {0}")]
    EditRejected(#[from] EditWarning),

    /// Submission attempted with no tests on the order.
    #[error("cannot submit an order without tests")]
    EmptyOrder,

    #[error("no line at index {index}")]
    LineNotFound { index: usize },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

pub type BillingResult<T> = Result<T, BillingError>;
