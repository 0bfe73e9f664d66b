//! Lab-order billing engine.
//!
//! Keeps integer-only amount/discount/paid/remaining figures consistent across
//! the line items of a lab order, under per-line edits and overall edits that
//! are redistributed across all lines. Pure domain logic: no IO, no HTTP, no
//! storage.

pub mod allocator;
pub mod coerce;
pub mod config;
pub mod distributor;
pub mod draft;
pub mod error;
pub mod line_item;
pub mod order;
pub mod row_editor;
pub mod session;
pub mod submission;
pub mod totals;

pub use allocator::{allocate_overall_paid, allocate_paid, fill_in_order};
pub use coerce::{MAX_AMOUNT, clamp_amount, to_int, to_int_with_max};
pub use config::BillingConfig;
pub use distributor::{apportion, distribute_discount, distribute_overall_discount};
pub use draft::DraftValue;
pub use error::{BillingError, BillingResult, EditWarning};
pub use line_item::{CatalogTest, ExistingLine, LineItem, LineItemStore};
pub use order::{
    AddTest, ApplyOverallDiscount, ApplyOverallPaid, DiscountDistributed, EditRow, LabOrder,
    LabOrderCommand, LabOrderEvent, LineEdited, LineRemoved, LinesLoaded, LoadExisting,
    OrderReset, PaymentAllocated, RemoveLine, ResetOrder, TestAdded,
};
pub use row_editor::{EditContext, RowEdit, RowField, edit_line, edit_row};
pub use session::OrderEntry;
pub use submission::{Submission, SubmissionLine, build_submission};
pub use totals::InvoiceTotals;
