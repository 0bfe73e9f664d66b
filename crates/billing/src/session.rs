//! Order-entry editing session.
//!
//! `OrderEntry` is the single owner of a [`LabOrder`]. It turns UI actions
//! into commands, runs them through `handle`/`apply`, and keeps the two
//! overall boxes (discount, paid) in draft/commit form.

use chrono::{DateTime, Local, NaiveDate, Utc};

use hospix_core::{Aggregate, AggregateRoot, OrderId};
use hospix_events::Event;

use crate::config::BillingConfig;
use crate::draft::DraftValue;
use crate::error::BillingResult;
use crate::line_item::{CatalogTest, ExistingLine, LineItem};
use crate::order::{
    AddTest, ApplyOverallDiscount, ApplyOverallPaid, EditRow, LabOrder, LabOrderCommand,
    LabOrderEvent, LoadExisting, RemoveLine, ResetOrder,
};
use crate::row_editor::RowField;
use crate::submission::Submission;
use crate::totals::InvoiceTotals;

#[derive(Debug, Clone)]
pub struct OrderEntry {
    order: LabOrder,
    config: BillingConfig,
    overall_discount: DraftValue,
    overall_paid: DraftValue,
}

impl OrderEntry {
    pub fn new(config: BillingConfig) -> Self {
        Self::with_id(OrderId::new(), config)
    }

    pub fn with_id(id: OrderId, config: BillingConfig) -> Self {
        Self {
            order: LabOrder::empty(id, config.effective_max_amount()),
            config,
            overall_discount: DraftValue::default(),
            overall_paid: DraftValue::default(),
        }
    }

    pub fn id(&self) -> OrderId {
        self.order.id_typed()
    }

    pub fn order(&self) -> &LabOrder {
        &self.order
    }

    pub fn config(&self) -> &BillingConfig {
        &self.config
    }

    pub fn items(&self) -> &[LineItem] {
        self.order.items()
    }

    pub fn totals(&self) -> InvoiceTotals {
        self.order.totals()
    }

    /// Number of events applied so far.
    pub fn version(&self) -> u64 {
        self.order.version()
    }

    pub fn overall_discount(&self) -> &DraftValue {
        &self.overall_discount
    }

    pub fn overall_paid(&self) -> &DraftValue {
        &self.overall_paid
    }

    /// Run one command through the aggregate and refresh the overall boxes.
    ///
    /// A rejected command leaves the order untouched.
    pub fn execute(&mut self, command: LabOrderCommand) -> BillingResult<Vec<LabOrderEvent>> {
        let events = match self.order.handle(&command) {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!(order_id = %self.id(), error = %e, "lab order command rejected");
                return Err(e);
            }
        };

        for event in &events {
            self.order.apply(event);
            tracing::info!(
                order_id = %self.id(),
                event_type = event.event_type(),
                version = self.order.version(),
                lines = self.order.items().len(),
                "lab order event applied"
            );
        }

        let totals = self.order.totals();
        self.overall_discount.sync(totals.total_discount);
        self.overall_paid.sync(totals.total_paid);

        Ok(events)
    }

    pub fn add_test(&mut self, test: CatalogTest) -> BillingResult<()> {
        let command = LabOrderCommand::AddTest(AddTest {
            order_id: self.id(),
            test,
            occurred_at: now(),
        });
        self.execute(command).map(drop)
    }

    pub fn remove_line(&mut self, index: usize) -> BillingResult<()> {
        let command = LabOrderCommand::RemoveLine(RemoveLine {
            order_id: self.id(),
            index,
            occurred_at: now(),
        });
        self.execute(command).map(drop)
    }

    /// Edit one field of one line, with today's local date as the sample-date floor.
    pub fn edit_row(&mut self, index: usize, field: RowField, raw: &str) -> BillingResult<()> {
        self.edit_row_on(index, field, raw, Local::now().date_naive())
    }

    pub fn edit_row_on(
        &mut self,
        index: usize,
        field: RowField,
        raw: &str,
        today: NaiveDate,
    ) -> BillingResult<()> {
        let command = LabOrderCommand::EditRow(EditRow {
            order_id: self.id(),
            index,
            field,
            raw: raw.to_string(),
            today,
            occurred_at: now(),
        });
        self.execute(command).map(drop)
    }

    /// Keystroke in the overall discount box. Nothing is redistributed yet.
    pub fn type_overall_discount(&mut self, raw: impl Into<String>) {
        self.overall_discount.edit(raw);
    }

    /// Commit the overall discount draft (blur / Enter).
    ///
    /// Returns `Ok(false)` when there was no pending draft.
    pub fn commit_overall_discount(&mut self) -> BillingResult<bool> {
        let Some(requested) = self.overall_discount.commit(self.order.max_amount()) else {
            return Ok(false);
        };
        let command = LabOrderCommand::ApplyOverallDiscount(ApplyOverallDiscount {
            order_id: self.id(),
            raw: requested.to_string(),
            occurred_at: now(),
        });
        self.execute(command).map(|_| true)
    }

    pub fn cancel_overall_discount(&mut self) {
        self.overall_discount.cancel();
    }

    /// Keystroke in the overall paid box. Nothing is allocated yet.
    pub fn type_overall_paid(&mut self, raw: impl Into<String>) {
        self.overall_paid.edit(raw);
    }

    /// Commit the overall paid draft (blur / Enter).
    ///
    /// Returns `Ok(false)` when there was no pending draft.
    pub fn commit_overall_paid(&mut self) -> BillingResult<bool> {
        let Some(requested) = self.overall_paid.commit(self.order.max_amount()) else {
            return Ok(false);
        };
        let command = LabOrderCommand::ApplyOverallPaid(ApplyOverallPaid {
            order_id: self.id(),
            raw: requested.to_string(),
            occurred_at: now(),
        });
        self.execute(command).map(|_| true)
    }

    pub fn cancel_overall_paid(&mut self) {
        self.overall_paid.cancel();
    }

    /// Pre-populate from a previously submitted record (edit mode).
    pub fn load_existing(&mut self, lines: Vec<ExistingLine>) -> BillingResult<()> {
        let command = LabOrderCommand::LoadExisting(LoadExisting {
            order_id: self.id(),
            lines,
            occurred_at: now(),
        });
        self.execute(command).map(drop)
    }

    /// Discard every line and any pending drafts.
    pub fn reset(&mut self) -> BillingResult<()> {
        self.overall_discount.cancel();
        self.overall_paid.cancel();
        let command = LabOrderCommand::ResetOrder(ResetOrder {
            order_id: self.id(),
            occurred_at: now(),
        });
        self.execute(command).map(drop)
    }

    /// Build the payload for the persistence collaborator.
    ///
    /// Fails with `EmptyOrder` when no tests were added; the session is not
    /// reset here because persistence may still fail.
    pub fn submission(&self) -> BillingResult<Submission> {
        self.order.submission().inspect_err(|e| {
            tracing::warn!(order_id = %self.id(), error = %e, "submission blocked");
        })
    }

    /// Called once the collaborator has stored the submission.
    pub fn complete_submission(&mut self) -> BillingResult<()> {
        tracing::info!(order_id = %self.id(), "submission stored; clearing order");
        self.reset()
    }
}

fn now() -> DateTime<Utc> {
    Utc::now()
}
