use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use hospix_core::{Aggregate, AggregateRoot, DomainError, OrderId, TestId};
use hospix_events::Event;

use crate::allocator::{fill_in_order, with_paid};
use crate::coerce::{MAX_AMOUNT, to_int_with_max};
use crate::distributor::{apportion, with_discounts};
use crate::error::{BillingError, BillingResult, EditWarning};
use crate::line_item::{CatalogTest, ExistingLine, LineItem, LineItemStore};
use crate::row_editor::{EditContext, RowField, edit_line};
use crate::submission::{Submission, build_submission};
use crate::totals::InvoiceTotals;

/// Aggregate root: LabOrder (the tests ordered for one patient visit, with billing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabOrder {
    id: OrderId,
    store: LineItemStore,
    max_amount: i64,
    version: u64,
}

impl LabOrder {
    /// Create an empty order with the given money cap (bounded to `MAX_AMOUNT`).
    pub fn empty(id: OrderId, max_amount: i64) -> Self {
        Self {
            id,
            store: LineItemStore::new(),
            max_amount: max_amount.clamp(0, MAX_AMOUNT),
            version: 0,
        }
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn items(&self) -> &[LineItem] {
        self.store.items()
    }

    pub fn store(&self) -> &LineItemStore {
        &self.store
    }

    pub fn max_amount(&self) -> i64 {
        self.max_amount
    }

    pub fn totals(&self) -> InvoiceTotals {
        InvoiceTotals::from_items(self.store.items())
    }

    /// Payload for the persistence collaborator; fails on an empty order.
    pub fn submission(&self) -> BillingResult<Submission> {
        build_submission(self.store.items(), self.store.version())
    }
}

impl AggregateRoot for LabOrder {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: AddTest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddTest {
    pub order_id: OrderId,
    pub test: CatalogTest,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveLine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveLine {
    pub order_id: OrderId,
    pub index: usize,
    pub occurred_at: DateTime<Utc>,
}

/// Command: EditRow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRow {
    pub order_id: OrderId,
    pub index: usize,
    pub field: RowField,
    pub raw: String,
    /// Calendar date at the point of care; lower bound for sample dates.
    pub today: NaiveDate,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ApplyOverallDiscount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyOverallDiscount {
    pub order_id: OrderId,
    pub raw: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ApplyOverallPaid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyOverallPaid {
    pub order_id: OrderId,
    pub raw: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: LoadExisting (edit mode).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadExisting {
    pub order_id: OrderId,
    pub lines: Vec<ExistingLine>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ResetOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetOrder {
    pub order_id: OrderId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabOrderCommand {
    AddTest(AddTest),
    RemoveLine(RemoveLine),
    EditRow(EditRow),
    ApplyOverallDiscount(ApplyOverallDiscount),
    ApplyOverallPaid(ApplyOverallPaid),
    LoadExisting(LoadExisting),
    ResetOrder(ResetOrder),
}

/// Event: TestAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestAdded {
    pub order_id: OrderId,
    pub item: LineItem,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRemoved {
    pub order_id: OrderId,
    pub index: usize,
    pub test_id: TestId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineEdited. Carries the fully re-derived row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineEdited {
    pub order_id: OrderId,
    pub index: usize,
    pub field: RowField,
    pub item: LineItem,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DiscountDistributed. `discounts[i]` is the new discount of line `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountDistributed {
    pub order_id: OrderId,
    pub requested: i64,
    pub discounts: Vec<i64>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PaymentAllocated. `paid[i]` is the new paid amount of line `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAllocated {
    pub order_id: OrderId,
    pub requested: i64,
    pub paid: Vec<i64>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LinesLoaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinesLoaded {
    pub order_id: OrderId,
    pub items: Vec<LineItem>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderReset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReset {
    pub order_id: OrderId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabOrderEvent {
    TestAdded(TestAdded),
    LineRemoved(LineRemoved),
    LineEdited(LineEdited),
    DiscountDistributed(DiscountDistributed),
    PaymentAllocated(PaymentAllocated),
    LinesLoaded(LinesLoaded),
    OrderReset(OrderReset),
}

impl Event for LabOrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            LabOrderEvent::TestAdded(_) => "lab.order.test_added",
            LabOrderEvent::LineRemoved(_) => "lab.order.line_removed",
            LabOrderEvent::LineEdited(_) => "lab.order.line_edited",
            LabOrderEvent::DiscountDistributed(_) => "lab.order.discount_distributed",
            LabOrderEvent::PaymentAllocated(_) => "lab.order.payment_allocated",
            LabOrderEvent::LinesLoaded(_) => "lab.order.lines_loaded",
            LabOrderEvent::OrderReset(_) => "lab.order.reset",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            LabOrderEvent::TestAdded(e) => e.occurred_at,
            LabOrderEvent::LineRemoved(e) => e.occurred_at,
            LabOrderEvent::LineEdited(e) => e.occurred_at,
            LabOrderEvent::DiscountDistributed(e) => e.occurred_at,
            LabOrderEvent::PaymentAllocated(e) => e.occurred_at,
            LabOrderEvent::LinesLoaded(e) => e.occurred_at,
            LabOrderEvent::OrderReset(e) => e.occurred_at,
        }
    }
}

impl Aggregate for LabOrder {
    type Command = LabOrderCommand;
    type Event = LabOrderEvent;
    type Error = BillingError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            LabOrderEvent::TestAdded(e) => {
                self.store.push(e.item.clone());
            }
            LabOrderEvent::LineRemoved(e) => {
                self.store.remove(e.index);
            }
            LabOrderEvent::LineEdited(e) => {
                self.store.replace(e.index, e.item.clone());
            }
            LabOrderEvent::DiscountDistributed(e) => {
                let items = with_discounts(self.store.items(), &e.discounts);
                self.store.replace_all(items);
            }
            LabOrderEvent::PaymentAllocated(e) => {
                let items = with_paid(self.store.items(), &e.paid);
                self.store.replace_all(items);
            }
            LabOrderEvent::LinesLoaded(e) => {
                self.store.replace_all(e.items.clone());
            }
            LabOrderEvent::OrderReset(_) => {
                self.store.clear();
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            LabOrderCommand::AddTest(cmd) => self.handle_add_test(cmd),
            LabOrderCommand::RemoveLine(cmd) => self.handle_remove_line(cmd),
            LabOrderCommand::EditRow(cmd) => self.handle_edit_row(cmd),
            LabOrderCommand::ApplyOverallDiscount(cmd) => self.handle_overall_discount(cmd),
            LabOrderCommand::ApplyOverallPaid(cmd) => self.handle_overall_paid(cmd),
            LabOrderCommand::LoadExisting(cmd) => self.handle_load_existing(cmd),
            LabOrderCommand::ResetOrder(cmd) => self.handle_reset(cmd),
        }
    }
}

impl LabOrder {
    fn ensure_order_id(&self, order_id: OrderId) -> Result<(), BillingError> {
        if self.id != order_id {
            return Err(DomainError::invariant("order_id mismatch").into());
        }
        Ok(())
    }

    fn handle_add_test(&self, cmd: &AddTest) -> BillingResult<Vec<LabOrderEvent>> {
        self.ensure_order_id(cmd.order_id)?;

        let item = LineItem::from_catalog(&cmd.test, self.store.next_position(), self.max_amount);

        Ok(vec![LabOrderEvent::TestAdded(TestAdded {
            order_id: cmd.order_id,
            item,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove_line(&self, cmd: &RemoveLine) -> BillingResult<Vec<LabOrderEvent>> {
        self.ensure_order_id(cmd.order_id)?;

        let item = self
            .store
            .get(cmd.index)
            .ok_or(BillingError::LineNotFound { index: cmd.index })?;

        Ok(vec![LabOrderEvent::LineRemoved(LineRemoved {
            order_id: cmd.order_id,
            index: cmd.index,
            test_id: item.test_id(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_edit_row(&self, cmd: &EditRow) -> BillingResult<Vec<LabOrderEvent>> {
        self.ensure_order_id(cmd.order_id)?;

        let current = self.store.get(cmd.index).ok_or(EditWarning::RowOutOfRange {
            index: cmd.index,
            len: self.store.len(),
        })?;

        let ctx = EditContext {
            today: cmd.today,
            max_amount: self.max_amount,
        };
        let item = edit_line(current, cmd.field, &cmd.raw, ctx)?;

        Ok(vec![LabOrderEvent::LineEdited(LineEdited {
            order_id: cmd.order_id,
            index: cmd.index,
            field: cmd.field,
            item,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_overall_discount(
        &self,
        cmd: &ApplyOverallDiscount,
    ) -> BillingResult<Vec<LabOrderEvent>> {
        self.ensure_order_id(cmd.order_id)?;

        let requested = to_int_with_max(&cmd.raw, self.max_amount);
        let amounts: Vec<i64> = self.store.items().iter().map(LineItem::amount).collect();
        let discounts = apportion(&amounts, requested);

        tracing::debug!(
            order_id = %cmd.order_id,
            requested,
            applied = discounts.iter().sum::<i64>(),
            lines = discounts.len(),
            "overall discount distributed"
        );

        Ok(vec![LabOrderEvent::DiscountDistributed(DiscountDistributed {
            order_id: cmd.order_id,
            requested,
            discounts,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_overall_paid(&self, cmd: &ApplyOverallPaid) -> BillingResult<Vec<LabOrderEvent>> {
        self.ensure_order_id(cmd.order_id)?;

        let requested = to_int_with_max(&cmd.raw, self.max_amount);
        let finals: Vec<i64> = self
            .store
            .items()
            .iter()
            .map(|i| i.amount() - i.discount())
            .collect();
        let paid = fill_in_order(&finals, requested);
        let applied: i64 = paid.iter().sum();

        if applied < requested {
            tracing::debug!(
                order_id = %cmd.order_id,
                requested,
                applied,
                "overall paid exceeds payable total; excess dropped"
            );
        }

        Ok(vec![LabOrderEvent::PaymentAllocated(PaymentAllocated {
            order_id: cmd.order_id,
            requested,
            paid,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_load_existing(&self, cmd: &LoadExisting) -> BillingResult<Vec<LabOrderEvent>> {
        self.ensure_order_id(cmd.order_id)?;

        let items = cmd
            .lines
            .iter()
            .zip(1u32..)
            .map(|(line, position)| LineItem::from_existing(line, position, self.max_amount))
            .collect();

        Ok(vec![LabOrderEvent::LinesLoaded(LinesLoaded {
            order_id: cmd.order_id,
            items,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_reset(&self, cmd: &ResetOrder) -> BillingResult<Vec<LabOrderEvent>> {
        self.ensure_order_id(cmd.order_id)?;

        Ok(vec![LabOrderEvent::OrderReset(OrderReset {
            order_id: cmd.order_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}
