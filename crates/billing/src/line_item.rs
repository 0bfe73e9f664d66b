use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use hospix_core::{DomainError, TestId};

use crate::coerce::{MAX_AMOUNT, clamp_amount};

/// Catalog entry used to seed a new line (looked up by an external collaborator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTest {
    pub id: TestId,
    pub name: String,
    /// Price in whole currency units.
    pub price: i64,
}

/// A previously submitted line, used to pre-populate the store in edit mode.
///
/// Shares the persistence wire shape; `remainingAmount` is ignored and
/// re-derived on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingLine {
    pub test: TestId,
    #[serde(default)]
    pub test_name: String,
    pub test_price: i64,
    #[serde(default)]
    pub discount_amount: i64,
    #[serde(default)]
    pub advance_amount: i64,
    #[serde(default)]
    pub sample_date: Option<NaiveDate>,
    #[serde(default)]
    pub report_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
}

/// One ordered test with its own price/discount/paid breakdown.
///
/// Money fields are private so every change goes through a setter that
/// re-derives `final_amount` and `remaining`. Deserialization is checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "LineItemRecord")]
pub struct LineItem {
    test_id: TestId,
    test_name: String,
    position: u32,
    sample_date: Option<NaiveDate>,
    report_date: Option<NaiveDate>,
    amount: i64,
    discount: i64,
    final_amount: i64,
    paid: i64,
    remaining: i64,
    notes: String,
}

impl LineItem {
    /// New line for a catalog test: full price, no discount, nothing paid.
    pub fn from_catalog(test: &CatalogTest, position: u32, max_amount: i64) -> Self {
        let amount = clamp_amount(test.price, max_amount);
        Self {
            test_id: test.id,
            test_name: test.name.clone(),
            position,
            sample_date: None,
            report_date: None,
            amount,
            discount: 0,
            final_amount: amount,
            paid: 0,
            remaining: amount,
            notes: String::new(),
        }
    }

    /// Rebuild a line from a stored record, clamping anything out of bounds.
    pub fn from_existing(line: &ExistingLine, position: u32, max_amount: i64) -> Self {
        let mut item = Self {
            test_id: line.test,
            test_name: line.test_name.clone(),
            position,
            sample_date: line.sample_date,
            report_date: line.report_date,
            amount: clamp_amount(line.test_price, max_amount),
            discount: 0,
            final_amount: 0,
            paid: 0,
            remaining: 0,
            notes: line.notes.clone(),
        };
        item.set_discount(clamp_amount(line.discount_amount, max_amount));
        item.set_paid(clamp_amount(line.advance_amount, max_amount));
        item
    }

    pub fn test_id(&self) -> TestId {
        self.test_id
    }

    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    /// 1-based position in the order.
    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn sample_date(&self) -> Option<NaiveDate> {
        self.sample_date
    }

    pub fn report_date(&self) -> Option<NaiveDate> {
        self.report_date
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn discount(&self) -> i64 {
        self.discount
    }

    pub fn final_amount(&self) -> i64 {
        self.final_amount
    }

    pub fn paid(&self) -> i64 {
        self.paid
    }

    pub fn remaining(&self) -> i64 {
        self.remaining
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Set the price; the existing discount is re-capped to the new amount.
    pub(crate) fn set_amount(&mut self, amount: i64) {
        self.amount = amount.max(0);
        self.discount = self.discount.min(self.amount);
        self.rederive();
    }

    /// Set the discount, capped at the amount.
    pub(crate) fn set_discount(&mut self, discount: i64) {
        self.discount = discount.clamp(0, self.amount);
        self.rederive();
    }

    /// Set the paid amount, capped at the final amount.
    pub(crate) fn set_paid(&mut self, paid: i64) {
        self.paid = paid.clamp(0, self.final_amount);
        self.remaining = self.final_amount - self.paid;
    }

    pub(crate) fn set_sample_date(&mut self, date: Option<NaiveDate>) {
        self.sample_date = date;
    }

    pub(crate) fn set_report_date(&mut self, date: Option<NaiveDate>) {
        self.report_date = date;
    }

    pub(crate) fn set_test_name(&mut self, name: String) {
        self.test_name = name;
    }

    pub(crate) fn set_notes(&mut self, notes: String) {
        self.notes = notes;
    }

    pub(crate) fn set_position(&mut self, position: u32) {
        self.position = position;
    }

    fn rederive(&mut self) {
        self.final_amount = self.amount - self.discount;
        self.paid = self.paid.min(self.final_amount);
        self.remaining = self.final_amount - self.paid;
    }

    /// Whether every money invariant holds for this line.
    pub fn is_consistent(&self, max_amount: i64) -> bool {
        (0..=max_amount).contains(&self.amount)
            && (0..=self.amount).contains(&self.discount)
            && self.final_amount == self.amount - self.discount
            && (0..=self.final_amount).contains(&self.paid)
            && self.remaining == self.final_amount - self.paid
    }
}

/// Unchecked wire form of [`LineItem`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LineItemRecord {
    test_id: TestId,
    test_name: String,
    position: u32,
    sample_date: Option<NaiveDate>,
    report_date: Option<NaiveDate>,
    amount: i64,
    discount: i64,
    final_amount: i64,
    paid: i64,
    remaining: i64,
    notes: String,
}

impl TryFrom<LineItemRecord> for LineItem {
    type Error = DomainError;

    fn try_from(r: LineItemRecord) -> Result<Self, Self::Error> {
        let item = LineItem {
            test_id: r.test_id,
            test_name: r.test_name,
            position: r.position,
            sample_date: r.sample_date,
            report_date: r.report_date,
            amount: r.amount,
            discount: r.discount,
            final_amount: r.final_amount,
            paid: r.paid,
            remaining: r.remaining,
            notes: r.notes,
        };
        if !item.is_consistent(MAX_AMOUNT) {
            return Err(DomainError::invariant(format!(
                "line {} money fields are inconsistent",
                item.position
            )));
        }
        Ok(item)
    }
}

/// Ordered, versioned collection of line items.
///
/// Single owner (the editing session); positions always form a dense `1..=N`
/// sequence matching list order. `version` bumps on every mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineItemStore {
    items: Vec<LineItem>,
    version: u64,
}

impl LineItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&LineItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Position the next appended line will receive.
    pub fn next_position(&self) -> u32 {
        u32::try_from(self.items.len()).map_or(u32::MAX, |n| n.saturating_add(1))
    }

    /// Append a line, assigning it the next position.
    pub fn push(&mut self, mut item: LineItem) {
        item.set_position(self.next_position());
        self.items.push(item);
        self.version += 1;
    }

    /// Remove the line at `index` and renumber the rest.
    pub fn remove(&mut self, index: usize) -> Option<LineItem> {
        if index >= self.items.len() {
            return None;
        }
        let removed = self.items.remove(index);
        self.renumber();
        self.version += 1;
        Some(removed)
    }

    /// Replace the line at `index`, keeping its position.
    pub fn replace(&mut self, index: usize, mut item: LineItem) -> bool {
        let Some(slot) = self.items.get_mut(index) else {
            return false;
        };
        item.set_position(slot.position);
        *slot = item;
        self.version += 1;
        true
    }

    /// Swap in a whole new list (bulk redistribution or load).
    pub fn replace_all(&mut self, items: Vec<LineItem>) {
        self.items = items;
        self.renumber();
        self.version += 1;
    }

    /// Discard every line (after submission or explicit reset).
    pub fn clear(&mut self) {
        self.items.clear();
        self.version += 1;
    }

    fn renumber(&mut self) {
        for (i, item) in self.items.iter_mut().enumerate() {
            item.set_position(u32::try_from(i + 1).unwrap_or(u32::MAX));
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::coerce::MAX_AMOUNT;

    #[test]
    fn catalog_line_starts_unpaid_at_full_price() {
        let item = LineItem::from_catalog(&catalog("CBC", 450), 1, MAX_AMOUNT);
        assert_eq!(item.amount(), 450);
        assert_eq!(item.discount(), 0);
        assert_eq!(item.final_amount(), 450);
        assert_eq!(item.paid(), 0);
        assert_eq!(item.remaining(), 450);
        assert!(item.is_consistent(MAX_AMOUNT));
    }

    #[test]
    fn catalog_price_is_clamped() {
        let item = LineItem::from_catalog(&catalog("MRI", 50_000_000), 1, MAX_AMOUNT);
        assert_eq!(item.amount(), MAX_AMOUNT);
        let item = LineItem::from_catalog(&catalog("Refund", -10), 1, MAX_AMOUNT);
        assert_eq!(item.amount(), 0);
    }

    #[test]
    fn lowering_amount_recaps_discount_and_paid() {
        let mut item = LineItem::from_catalog(&catalog("LFT", 1000), 1, MAX_AMOUNT);
        item.set_discount(300);
        item.set_paid(700);
        item.set_amount(200);
        assert_eq!(item.discount(), 200);
        assert_eq!(item.final_amount(), 0);
        assert_eq!(item.paid(), 0);
        assert_eq!(item.remaining(), 0);
        assert!(item.is_consistent(MAX_AMOUNT));
    }

    #[test]
    fn existing_record_is_clamped_into_invariants() {
        let line = ExistingLine {
            test: TestId::new(),
            test_name: "Lipid panel".into(),
            test_price: 800,
            discount_amount: 900,
            advance_amount: 50,
            sample_date: None,
            report_date: None,
            notes: "fasting".into(),
        };
        let item = LineItem::from_existing(&line, 1, MAX_AMOUNT);
        assert_eq!(item.discount(), 800);
        assert_eq!(item.final_amount(), 0);
        assert_eq!(item.paid(), 0);
        assert!(item.is_consistent(MAX_AMOUNT));
    }

    #[test]
    fn serialized_line_deserializes_unchanged() {
        let mut item = LineItem::from_catalog(&catalog("ESR", 250), 3, MAX_AMOUNT);
        item.set_discount(50);
        item.set_paid(120);
        let json = serde_json::to_value(&item).unwrap();
        let back: LineItem = serde_json::from_value(json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn inconsistent_line_fails_to_deserialize() {
        let item = LineItem::from_catalog(&catalog("ESR", 250), 1, MAX_AMOUNT);
        let mut json = serde_json::to_value(&item).unwrap();
        json["discount"] = serde_json::json!(400);
        assert!(serde_json::from_value::<LineItem>(json).is_err());

        let mut json = serde_json::to_value(&item).unwrap();
        json["paid"] = serde_json::json!(100);
        assert!(serde_json::from_value::<LineItem>(json).is_err());
    }

    #[test]
    fn removing_first_of_three_renumbers_positions() {
        let mut store = LineItemStore::new();
        for item in lines(&[100, 200, 300]) {
            store.push(item);
        }
        let removed = store.remove(0).unwrap();
        assert_eq!(removed.amount(), 100);

        let positions: Vec<u32> = store.items().iter().map(LineItem::position).collect();
        assert_eq!(positions, vec![1, 2]);
        let amounts: Vec<i64> = store.items().iter().map(LineItem::amount).collect();
        assert_eq!(amounts, vec![200, 300]);
    }

    #[test]
    fn remove_out_of_range_is_a_no_op() {
        let mut store = LineItemStore::new();
        store.push(lines(&[100]).remove(0));
        let version = store.version();
        assert!(store.remove(5).is_none());
        assert_eq!(store.version(), version);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn every_mutation_bumps_version() {
        let mut store = LineItemStore::new();
        assert_eq!(store.version(), 0);
        store.push(lines(&[100]).remove(0));
        assert_eq!(store.version(), 1);
        let item = store.get(0).cloned().unwrap();
        assert!(store.replace(0, item));
        assert_eq!(store.version(), 2);
        store.replace_all(lines(&[1, 2]));
        assert_eq!(store.version(), 3);
        store.clear();
        assert_eq!(store.version(), 4);
        assert!(store.is_empty());
    }

    #[test]
    fn replace_keeps_slot_position() {
        let mut store = LineItemStore::new();
        for item in lines(&[100, 200]) {
            store.push(item);
        }
        let mut replacement = lines(&[999]).remove(0);
        replacement.set_position(42);
        store.replace(1, replacement);
        assert_eq!(store.get(1).unwrap().position(), 2);
        assert_eq!(store.get(1).unwrap().amount(), 999);
    }
}
