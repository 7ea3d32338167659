//! In-memory copy of everything the backend knows, plus the views built on it.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use textileflow_accounting::{
    CashLedger, Deposits, Expense, ExpenseSummary, FinancialSummary, PartyBalance, PartyLog,
    collect_deposits, financial_summary, party_balances, summarize_expenses,
};
use textileflow_core::{
    BillId, CustomerId, DomainError, DomainResult, InventoryItemId, InvoiceId, VendorId,
};
use textileflow_inventory::{InventoryItem, InventorySummary, ItemMaster, Lot, group_lots, summarize};
use textileflow_invoicing::{
    Bill, DocumentRow, DocumentSummary, Invoice, LineItem, sort_for_listing,
};
use textileflow_parties::{Broker, Customer, PartyRef, Vendor};

#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub vendors: Vec<Vendor>,
    pub customers: Vec<Customer>,
    pub brokers: Vec<Broker>,
    pub inventory: Vec<InventoryItem>,
    pub item_master: Vec<ItemMaster>,
    pub invoices: Vec<Invoice>,
    pub bills: Vec<Bill>,
    pub expenses: Vec<Expense>,
    /// Transaction history per vendor and customer.
    pub logs: BTreeMap<PartyRef, PartyLog>,
}

impl Snapshot {
    pub fn vendor(&self, id: VendorId) -> Option<&Vendor> {
        self.vendors.iter().find(|v| v.id == id)
    }

    pub fn customer(&self, id: CustomerId) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    pub fn invoice(&self, id: InvoiceId) -> Option<&Invoice> {
        self.invoices.iter().find(|i| i.id == id)
    }

    pub fn bill(&self, id: BillId) -> Option<&Bill> {
        self.bills.iter().find(|b| b.id == id)
    }

    pub fn inventory_item(&self, id: InventoryItemId) -> Option<&InventoryItem> {
        self.inventory.iter().find(|i| i.id == id)
    }

    pub fn log(&self, party: PartyRef) -> Option<&PartyLog> {
        self.logs.get(&party)
    }

    pub fn upsert_invoice(&mut self, invoice: Invoice) {
        match self.invoices.iter_mut().find(|i| i.id == invoice.id) {
            Some(slot) => *slot = invoice,
            None => self.invoices.push(invoice),
        }
    }

    pub fn upsert_bill(&mut self, bill: Bill) {
        match self.bills.iter_mut().find(|b| b.id == bill.id) {
            Some(slot) => *slot = bill,
            None => self.bills.push(bill),
        }
    }

    /// Unbilled stock received from `vendor`.
    pub fn billable_items(&self, vendor: VendorId) -> Vec<&InventoryItem> {
        self.inventory.iter().filter(|i| i.billable_for(vendor)).collect()
    }

    /// Stock that still has meters to sell.
    pub fn sellable_items(&self) -> Vec<&InventoryItem> {
        self.inventory.iter().filter(|i| i.sellable()).collect()
    }

    pub fn lots(&self) -> Vec<Lot> {
        group_lots(&self.inventory)
    }

    pub fn inventory_summary(&self) -> InventorySummary {
        summarize(&self.inventory)
    }

    /// Every invoice line must fit in the meters still in stock. Lines that
    /// repeat an item are added up first.
    pub fn check_stock(&self, lines: &[LineItem]) -> DomainResult<()> {
        let mut wanted: HashMap<InventoryItemId, Decimal> = HashMap::new();
        for line in lines {
            *wanted.entry(line.item_id).or_default() += line.meters;
        }
        for line in lines {
            let item = self
                .inventory_item(line.item_id)
                .ok_or_else(|| DomainError::validation(format!("Unknown inventory item #{}", line.item_id)))?;
            if wanted[&line.item_id] > item.meters {
                return Err(DomainError::validation(format!(
                    "Insufficient stock. Available: {}m",
                    item.meters.normalize()
                )));
            }
        }
        Ok(())
    }

    /// Bill lines may only use unbilled stock from the bill's vendor.
    pub fn check_billable(&self, vendor: VendorId, lines: &[LineItem]) -> DomainResult<()> {
        for line in lines {
            match self.inventory_item(line.item_id) {
                Some(item) if item.billable_for(vendor) => {}
                Some(item) => {
                    return Err(DomainError::validation(format!(
                        "Lot {} is not available for billing to this supplier",
                        item.lot_number
                    )));
                }
                None => {
                    return Err(DomainError::validation(format!(
                        "Unknown inventory item #{}",
                        line.item_id
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn invoice_rows(&self, today: NaiveDate) -> Vec<DocumentRow> {
        let mut docs = self.invoices.clone();
        sort_for_listing(&mut docs, today);
        docs.iter().map(|d| DocumentRow::of(d, today)).collect()
    }

    pub fn bill_rows(&self, today: NaiveDate) -> Vec<DocumentRow> {
        let mut docs = self.bills.clone();
        sort_for_listing(&mut docs, today);
        docs.iter().map(|d| DocumentRow::of(d, today)).collect()
    }

    pub fn invoice_summary(&self) -> DocumentSummary {
        textileflow_invoicing::summarize(&self.invoices)
    }

    pub fn bill_summary(&self) -> DocumentSummary {
        textileflow_invoicing::summarize(&self.bills)
    }

    pub fn expense_summary(&self) -> ExpenseSummary {
        summarize_expenses(&self.expenses)
    }

    pub fn financial_summary(&self) -> FinancialSummary {
        financial_summary(&self.invoices, &self.bills, &self.expenses)
    }

    pub fn deposits(&self) -> Deposits {
        collect_deposits(&self.invoices, &self.bills)
    }

    pub fn cash_ledger(&self) -> CashLedger {
        CashLedger::from_records(&self.invoices, &self.bills, &self.expenses)
    }

    pub fn party_balances(&self) -> Vec<PartyBalance> {
        party_balances(&self.invoices, &self.bills)
    }

    /// Display name for a party, falling back to its id.
    pub fn party_name(&self, party: PartyRef) -> String {
        match party {
            PartyRef::Vendor(id) => self
                .vendor(id)
                .map(|v| v.name.clone())
                .unwrap_or_else(|| format!("Vendor #{id}")),
            PartyRef::Customer(id) => self
                .customer(id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| format!("Customer #{id}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use textileflow_invoicing::{LedgerRef, NewPayment, SettlementLedger, Settleable};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn stock(id: i64, vendor: i64, meters: Decimal, billed: bool) -> InventoryItem {
        InventoryItem {
            id: InventoryItemId::new(id),
            lot_number: format!("LOT-{id}"),
            fabric_type: "Lawn".into(),
            meters,
            unit_price: dec!(10),
            vendor_id: VendorId::new(vendor),
            received_date: day(1),
            is_billed: billed,
        }
    }

    fn invoice(id: i64, customer: i64, total: Decimal, date: NaiveDate) -> Invoice {
        let id = InvoiceId::new(id);
        Invoice {
            id,
            invoice_number: format!("INV-{id}"),
            customer_id: CustomerId::new(customer),
            customer_name: None,
            date,
            due_date: date + chrono::Duration::days(30),
            notes: None,
            lines: Vec::new(),
            ledger: SettlementLedger::new(LedgerRef::Invoice(id), total).unwrap(),
            commission: None,
        }
    }

    #[test]
    fn stock_check_adds_up_repeated_lines() {
        let snap = Snapshot {
            inventory: vec![stock(1, 1, dec!(100), false)],
            ..Snapshot::default()
        };
        let line = |m| LineItem::new(InventoryItemId::new(1), m, dec!(12));

        assert!(snap.check_stock(&[line(dec!(100))]).is_ok());
        let err = snap.check_stock(&[line(dec!(60)), line(dec!(50))]).unwrap_err();
        assert_eq!(err, DomainError::validation("Insufficient stock. Available: 100m"));
        assert!(
            snap.check_stock(&[LineItem::new(InventoryItemId::new(9), dec!(1), dec!(1))])
                .is_err()
        );
    }

    #[test]
    fn only_unbilled_stock_from_the_same_vendor_can_be_billed() {
        let snap = Snapshot {
            inventory: vec![
                stock(1, 1, dec!(100), false),
                stock(2, 1, dec!(50), true),
                stock(3, 2, dec!(70), false),
            ],
            ..Snapshot::default()
        };
        let vendor = VendorId::new(1);
        let ids: Vec<i64> = snap.billable_items(vendor).iter().map(|i| i.id.get()).collect();
        assert_eq!(ids, [1]);

        let line = |id| LineItem::new(InventoryItemId::new(id), dec!(10), dec!(10));
        assert!(snap.check_billable(vendor, &[line(1)]).is_ok());
        assert!(snap.check_billable(vendor, &[line(2)]).is_err());
        assert!(snap.check_billable(vendor, &[line(3)]).is_err());
    }

    #[test]
    fn upsert_replaces_by_id() {
        let mut snap = Snapshot::default();
        snap.upsert_invoice(invoice(1, 5, dec!(1000), day(1)));
        let mut paid = invoice(1, 5, dec!(1000), day(1));
        paid.record_payment(NewPayment::cash(day(2), dec!(400)), Utc::now())
            .unwrap();
        snap.upsert_invoice(paid);

        assert_eq!(snap.invoices.len(), 1);
        assert_eq!(snap.invoice(InvoiceId::new(1)).unwrap().remaining(), dec!(600));
    }

    #[test]
    fn listing_puts_overdue_first_then_newest() {
        let snap = Snapshot {
            invoices: vec![
                invoice(1, 5, dec!(100), day(1)),
                invoice(2, 5, dec!(100), day(20)),
                invoice(3, 5, dec!(100), day(10)),
            ],
            ..Snapshot::default()
        };
        let rows = snap.invoice_rows(day(5) + chrono::Duration::days(30));
        let numbers: Vec<&str> = rows.iter().map(|r| r.number.as_str()).collect();
        assert_eq!(numbers, ["INV-1", "INV-2", "INV-3"]);
        assert!(rows[0].overdue);
    }

    #[test]
    fn reports_follow_the_documents() {
        let mut sold = invoice(1, 5, dec!(1000), day(1));
        sold.record_payment(NewPayment::bank(day(3), dec!(400), "HBL", "T1"), Utc::now())
            .unwrap();
        let snap = Snapshot {
            invoices: vec![sold],
            ..Snapshot::default()
        };

        let summary = snap.financial_summary();
        assert_eq!(summary.total_sales, dec!(1000));
        assert_eq!(summary.receivables, dec!(600));
        assert_eq!(snap.deposits().bank_net(), dec!(400));

        let balances = snap.party_balances();
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].signed(), dec!(600));
        assert_eq!(snap.party_name(balances[0].party), "Customer #5");
    }
}
