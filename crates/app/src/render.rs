//! Terminal tables for the CLI.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use rust_decimal::Decimal;

use textileflow_accounting::{CashLedger, Deposit, Deposits, Expense, FinancialSummary, PartyLog};
use textileflow_core::money::format_rupees;
use textileflow_inventory::InventoryItem;
use textileflow_invoicing::{DocumentRow, DocumentSummary, Invoice, Settleable};

use crate::snapshot::Snapshot;

fn table(header: &[&str]) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    t
}

fn money(value: Decimal) -> Cell {
    Cell::new(format_rupees(value)).set_alignment(CellAlignment::Right)
}

fn opt(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

pub fn vendors(snap: &Snapshot) -> Table {
    let mut t = table(&["ID", "Supplier", "Contact", "Address", "Payable"]);
    for v in &snap.vendors {
        t.add_row(vec![
            Cell::new(v.id),
            Cell::new(&v.name),
            Cell::new(&v.contact),
            Cell::new(opt(v.address.as_deref())),
            money(v.payable()),
        ]);
    }
    t
}

pub fn customers(snap: &Snapshot) -> Table {
    let mut t = table(&["ID", "Customer", "Contact", "Address", "Receivable"]);
    for c in &snap.customers {
        t.add_row(vec![
            Cell::new(c.id),
            Cell::new(&c.name),
            Cell::new(&c.contact),
            Cell::new(opt(c.address.as_deref())),
            money(c.receivable()),
        ]);
    }
    t
}

pub fn brokers(snap: &Snapshot) -> Table {
    let mut t = table(&["ID", "Broker", "Contact", "Commission owed"]);
    for b in &snap.brokers {
        let owed: Decimal = snap
            .invoices
            .iter()
            .filter_map(Invoice::commission)
            .filter(|c| c.broker_id() == b.id)
            .map(|c| c.outstanding())
            .sum();
        t.add_row(vec![
            Cell::new(b.id),
            Cell::new(&b.name),
            Cell::new(opt(b.contact.as_deref())),
            money(owed),
        ]);
    }
    t
}

pub fn inventory<'a>(snap: &Snapshot, items: impl IntoIterator<Item = &'a InventoryItem>) -> Table {
    let mut t = table(&["ID", "Lot", "Fabric", "Meters", "Unit price", "Value", "Supplier", "Billed"]);
    for item in items {
        let supplier = snap
            .vendor(item.vendor_id)
            .map(|v| v.name.clone())
            .unwrap_or_else(|| format!("#{}", item.vendor_id));
        t.add_row(vec![
            Cell::new(item.id),
            Cell::new(&item.lot_number),
            Cell::new(&item.fabric_type),
            Cell::new(item.meters).set_alignment(CellAlignment::Right),
            money(item.unit_price),
            money(item.total_value()),
            Cell::new(supplier),
            Cell::new(if item.is_billed { "yes" } else { "no" }),
        ]);
    }
    t
}

pub fn documents(rows: &[DocumentRow]) -> Table {
    let mut t = table(&["Number", "Party", "Date", "Due", "Total", "Paid", "Balance", "Status"]);
    for row in rows {
        let status = if row.overdue {
            format!("{} (overdue)", row.status)
        } else {
            row.status.to_string()
        };
        t.add_row(vec![
            Cell::new(&row.number),
            Cell::new(&row.party),
            Cell::new(row.date),
            Cell::new(row.due_date),
            money(row.total),
            money(row.amount_paid),
            money(row.remaining),
            Cell::new(status),
        ]);
    }
    t
}

/// One document with its payments and commission sub-ledger.
pub fn document_detail<D: Settleable>(doc: &D, commission: Option<&Invoice>) -> Table {
    let mut t = table(&["Date", "Method", "Bank", "TID", "Amount"]);
    for p in doc.payments() {
        t.add_row(vec![
            Cell::new(p.date),
            Cell::new(p.method.as_str()),
            Cell::new(opt(p.bank_name.as_deref())),
            Cell::new(opt(p.tid.as_deref())),
            money(p.amount),
        ]);
    }
    t.add_row(vec![
        Cell::new(format!("{} {}", D::KIND.as_str(), doc.number())),
        Cell::new(doc.status_label()),
        Cell::new(""),
        Cell::new("Remaining"),
        money(doc.remaining()),
    ]);
    if let Some(c) = commission.and_then(Invoice::commission) {
        t.add_row(vec![
            Cell::new("Commission"),
            Cell::new(c.terms().kind.as_str()),
            Cell::new(opt(c.broker_name())),
            Cell::new(format!("paid {}", format_rupees(c.paid()))),
            money(c.outstanding()),
        ]);
    }
    t
}

pub fn document_summary(summary: &DocumentSummary) -> Table {
    let mut t = table(&["Status", "Count", "Amount"]);
    for bucket in &summary.by_status {
        t.add_row(vec![Cell::new(&bucket.label), Cell::new(bucket.count), money(bucket.amount)]);
    }
    t.add_row(vec![Cell::new("Total"), Cell::new(summary.count), money(summary.total_amount)]);
    t.add_row(vec![Cell::new("Paid"), Cell::new(""), money(summary.total_paid)]);
    t.add_row(vec![Cell::new("Outstanding"), Cell::new(""), money(summary.outstanding)]);
    t
}

pub fn party_log(snap: &Snapshot, log: &PartyLog) -> Table {
    let name = snap.party_name(log.party());
    let mut t = table(&[name.as_str(), "Type", "Reference", "Description", "Amount", "Balance"]);
    for (tx, balance) in log.running() {
        t.add_row(vec![
            Cell::new(tx.date),
            Cell::new(tx.kind.as_str()),
            Cell::new(&tx.reference_id),
            Cell::new(&tx.description),
            money(tx.amount),
            money(balance),
        ]);
    }
    t
}

pub fn balances(snap: &Snapshot) -> Table {
    let mut t = table(&["Party", "Open documents", "Outstanding", "Signed balance"]);
    for b in snap.party_balances() {
        t.add_row(vec![
            Cell::new(snap.party_name(b.party)),
            Cell::new(b.open_documents),
            money(b.outstanding),
            money(b.signed()),
        ]);
    }
    t
}

pub fn financial_summary(summary: &FinancialSummary) -> Table {
    let mut t = table(&["", "Amount"]);
    for (label, value) in [
        ("Total sales", summary.total_sales),
        ("Total purchases", summary.total_purchases),
        ("Expenses", summary.total_expenses),
        ("Broker commissions", summary.total_commissions),
        ("Net profit", summary.net_profit),
        ("Receivables", summary.receivables),
        ("Payables", summary.payables),
    ] {
        t.add_row(vec![Cell::new(label), money(value)]);
    }
    t
}

pub fn cash_ledger(ledger: &CashLedger) -> Table {
    let mut t = table(&["Date", "Type", "Reference", "Description", "In", "Out", "Balance"]);
    for line in ledger.lines() {
        let (cash_in, cash_out) = if line.entry.kind.is_inflow() {
            (money(line.entry.amount), Cell::new(""))
        } else {
            (Cell::new(""), money(line.entry.amount))
        };
        t.add_row(vec![
            Cell::new(line.entry.date),
            Cell::new(line.entry.kind.label()),
            Cell::new(&line.entry.reference),
            Cell::new(&line.entry.description),
            cash_in,
            cash_out,
            money(line.balance),
        ]);
    }
    t
}

pub fn deposits(deposits: &Deposits) -> Table {
    let mut t = table(&["Account", "Date", "Source", "Party", "Bank", "TID", "Amount"]);
    let mut push = |account: &str, d: &Deposit| {
        t.add_row(vec![
            Cell::new(account),
            Cell::new(d.date),
            Cell::new(&d.source),
            Cell::new(&d.party),
            Cell::new(opt(d.bank_name.as_deref())),
            Cell::new(opt(d.tid.as_deref())),
            money(d.signed()),
        ]);
    };
    for d in &deposits.bank {
        push("Bank", d);
    }
    for d in &deposits.cash {
        push("Cash", d);
    }
    t.add_row(vec![
        Cell::new("Net"),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new(format!("bank {}", format_rupees(deposits.bank_net()))),
        Cell::new(format!("cash {}", format_rupees(deposits.cash_net()))),
        money(deposits.bank_net() + deposits.cash_net()),
    ]);
    t
}

pub fn expenses(expenses: &[Expense]) -> Table {
    let mut t = table(&["ID", "Date", "Category", "Description", "Method", "Amount"]);
    for e in expenses {
        t.add_row(vec![
            Cell::new(e.id),
            Cell::new(e.date),
            Cell::new(e.category.label()),
            Cell::new(&e.description),
            Cell::new(e.payment_method.as_str()),
            money(e.amount),
        ]);
    }
    t
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use textileflow_core::{ExpenseId, VendorId};
    use textileflow_accounting::ExpenseCategory;
    use textileflow_invoicing::PaymentMethod;
    use textileflow_parties::Vendor;

    #[test]
    fn vendor_table_shows_what_is_owed() {
        let snap = Snapshot {
            vendors: vec![Vendor {
                id: VendorId::new(3),
                name: "ABC Textiles".into(),
                contact: "0300".into(),
                address: None,
                bank_details: None,
                balance: dec!(-7660),
            }],
            ..Snapshot::default()
        };
        let out = vendors(&snap).to_string();
        assert!(out.contains("ABC Textiles"));
        assert!(out.contains("Rs. 7,660.00"));
    }

    #[test]
    fn expense_table_lists_category_and_amount() {
        let rows = vec![Expense {
            id: ExpenseId::new(1),
            date: NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
            category: ExpenseCategory::Packing,
            description: "Cartons".into(),
            amount: dec!(1250.5),
            payment_method: PaymentMethod::Cash,
            notes: None,
        }];
        let out = expenses(&rows).to_string();
        assert!(out.contains("Packing"));
        assert!(out.contains("Rs. 1,250.50"));
    }

    #[test]
    fn empty_summary_still_renders_every_line() {
        let out = financial_summary(&FinancialSummary::default()).to_string();
        assert!(out.contains("Net profit"));
        assert!(out.contains("Payables"));
    }
}
