//! Combined cash ledger: every cash-affecting event in date order with a
//! running balance.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use textileflow_invoicing::{Bill, Invoice, Settleable};

use crate::expense::Expense;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CashEntryKind {
    Sale,
    Purchase,
    Expense,
    CommissionPayment,
}

impl CashEntryKind {
    pub fn label(&self) -> &'static str {
        match self {
            CashEntryKind::Sale => "SALES",
            CashEntryKind::Purchase => "BILL",
            CashEntryKind::Expense => "EXPENSE",
            CashEntryKind::CommissionPayment => "COMMISSION",
        }
    }

    pub fn is_inflow(&self) -> bool {
        matches!(self, CashEntryKind::Sale)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashEntry {
    pub date: NaiveDate,
    pub kind: CashEntryKind,
    pub reference: String,
    pub description: String,
    /// Unsigned amount.
    pub amount: Decimal,
}

impl CashEntry {
    pub fn delta(&self) -> Decimal {
        if self.kind.is_inflow() {
            self.amount
        } else {
            -self.amount
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerLine {
    pub entry: CashEntry,
    /// Balance after this entry.
    pub balance: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashLedger {
    opening: Decimal,
    lines: Vec<LedgerLine>,
}

impl CashLedger {
    /// Sort entries by date (stable, so same-day entries keep input order)
    /// and accumulate from `opening`.
    pub fn build(opening: Decimal, mut entries: Vec<CashEntry>) -> Self {
        entries.sort_by_key(|e| e.date);
        let mut balance = opening;
        let lines = entries
            .into_iter()
            .map(|entry| {
                balance += entry.delta();
                LedgerLine { entry, balance }
            })
            .collect();
        Self { opening, lines }
    }

    /// Sales, purchases, expenses and broker commission payments.
    pub fn from_records(invoices: &[Invoice], bills: &[Bill], expenses: &[Expense]) -> Self {
        let mut entries = Vec::with_capacity(invoices.len() + bills.len() + expenses.len());
        for inv in invoices {
            entries.push(CashEntry {
                date: inv.date,
                kind: CashEntryKind::Sale,
                reference: inv.invoice_number.clone(),
                description: inv.party_name().unwrap_or_default().to_string(),
                amount: inv.total(),
            });
        }
        for bill in bills {
            entries.push(CashEntry {
                date: bill.date,
                kind: CashEntryKind::Purchase,
                reference: bill.bill_number.clone(),
                description: bill.party_name().unwrap_or_default().to_string(),
                amount: bill.total(),
            });
        }
        for exp in expenses {
            entries.push(CashEntry {
                date: exp.date,
                kind: CashEntryKind::Expense,
                reference: exp.category.label().to_string(),
                description: exp.description.clone(),
                amount: exp.amount,
            });
        }
        for inv in invoices {
            let Some(commission) = inv.commission() else {
                continue;
            };
            for p in commission.ledger().payments() {
                entries.push(CashEntry {
                    date: p.date,
                    kind: CashEntryKind::CommissionPayment,
                    reference: format!("Commission - {}", inv.invoice_number),
                    description: commission.broker_name().unwrap_or_default().to_string(),
                    amount: p.amount,
                });
            }
        }
        Self::build(Decimal::ZERO, entries)
    }

    pub fn opening(&self) -> Decimal {
        self.opening
    }

    pub fn lines(&self) -> &[LedgerLine] {
        &self.lines
    }

    pub fn closing(&self) -> Decimal {
        self.lines.last().map(|l| l.balance).unwrap_or(self.opening)
    }

    pub fn cash_in(&self) -> Decimal {
        self.lines
            .iter()
            .filter(|l| l.entry.kind.is_inflow())
            .map(|l| l.entry.amount)
            .sum()
    }

    pub fn cash_out(&self) -> Decimal {
        self.lines
            .iter()
            .filter(|l| !l.entry.kind.is_inflow())
            .map(|l| l.entry.amount)
            .sum()
    }

    /// Display order for daily logs.
    pub fn newest_first(&self) -> impl Iterator<Item = &LedgerLine> {
        self.lines.iter().rev()
    }

    /// Lines within `[from, to]`, balances unchanged.
    pub fn between(&self, from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = &LedgerLine> {
        self.lines
            .iter()
            .filter(move |l| l.entry.date >= from && l.entry.date <= to)
    }
}
