//! Financial summary and deposits (cash and bank reconciliation) reports.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use textileflow_invoicing::{Bill, BrokerCommission, Invoice, PaymentMethod, Settleable};

use crate::balance::{payables, receivables};
use crate::expense::Expense;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub total_sales: Decimal,
    pub total_purchases: Decimal,
    pub total_expenses: Decimal,
    /// Broker commission owed across all invoices, paid or not.
    pub total_commissions: Decimal,
    pub net_profit: Decimal,
    pub receivables: Decimal,
    pub payables: Decimal,
}

pub fn financial_summary(invoices: &[Invoice], bills: &[Bill], expenses: &[Expense]) -> FinancialSummary {
    let total_sales: Decimal = invoices.iter().map(Settleable::total).sum();
    let total_purchases: Decimal = bills.iter().map(Settleable::total).sum();
    let total_expenses: Decimal = expenses.iter().map(|e| e.amount).sum();
    let total_commissions: Decimal = invoices
        .iter()
        .filter_map(Invoice::commission)
        .map(BrokerCommission::amount)
        .sum();

    FinancialSummary {
        total_sales,
        total_purchases,
        total_expenses,
        total_commissions,
        net_profit: total_sales - total_purchases - total_expenses - total_commissions,
        receivables: receivables(invoices),
        payables: payables(bills),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DepositDirection {
    Incoming,
    Outgoing,
}

/// One payment as it hit the bank account or the cash box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub direction: DepositDirection,
    pub source: String,
    pub party: String,
    pub bank_name: Option<String>,
    pub tid: Option<String>,
}

impl Deposit {
    pub fn signed(&self) -> Decimal {
        match self.direction {
            DepositDirection::Incoming => self.amount,
            DepositDirection::Outgoing => -self.amount,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposits {
    pub bank: Vec<Deposit>,
    pub cash: Vec<Deposit>,
}

impl Deposits {
    pub fn bank_net(&self) -> Decimal {
        self.bank.iter().map(Deposit::signed).sum()
    }

    pub fn cash_net(&self) -> Decimal {
        self.cash.iter().map(Deposit::signed).sum()
    }

    fn push(&mut self, method: PaymentMethod, deposit: Deposit) {
        match method {
            PaymentMethod::Bank => self.bank.push(deposit),
            PaymentMethod::Cash => self.cash.push(deposit),
            PaymentMethod::Credit => {}
        }
    }
}

/// Customer receipts come in; supplier and broker payments go out. Credit
/// entries move no money and are skipped. Each side is newest first.
pub fn collect_deposits(invoices: &[Invoice], bills: &[Bill]) -> Deposits {
    let mut out = Deposits::default();

    for inv in invoices {
        for p in inv.payments() {
            out.push(
                p.method,
                Deposit {
                    date: p.date,
                    amount: p.amount,
                    direction: DepositDirection::Incoming,
                    source: format!("Sale #{}", inv.invoice_number),
                    party: inv.party_name().unwrap_or("Customer Payment").to_string(),
                    bank_name: p.bank_name.clone(),
                    tid: p.tid.clone(),
                },
            );
        }
        if let Some(commission) = inv.commission() {
            for p in commission.ledger().payments() {
                out.push(
                    p.method,
                    Deposit {
                        date: p.date,
                        amount: p.amount,
                        direction: DepositDirection::Outgoing,
                        source: format!("Commission - Sale #{}", inv.invoice_number),
                        party: format!("Broker: {}", commission.broker_name().unwrap_or("-")),
                        bank_name: p.bank_name.clone(),
                        tid: p.tid.clone(),
                    },
                );
            }
        }
    }

    for bill in bills {
        for p in bill.payments() {
            out.push(
                p.method,
                Deposit {
                    date: p.date,
                    amount: p.amount,
                    direction: DepositDirection::Outgoing,
                    source: format!("Purchase #{}", bill.bill_number),
                    party: bill.party_name().unwrap_or("Supplier Settlement").to_string(),
                    bank_name: p.bank_name.clone(),
                    tid: p.tid.clone(),
                },
            );
        }
    }

    out.bank.sort_by(|a, b| b.date.cmp(&a.date));
    out.cash.sort_by(|a, b| b.date.cmp(&a.date));
    out
}
