//! Accounting module: party transaction logs and balances, expenses, the
//! combined cash ledger and financial reports.
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns.

pub mod balance;
pub mod cash_ledger;
pub mod expense;
pub mod report;
pub mod transaction;

pub use balance::{PartyBalance, balance_of, party_balances, payables, receivables};
pub use cash_ledger::{CashEntry, CashEntryKind, CashLedger, LedgerLine};
pub use expense::{CategoryTotal, Expense, ExpenseCategory, ExpenseSummary, NewExpense, summarize_expenses};
pub use report::{Deposit, DepositDirection, Deposits, FinancialSummary, collect_deposits, financial_summary};
pub use transaction::{PartyLog, Transaction, TransactionType};
