//! Per-party transaction log as kept by the backend.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use textileflow_core::TransactionId;
use textileflow_parties::{PartyKind, PartyRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Bill,
    Invoice,
    Payment,
    /// Commission or other settlement paid out on the party's behalf.
    Settlement,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Bill => "Bill",
            TransactionType::Invoice => "Invoice",
            TransactionType::Payment => "Payment",
            TransactionType::Settlement => "Settlement",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label.trim() {
            "Bill" => Some(TransactionType::Bill),
            "Invoice" => Some(TransactionType::Invoice),
            "Payment" => Some(TransactionType::Payment),
            "Settlement" => Some(TransactionType::Settlement),
            _ => None,
        }
    }

    /// Documents raise what is owed; payments and settlements reduce it.
    pub fn raises_balance(&self) -> bool {
        matches!(self, TransactionType::Bill | TransactionType::Invoice)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub kind: TransactionType,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub description: String,
    pub reference_id: String,
    pub party: PartyRef,
}

impl Transaction {
    /// Change to the unsigned outstanding amount: `+amount` for documents,
    /// `-amount` for payments and settlements.
    pub fn outstanding_delta(&self) -> Decimal {
        if self.kind.raises_balance() {
            self.amount
        } else {
            -self.amount
        }
    }
}

/// A party's transaction log, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyLog {
    party: PartyRef,
    entries: Vec<Transaction>,
}

impl PartyLog {
    /// Entries belonging to other parties are dropped.
    pub fn new(party: PartyRef, entries: impl IntoIterator<Item = Transaction>) -> Self {
        let mut entries: Vec<Transaction> = entries.into_iter().filter(|t| t.party == party).collect();
        entries.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        Self { party, entries }
    }

    pub fn party(&self) -> PartyRef {
        self.party
    }

    pub fn entries(&self) -> &[Transaction] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Unsigned amount outstanding per the log.
    pub fn outstanding(&self) -> Decimal {
        self.entries.iter().map(Transaction::outstanding_delta).sum()
    }

    /// Balance signed per the party's convention.
    pub fn balance(&self) -> Decimal {
        self.kind().signed(self.outstanding())
    }

    /// Each entry with the signed balance after it.
    pub fn running(&self) -> Vec<(&Transaction, Decimal)> {
        let kind = self.kind();
        let mut acc = Decimal::ZERO;
        self.entries
            .iter()
            .map(|t| {
                acc += t.outstanding_delta();
                (t, kind.signed(acc))
            })
            .collect()
    }

    fn kind(&self) -> PartyKind {
        self.party.kind()
    }
}
