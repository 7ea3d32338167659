use serde::{Deserialize, Serialize};

/// Sales invoice or purchase bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    Invoice,
    Bill,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "Invoice",
            DocumentKind::Bill => "Bill",
        }
    }

    /// Label of the open (nothing paid) status for this kind.
    pub fn open_label(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "Pending",
            DocumentKind::Bill => "Unpaid",
        }
    }
}

/// Settlement status, derived from total and amount paid.
///
/// Ordered: a ledger only ever moves forward through these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SettlementStatus {
    /// Nothing paid yet ("Pending" on invoices, "Unpaid" on bills).
    Open,
    PartiallyPaid,
    Paid,
}

impl SettlementStatus {
    pub const ALL: [SettlementStatus; 3] = [
        SettlementStatus::Open,
        SettlementStatus::PartiallyPaid,
        SettlementStatus::Paid,
    ];

    /// Wire/display label for a document of `kind`.
    pub fn label(&self, kind: DocumentKind) -> &'static str {
        match self {
            SettlementStatus::Open => kind.open_label(),
            SettlementStatus::PartiallyPaid => "Partially Paid",
            SettlementStatus::Paid => "Paid",
        }
    }

    /// Parse either kind's label.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim() {
            "Pending" | "Unpaid" => Some(SettlementStatus::Open),
            "Partially Paid" => Some(SettlementStatus::PartiallyPaid),
            "Paid" => Some(SettlementStatus::Paid),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        *self != SettlementStatus::Paid
    }
}
