use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use textileflow_core::PaymentId;

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    Credit,
    Cash,
    Bank,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Credit => "Credit",
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Bank => "Bank",
        }
    }

    /// Case-insensitive parse of the wire/CSV label.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "credit" => Some(PaymentMethod::Credit),
            "cash" => Some(PaymentMethod::Cash),
            "bank" => Some(PaymentMethod::Bank),
            _ => None,
        }
    }
}

impl core::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payment already recorded against a document. Immutable.
///
/// `id` is `None` only for payments recorded locally that the backend has
/// not assigned an id to yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: Option<PaymentId>,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub bank_name: Option<String>,
    /// Bank transaction reference.
    pub tid: Option<String>,
}

/// A payment the user is about to submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPayment {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub bank_name: Option<String>,
    pub tid: Option<String>,
}

impl NewPayment {
    pub fn cash(date: NaiveDate, amount: Decimal) -> Self {
        Self {
            date,
            amount,
            method: PaymentMethod::Cash,
            bank_name: None,
            tid: None,
        }
    }

    pub fn bank(
        date: NaiveDate,
        amount: Decimal,
        bank_name: impl Into<String>,
        tid: impl Into<String>,
    ) -> Self {
        Self {
            date,
            amount,
            method: PaymentMethod::Bank,
            bank_name: Some(bank_name.into()),
            tid: Some(tid.into()),
        }
    }

    /// Bank fields only travel with bank payments; blanks become `None`.
    pub fn normalized(mut self) -> Self {
        if self.method == PaymentMethod::Bank {
            self.bank_name = self.bank_name.and_then(non_blank);
            self.tid = self.tid.and_then(non_blank);
        } else {
            self.bank_name = None;
            self.tid = None;
        }
        self
    }

    pub fn has_transaction_reference(&self) -> bool {
        self.tid.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    pub(crate) fn into_record(self) -> PaymentRecord {
        PaymentRecord {
            id: None,
            date: self.date,
            amount: self.amount,
            method: self.method,
            bank_name: self.bank_name,
            tid: self.tid,
        }
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn normalizing_strips_bank_fields_from_cash() {
        let p = NewPayment {
            bank_name: Some("Meezan Bank".into()),
            tid: Some("TX-1".into()),
            ..NewPayment::cash(day(), dec!(10))
        }
        .normalized();
        assert_eq!(p.bank_name, None);
        assert_eq!(p.tid, None);
    }

    #[test]
    fn blank_tid_is_not_a_reference() {
        let p = NewPayment::bank(day(), dec!(10), "HBL", "   ").normalized();
        assert_eq!(p.tid, None);
        assert!(!p.has_transaction_reference());
    }

    #[test]
    fn method_labels_parse_case_insensitively() {
        assert_eq!(PaymentMethod::parse(" bank "), Some(PaymentMethod::Bank));
        assert_eq!(PaymentMethod::parse("CASH"), Some(PaymentMethod::Cash));
        assert_eq!(PaymentMethod::parse("cheque"), None);
    }
}
